mod config;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use eye_records_core::{
    strip_mobile_separators, Database, EyePrescription, NewPatientRecord, PatientRecord,
    RecordError, RecordRepository, UpsertOutcome,
};

#[derive(Parser)]
#[command(name = "eye-records", version, about = "Eyewear prescription records")]
struct Cli {
    /// Database file (defaults to $EYE_RECORDS_DB, then ~/.local/share/eye-records/records.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log filter, overriding RUST_LOG (e.g. "debug", "eye_records_core=trace")
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a record, or update the existing record for the same mobile
    Add(AddArgs),
    /// List all records
    List,
    /// Show the record for a mobile number
    Show { mobile: String },
    /// Search records by name or mobile
    Search {
        #[arg(default_value = "")]
        query: String,
    },
    /// Delete every record
    Clear {
        /// Confirm deletion of all records
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    mobile: String,
    /// Exam date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<String>,
    #[arg(long)]
    remarks: String,

    #[arg(long, default_value = "", allow_hyphen_values = true)]
    right_sphere: String,
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    right_cylinder: String,
    #[arg(long, default_value = "")]
    right_axis: String,
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    right_add: String,

    #[arg(long, default_value = "", allow_hyphen_values = true)]
    left_sphere: String,
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    left_cylinder: String,
    #[arg(long, default_value = "")]
    left_axis: String,
    #[arg(long, default_value = "", allow_hyphen_values = true)]
    left_add: String,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    frame_price: f64,
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    glass_price: f64,
}

impl AddArgs {
    fn into_record(self) -> NewPatientRecord {
        let mut record =
            NewPatientRecord::new(self.name, strip_mobile_separators(&self.mobile), self.remarks);
        if let Some(date) = self.date {
            record.date = date;
        }
        record.right_eye = EyePrescription {
            sphere: self.right_sphere,
            cylinder: self.right_cylinder,
            axis: self.right_axis,
            add: self.right_add,
        };
        record.left_eye = EyePrescription {
            sphere: self.left_sphere,
            cylinder: self.left_cylinder,
            axis: self.left_axis,
            add: self.left_add,
        };
        record.frame_price = self.frame_price;
        record.glass_price = self.glass_price;
        record
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Logs go to stderr so --json output stays machine readable
    let filter = match &cli.log_level {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let db_path = config::database_path(cli.db.clone());
    config::ensure_parent_dir(&db_path)?;
    tracing::debug!("Using database: {}", db_path.display());

    let db = Database::open(&db_path)
        .with_context(|| format!("failed to open database {}", db_path.display()))?;
    let mut repo = match RecordRepository::open(db) {
        Ok(repo) => repo,
        Err(e) => return Ok(report(&e)),
    };

    match run(&mut repo, cli.command, cli.json) {
        Ok(code) => Ok(code),
        Err(e) => Ok(report(&e)),
    }
}

fn run(
    repo: &mut RecordRepository<Database>,
    command: Command,
    json: bool,
) -> Result<ExitCode, RecordError> {
    match command {
        Command::Add(args) => {
            let (record, outcome) = repo.save_with_outcome(&args.into_record())?;
            if json {
                print_json(&record);
            } else {
                match outcome {
                    UpsertOutcome::Inserted => println!("Record added successfully"),
                    UpsertOutcome::Updated => println!("Record updated successfully"),
                }
                println!("{}", output::detail(&record));
            }
        }
        Command::List => {
            let records = repo.list()?;
            print_list(records, json, "No patient records found");
        }
        Command::Show { mobile } => {
            match repo.find_by_mobile(&strip_mobile_separators(&mobile))? {
                Some(record) if json => print_json(&record),
                Some(record) => println!("{}", output::detail(&record)),
                None => {
                    eprintln!("Record not found: no patient record for mobile {}", mobile);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Search { query } => {
            let records = repo.search(&query)?;
            print_list(&records, json, "No records match your search");
        }
        Command::Clear { yes } => {
            if !yes {
                eprintln!("Refusing to delete all records without --yes");
                return Ok(ExitCode::FAILURE);
            }
            let count = repo.count();
            repo.clear_all()?;
            println!("Deleted {} record(s)", count);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_list(records: &[PatientRecord], json: bool, empty_message: &str) {
    if json {
        print_json(records);
    } else if records.is_empty() {
        println!("{}", empty_message);
    } else {
        println!("All Records ({})", records.len());
        for record in records {
            println!("{}", output::summary_line(record));
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => tracing::error!("failed to serialize output: {}", e),
    }
}

/// Show the operator-facing message and log the underlying cause.
fn report(err: &RecordError) -> ExitCode {
    if let RecordError::Persistence(cause) = err {
        tracing::error!(error = %cause, "record store operation failed");
    }
    eprintln!("{}", err.user_message());
    ExitCode::FAILURE
}
