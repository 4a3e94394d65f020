//! Record repository: the business rules over stored patient records.
//!
//! # Responsibility
//! - Validate records before any store interaction.
//! - Treat the mobile number as the natural key: saving an existing mobile
//!   updates that record in place and keeps its id.
//! - Keep a snapshot of the last successful full load, replaced wholesale
//!   after every successful write.
//!
//! # Invariants
//! - A failed call never modifies the snapshot.
//! - `total_price` of a saved record equals frame plus glass price.

mod search;

pub use search::*;

use thiserror::Error;
use tracing::{info, warn};

use crate::db::{from_row, to_row, DbError, RecordStore, UpsertOutcome};
use crate::models::{NewPatientRecord, PatientRecord, ValidationError};

/// Repository errors.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The record broke a business rule; nothing was sent to the store.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store rejected or failed to complete the operation.
    #[error("Persistence error: {0}")]
    Persistence(#[from] DbError),
}

impl RecordError {
    /// Message suitable for showing to the operator.
    ///
    /// Validation failures are specific; store failures are generic, with
    /// the cause left for diagnostics.
    pub fn user_message(&self) -> String {
        match self {
            RecordError::Validation(e) => e.to_string(),
            RecordError::Persistence(_) => {
                "Could not reach the record store. Please try again.".to_string()
            }
        }
    }
}

pub type RecordResult<T> = Result<T, RecordError>;

/// Patient record repository over an injectable store.
pub struct RecordRepository<S> {
    store: S,
    records: Vec<PatientRecord>,
}

impl<S: RecordStore> RecordRepository<S> {
    /// Wrap a store without loading anything.
    pub fn new(store: S) -> Self {
        Self {
            store,
            records: Vec::new(),
        }
    }

    /// Wrap a store and load the initial snapshot.
    pub fn open(store: S) -> RecordResult<Self> {
        let mut repo = Self::new(store);
        repo.list()?;
        Ok(repo)
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records from the last successful load, without a store round trip.
    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    /// Number of records in the snapshot.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Fetch every record from the store and replace the snapshot.
    ///
    /// Order is whatever the store returns; callers must not rely on it.
    pub fn list(&mut self) -> RecordResult<&[PatientRecord]> {
        let records: Vec<PatientRecord> =
            self.store.select_all()?.into_iter().map(from_row).collect();
        self.records = records;
        Ok(&self.records)
    }

    /// Look up the record for a mobile number. Absence is not an error.
    pub fn find_by_mobile(&self, mobile: &str) -> RecordResult<Option<PatientRecord>> {
        Ok(self
            .store
            .select_by_mobile(mobile)?
            .into_iter()
            .next()
            .map(from_row))
    }

    /// Records whose name contains `query` (any case) or whose mobile
    /// contains it literally. An empty query returns the full list.
    pub fn search(&mut self, query: &str) -> RecordResult<Vec<PatientRecord>> {
        let records = self.list()?;
        Ok(search_records(records, query))
    }

    /// Create or update the record for `record.mobile`.
    pub fn save(&mut self, record: &NewPatientRecord) -> RecordResult<PatientRecord> {
        self.save_with_outcome(record).map(|(saved, _)| saved)
    }

    /// Like [`save`](Self::save), also reporting whether the record was
    /// created or updated.
    pub fn save_with_outcome(
        &mut self,
        record: &NewPatientRecord,
    ) -> RecordResult<(PatientRecord, UpsertOutcome)> {
        record.validate()?;

        let row = to_row(record);
        let outcome = match self.store.upsert(&row) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "failed to save patient record");
                return Err(e.into());
            }
        };

        // Read back through a full reload rather than patching the snapshot
        let saved = self
            .list()?
            .iter()
            .find(|r| r.mobile == record.mobile)
            .cloned()
            .ok_or_else(|| DbError::NotFound("saved record missing after reload".into()))?;

        info!(
            record_id = %saved.id,
            outcome = ?outcome,
            total = self.records.len(),
            "saved patient record"
        );
        Ok((saved, outcome))
    }

    /// Delete every record.
    pub fn clear_all(&mut self) -> RecordResult<()> {
        let removed = match self.store.delete_all() {
            Ok(removed) => removed,
            Err(e) => {
                warn!(error = %e, "failed to clear patient records");
                return Err(e.into());
            }
        };
        self.records.clear();
        info!(removed, "cleared patient records");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::EyePrescription;

    fn setup_repo() -> RecordRepository<Database> {
        RecordRepository::open(Database::open_in_memory().unwrap()).unwrap()
    }

    fn new_record(name: &str, mobile: &str) -> NewPatientRecord {
        NewPatientRecord {
            date: "2024-03-15".into(),
            name: name.into(),
            mobile: mobile.into(),
            right_eye: EyePrescription {
                sphere: "+2.00".into(),
                cylinder: "-0.50".into(),
                axis: "90".into(),
                add: "".into(),
            },
            left_eye: EyePrescription {
                sphere: "+1.75".into(),
                ..Default::default()
            },
            frame_price: 1200.0,
            glass_price: 650.0,
            remarks: "Blue cut lenses".into(),
        }
    }

    #[test]
    fn test_open_empty() {
        let repo = setup_repo();
        assert_eq!(repo.count(), 0);
        assert!(repo.records().is_empty());
    }

    #[test]
    fn test_save_new_record() {
        let mut repo = setup_repo();

        let (saved, outcome) = repo
            .save_with_outcome(&new_record("Alice", "9876543210"))
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Inserted);
        assert!(!saved.id.is_empty());
        assert_eq!(saved.total_price, 1850.0);
        assert_eq!(NewPatientRecord::from(saved.clone()), new_record("Alice", "9876543210"));
        assert_eq!(repo.records(), &[saved]);
    }

    #[test]
    fn test_save_existing_mobile_updates() {
        let mut repo = setup_repo();

        let first = repo.save(&new_record("Alice", "9876543210")).unwrap();

        let mut edited = new_record("Alice Cooper", "9876543210");
        edited.glass_price = 900.0;
        let (second, outcome) = repo.save_with_outcome(&edited).unwrap();

        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(second.id, first.id);
        assert_eq!(second.name, "Alice Cooper");
        assert_eq!(second.total_price, 2100.0);
        assert_eq!(repo.count(), 1);
    }

    #[test]
    fn test_find_by_mobile() {
        let mut repo = setup_repo();
        let saved = repo.save(&new_record("Alice", "9876543210")).unwrap();

        assert_eq!(repo.find_by_mobile("9876543210").unwrap(), Some(saved));
        assert_eq!(repo.find_by_mobile("9123456780").unwrap(), None);
    }

    #[test]
    fn test_validation_error_before_store() {
        let mut repo = setup_repo();

        let err = repo.save(&new_record("Alice", "12345")).unwrap_err();
        assert!(matches!(
            err,
            RecordError::Validation(ValidationError::InvalidMobile(_))
        ));
        assert!(err.user_message().contains("10-digit"));
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn test_search() {
        let mut repo = setup_repo();
        repo.save(&new_record("Alice", "9876543210")).unwrap();
        repo.save(&new_record("Bob", "9123456780")).unwrap();

        assert_eq!(repo.search("").unwrap().len(), 2);
        assert_eq!(repo.search("BOB").unwrap()[0].mobile, "9123456780");
        assert_eq!(repo.search("987").unwrap()[0].name, "Alice");
    }

    #[test]
    fn test_clear_all() {
        let mut repo = setup_repo();
        repo.save(&new_record("Alice", "9876543210")).unwrap();
        repo.save(&new_record("Bob", "9123456780")).unwrap();

        repo.clear_all().unwrap();
        assert_eq!(repo.count(), 0);
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn test_open_loads_existing_rows() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&to_row(&new_record("Alice", "9876543210"))).unwrap();

        let repo = RecordRepository::open(db).unwrap();
        assert_eq!(repo.count(), 1);
        assert_eq!(repo.records()[0].name, "Alice");
    }

    #[test]
    fn test_persistence_user_message_is_generic() {
        let err = RecordError::from(DbError::Unavailable("connection reset".into()));
        assert!(!err.user_message().contains("connection reset"));
        assert!(err.to_string().contains("connection reset"));
    }
}
