//! Configuration for the eye records CLI
//!
//! Resolves the database location with the following precedence:
//! 1. `--db` command line flag
//! 2. EYE_RECORDS_DB environment variable
//! 3. ~/.local/share/eye-records/records.db (production default)
//! 4. ./data/records.db (fallback for development)

use std::path::{Path, PathBuf};

use anyhow::Context;

pub const DB_ENV_VAR: &str = "EYE_RECORDS_DB";
const DEFAULT_DATA_DIR: &str = ".local/share/eye-records";
const DEV_DATA_DIR: &str = "./data";
const DB_FILE_NAME: &str = "records.db";

/// Get the database path from the flag or the process environment.
pub fn database_path(flag: Option<PathBuf>) -> PathBuf {
    resolve_database_path(flag, |key| std::env::var(key).ok())
}

fn resolve_database_path(
    flag: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }

    if let Some(path) = env(DB_ENV_VAR).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }

    if let Some(home) = env("HOME").filter(|h| !h.is_empty()) {
        return PathBuf::from(home).join(DEFAULT_DATA_DIR).join(DB_FILE_NAME);
    }

    PathBuf::from(DEV_DATA_DIR).join(DB_FILE_NAME)
}

/// Create the directory that will hold the database file.
pub fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create data directory {}", parent.display())),
        _ => Ok(()),
    }
}
