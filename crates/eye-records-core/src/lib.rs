//! Eye Records Core Library
//!
//! Eyewear prescription records for a single optical practice, keyed by the
//! patient's mobile number.
//!
//! # Architecture
//!
//! ```text
//!   Presentation layer (mobile app / CLI)
//!                   │
//!                   ▼
//!   ┌───────────────────────────────┐
//!   │        RecordRepository       │  validate → upsert → reload
//!   │  snapshot of last full load   │
//!   └───────────────┬───────────────┘
//!                   │ RecordStore
//!                   ▼
//!   ┌───────────────────────────────┐
//!   │   row adapter (flat columns)  │
//!   │   SQLite: patient_records     │
//!   └───────────────────────────────┘
//! ```
//!
//! # Core Principle
//!
//! **The mobile number is the natural key.** Saving a record for a mobile that
//! already exists updates it in place and keeps its id.
//!
//! # Modules
//!
//! - [`db`]: SQLite store, row mapping and the `RecordStore` trait
//! - [`models`]: Domain types (PatientRecord, EyePrescription, validation)
//! - [`repository`]: Record repository and search

pub mod db;
pub mod models;
pub mod repository;

// Re-export commonly used types
pub use db::{Database, DbError, RecordStore, UpsertOutcome};
pub use models::{
    normalize_mobile_input, strip_mobile_separators, EyePrescription, NewPatientRecord,
    PatientRecord, ValidationError,
};
pub use repository::{RecordError, RecordRepository, RecordResult};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
#[uniffi(flat_error)]
pub enum EyeRecordsError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<DbError> for EyeRecordsError {
    fn from(e: DbError) -> Self {
        EyeRecordsError::DatabaseError(e.to_string())
    }
}

impl From<RecordError> for EyeRecordsError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::Validation(e) => EyeRecordsError::InvalidInput(e.to_string()),
            RecordError::Persistence(e) => EyeRecordsError::DatabaseError(e.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for EyeRecordsError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        EyeRecordsError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path and load its records.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<EyeRecordsCore>, EyeRecordsError> {
    let db = Database::open(&path)?;
    EyeRecordsCore::with_database(db)
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<EyeRecordsCore>, EyeRecordsError> {
    let db = Database::open_in_memory()?;
    EyeRecordsCore::with_database(db)
}

/// Strip non-digits from typed mobile input and cap it at 10 digits.
#[uniffi::export]
pub fn normalize_mobile(raw: String) -> String {
    normalize_mobile_input(&raw)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe repository wrapper for FFI.
#[derive(uniffi::Object)]
pub struct EyeRecordsCore {
    repo: Arc<Mutex<RecordRepository<Database>>>,
}

impl EyeRecordsCore {
    fn with_database(db: Database) -> Result<Arc<Self>, EyeRecordsError> {
        let repo = RecordRepository::open(db)?;
        Ok(Arc::new(Self {
            repo: Arc::new(Mutex::new(repo)),
        }))
    }
}

#[uniffi::export]
impl EyeRecordsCore {
    /// Create the record for this mobile number, or update the existing one.
    pub fn save_record(
        &self,
        record: FfiNewPatientRecord,
    ) -> Result<FfiPatientRecord, EyeRecordsError> {
        let record: NewPatientRecord = record.into();
        let mut repo = self.repo.lock()?;
        let saved = repo.save(&record)?;
        Ok(saved.into())
    }

    /// Fetch all records from the store.
    pub fn list_records(&self) -> Result<Vec<FfiPatientRecord>, EyeRecordsError> {
        let mut repo = self.repo.lock()?;
        let records = repo.list()?;
        Ok(records.iter().cloned().map(Into::into).collect())
    }

    /// Get the record for a mobile number, if any.
    pub fn find_record_by_mobile(
        &self,
        mobile: String,
    ) -> Result<Option<FfiPatientRecord>, EyeRecordsError> {
        let repo = self.repo.lock()?;
        let record = repo.find_by_mobile(&mobile)?;
        Ok(record.map(Into::into))
    }

    /// Search records by name or mobile.
    pub fn search_records(&self, query: String) -> Result<Vec<FfiPatientRecord>, EyeRecordsError> {
        let mut repo = self.repo.lock()?;
        let records = repo.search(&query)?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    /// Delete every record.
    pub fn clear_records(&self) -> Result<(), EyeRecordsError> {
        let mut repo = self.repo.lock()?;
        repo.clear_all()?;
        Ok(())
    }

    /// Number of records as of the last successful load.
    pub fn record_count(&self) -> Result<u32, EyeRecordsError> {
        let repo = self.repo.lock()?;
        Ok(u32::try_from(repo.count()).unwrap_or(u32::MAX))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe eye prescription.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiEyePrescription {
    pub sphere: String,
    pub cylinder: String,
    pub axis: String,
    pub add: String,
}

impl From<EyePrescription> for FfiEyePrescription {
    fn from(eye: EyePrescription) -> Self {
        Self {
            sphere: eye.sphere,
            cylinder: eye.cylinder,
            axis: eye.axis,
            add: eye.add,
        }
    }
}

impl From<FfiEyePrescription> for EyePrescription {
    fn from(eye: FfiEyePrescription) -> Self {
        EyePrescription {
            sphere: eye.sphere,
            cylinder: eye.cylinder,
            axis: eye.axis,
            add: eye.add,
        }
    }
}

/// FFI-safe stored record.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiPatientRecord {
    pub id: String,
    pub date: String,
    pub name: String,
    pub mobile: String,
    pub right_eye: FfiEyePrescription,
    pub left_eye: FfiEyePrescription,
    pub frame_price: f64,
    pub glass_price: f64,
    pub total_price: f64,
    pub remarks: String,
}

impl From<PatientRecord> for FfiPatientRecord {
    fn from(record: PatientRecord) -> Self {
        Self {
            id: record.id,
            date: record.date,
            name: record.name,
            mobile: record.mobile,
            right_eye: record.right_eye.into(),
            left_eye: record.left_eye.into(),
            frame_price: record.frame_price,
            glass_price: record.glass_price,
            total_price: record.total_price,
            remarks: record.remarks,
        }
    }
}

/// FFI-safe record submitted for saving.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiNewPatientRecord {
    pub date: String,
    pub name: String,
    pub mobile: String,
    pub right_eye: FfiEyePrescription,
    pub left_eye: FfiEyePrescription,
    pub frame_price: f64,
    pub glass_price: f64,
    pub remarks: String,
}

impl From<FfiNewPatientRecord> for NewPatientRecord {
    fn from(record: FfiNewPatientRecord) -> Self {
        NewPatientRecord {
            date: record.date,
            name: record.name,
            mobile: record.mobile,
            right_eye: record.right_eye.into(),
            left_eye: record.left_eye.into(),
            frame_price: record.frame_price,
            glass_price: record.glass_price,
            remarks: record.remarks,
        }
    }
}
