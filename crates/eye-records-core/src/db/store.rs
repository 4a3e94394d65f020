//! Store client abstraction consumed by the record repository.

use super::{DbResult, PatientRow};

/// What an upsert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No row had the mobile number; a new row was inserted.
    Inserted,
    /// An existing row for the mobile number was updated in place.
    Updated,
}

/// Operations the repository needs from the backing `patient_records` table.
///
/// Implementations own id assignment: `insert` must ignore any id on the
/// row and generate a fresh one.
pub trait RecordStore {
    /// All rows, in store-defined order.
    fn select_all(&self) -> DbResult<Vec<PatientRow>>;

    /// Rows whose mobile equals `mobile` (zero or one expected).
    fn select_by_mobile(&self, mobile: &str) -> DbResult<Vec<PatientRow>>;

    /// Insert a row and return the id the store assigned to it.
    fn insert(&self, row: &PatientRow) -> DbResult<String>;

    /// Update the row for `mobile`, returning the number of rows changed.
    fn update_by_mobile(&self, mobile: &str, row: &PatientRow) -> DbResult<usize>;

    /// Delete every row, returning how many were removed.
    fn delete_all(&self) -> DbResult<usize>;

    /// Insert the row, or update the existing row with the same mobile.
    ///
    /// The default composes a lookup with an insert or update and is not
    /// atomic. Stores that can do better should override it.
    fn upsert(&self, row: &PatientRow) -> DbResult<UpsertOutcome> {
        if self.select_by_mobile(row.mobile())?.is_empty() {
            self.insert(row)?;
            Ok(UpsertOutcome::Inserted)
        } else {
            self.update_by_mobile(row.mobile(), row)?;
            Ok(UpsertOutcome::Updated)
        }
    }
}
