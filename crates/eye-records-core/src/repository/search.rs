//! Record search.

use crate::models::PatientRecord;

/// Filter records by a search query, keeping their relative order.
///
/// An empty query returns every record.
pub fn search_records(records: &[PatientRecord], query: &str) -> Vec<PatientRecord> {
    if query.is_empty() {
        return records.to_vec();
    }

    records.iter().filter(|r| r.matches(query)).cloned().collect()
}
