//! SQLite schema definition.

/// Table holding one row per patient record.
pub const RECORDS_TABLE: &str = "patient_records";

/// Complete database schema for eye records.
///
/// Prescription and price columns are nullable so rows written by other
/// clients with missing fields still load.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patient Records
-- ============================================================================

CREATE TABLE IF NOT EXISTS patient_records (
    id TEXT PRIMARY KEY,
    date TEXT,
    name TEXT,
    mobile TEXT NOT NULL UNIQUE,                 -- natural key, 10 digits
    right_eye_sphere TEXT,
    right_eye_cylinder TEXT,
    right_eye_axis TEXT,
    right_eye_add TEXT,
    left_eye_sphere TEXT,
    left_eye_cylinder TEXT,
    left_eye_axis TEXT,
    left_eye_add TEXT,
    frame_price REAL,
    glass_price REAL,
    total_price REAL,                            -- frame + glass at save time
    remarks TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_patient_records_name ON patient_records(name);
"#;
