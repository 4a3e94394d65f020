//! Mapping between records and flat `patient_records` rows.
//!
//! Rows are the persisted shape: both prescriptions are flattened into
//! `right_eye_*` / `left_eye_*` columns. Every field is optional so rows
//! written by other clients load with safe defaults instead of failing.

use serde::{Deserialize, Serialize};

use crate::models::{EyePrescription, NewPatientRecord, PatientRecord};

/// Flat persisted row.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PatientRow {
    /// Assigned by the store; never set on rows built for writing
    pub id: Option<String>,
    pub date: Option<String>,
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub right_eye_sphere: Option<String>,
    pub right_eye_cylinder: Option<String>,
    pub right_eye_axis: Option<String>,
    pub right_eye_add: Option<String>,
    pub left_eye_sphere: Option<String>,
    pub left_eye_cylinder: Option<String>,
    pub left_eye_axis: Option<String>,
    pub left_eye_add: Option<String>,
    pub frame_price: Option<f64>,
    pub glass_price: Option<f64>,
    pub total_price: Option<f64>,
    pub remarks: Option<String>,
}

impl PatientRow {
    /// Mobile number of this row, empty when missing.
    pub fn mobile(&self) -> &str {
        self.mobile.as_deref().unwrap_or_default()
    }
}

/// Flatten a record into a row for insert or update.
///
/// The id is left unset and the total price is derived from the two prices.
pub fn to_row(record: &NewPatientRecord) -> PatientRow {
    PatientRow {
        id: None,
        date: Some(record.date.clone()),
        name: Some(record.name.clone()),
        mobile: Some(record.mobile.clone()),
        right_eye_sphere: Some(record.right_eye.sphere.clone()),
        right_eye_cylinder: Some(record.right_eye.cylinder.clone()),
        right_eye_axis: Some(record.right_eye.axis.clone()),
        right_eye_add: Some(record.right_eye.add.clone()),
        left_eye_sphere: Some(record.left_eye.sphere.clone()),
        left_eye_cylinder: Some(record.left_eye.cylinder.clone()),
        left_eye_axis: Some(record.left_eye.axis.clone()),
        left_eye_add: Some(record.left_eye.add.clone()),
        frame_price: Some(record.frame_price),
        glass_price: Some(record.glass_price),
        total_price: Some(record.total_price()),
        remarks: Some(record.remarks.clone()),
    }
}

/// Rebuild a record from a stored row.
///
/// Missing text becomes the empty string; missing or non-finite amounts
/// become zero. The stored total is kept as-is.
pub fn from_row(row: PatientRow) -> PatientRecord {
    PatientRecord {
        id: row.id.unwrap_or_default(),
        date: row.date.unwrap_or_default(),
        name: row.name.unwrap_or_default(),
        mobile: row.mobile.unwrap_or_default(),
        right_eye: EyePrescription {
            sphere: row.right_eye_sphere.unwrap_or_default(),
            cylinder: row.right_eye_cylinder.unwrap_or_default(),
            axis: row.right_eye_axis.unwrap_or_default(),
            add: row.right_eye_add.unwrap_or_default(),
        },
        left_eye: EyePrescription {
            sphere: row.left_eye_sphere.unwrap_or_default(),
            cylinder: row.left_eye_cylinder.unwrap_or_default(),
            axis: row.left_eye_axis.unwrap_or_default(),
            add: row.left_eye_add.unwrap_or_default(),
        },
        frame_price: amount(row.frame_price),
        glass_price: amount(row.glass_price),
        total_price: amount(row.total_price),
        remarks: row.remarks.unwrap_or_default(),
    }
}

fn amount(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}
