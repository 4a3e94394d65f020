//! Patient record models.

use serde::{Deserialize, Serialize};

use super::validation::{is_valid_mobile, ValidationError};

/// Number of digits in a patient mobile number.
pub const MOBILE_LENGTH: usize = 10;

/// Calendar date format used for exam dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Eyewear prescription for a single eye.
///
/// All values are free text as written by the optometrist (e.g. "+2.00",
/// "-0.75", "180"). Any field may be empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EyePrescription {
    pub sphere: String,
    pub cylinder: String,
    pub axis: String,
    pub add: String,
}

impl EyePrescription {
    /// True when no field has been filled in.
    pub fn is_empty(&self) -> bool {
        self.sphere.is_empty()
            && self.cylinder.is_empty()
            && self.axis.is_empty()
            && self.add.is_empty()
    }
}

/// A stored patient record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Store-assigned identifier, immutable once created
    pub id: String,
    /// Exam date (YYYY-MM-DD)
    pub date: String,
    /// Patient name
    pub name: String,
    /// 10-digit mobile number, the natural key of the record
    pub mobile: String,
    pub right_eye: EyePrescription,
    pub left_eye: EyePrescription,
    pub frame_price: f64,
    pub glass_price: f64,
    /// Frame plus glass price as computed when the record was saved
    pub total_price: f64,
    pub remarks: String,
}

impl PatientRecord {
    /// Check whether this record matches a search query.
    ///
    /// Names match case-insensitively; mobiles match the query as a literal
    /// substring. An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&query.to_lowercase()) || self.mobile.contains(query)
    }
}

/// A record as submitted for saving, before the store has assigned an id.
///
/// There is no total price field: the total is always derived from the frame
/// and glass prices when the record is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewPatientRecord {
    pub date: String,
    pub name: String,
    pub mobile: String,
    pub right_eye: EyePrescription,
    pub left_eye: EyePrescription,
    pub frame_price: f64,
    pub glass_price: f64,
    pub remarks: String,
}

impl NewPatientRecord {
    /// Start a record dated today with empty prescriptions and zero prices.
    pub fn new(name: String, mobile: String, remarks: String) -> Self {
        Self {
            date: chrono::Local::now().date_naive().format(DATE_FORMAT).to_string(),
            name,
            mobile,
            right_eye: EyePrescription::default(),
            left_eye: EyePrescription::default(),
            frame_price: 0.0,
            glass_price: 0.0,
            remarks,
        }
    }

    /// Total price charged for this record.
    pub fn total_price(&self) -> f64 {
        self.frame_price + self.glass_price
    }

    /// Check the business rules a record must satisfy before it is stored.
    ///
    /// Required fields are checked first (name, mobile, date, remarks), then
    /// the mobile format, then the date and prices.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("name", &self.name),
            ("mobile", &self.mobile),
            ("date", &self.date),
            ("remarks", &self.remarks),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }

        if !is_valid_mobile(&self.mobile) {
            return Err(ValidationError::InvalidMobile(self.mobile.clone()));
        }

        if chrono::NaiveDate::parse_from_str(&self.date, DATE_FORMAT).is_err() {
            return Err(ValidationError::InvalidDate(self.date.clone()));
        }

        for (field, value) in [
            ("frame price", self.frame_price),
            ("glass price", self.glass_price),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ValidationError::InvalidPrice { field, value });
            }
        }

        Ok(())
    }
}

/// Editing an existing record starts from its stored values.
impl From<PatientRecord> for NewPatientRecord {
    fn from(record: PatientRecord) -> Self {
        Self {
            date: record.date,
            name: record.name,
            mobile: record.mobile,
            right_eye: record.right_eye,
            left_eye: record.left_eye,
            frame_price: record.frame_price,
            glass_price: record.glass_price,
            remarks: record.remarks,
        }
    }
}

/// Reduce free-form mobile input to at most 10 ASCII digits.
///
/// Mirrors what the entry form does while the operator types, so
/// "98765 43210" and "98765-43210" both become "9876543210".
pub fn normalize_mobile_input(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit())
        .take(MOBILE_LENGTH)
        .collect()
}

/// Remove the separators people type inside phone numbers.
///
/// Unlike [`normalize_mobile_input`] nothing else is dropped and the result is
/// never shortened, so a number with extra digits or stray characters still
/// fails validation instead of turning into some other patient's mobile.
pub fn strip_mobile_separators(raw: &str) -> String {
    raw.chars()
        .filter(|&c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect()
}
