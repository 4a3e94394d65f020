//! Business-rule validation for patient records.

use thiserror::Error;

use super::record::MOBILE_LENGTH;

/// A record failed a local business rule and was not sent to the store.
///
/// The `Display` text is meant to be shown to the operator as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Name, mobile number, date, and remarks are required ({0} is empty)")]
    MissingField(&'static str),

    #[error("Please enter a valid 10-digit mobile number (got '{0}')")]
    InvalidMobile(String),

    #[error("Invalid exam date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("The {field} must be a non-negative amount (got {value})")]
    InvalidPrice { field: &'static str, value: f64 },
}

/// Exactly 10 ASCII digits.
pub fn is_valid_mobile(mobile: &str) -> bool {
    mobile.len() == MOBILE_LENGTH && mobile.bytes().all(|b| b.is_ascii_digit())
}
