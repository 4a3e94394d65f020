//! Plain-text rendering of records for the terminal.

use eye_records_core::{EyePrescription, PatientRecord};

/// One line per record, for listings.
pub fn summary_line(record: &PatientRecord) -> String {
    format!(
        "{}  {:<24} {}  total {:.2}",
        record.mobile, record.name, record.date, record.total_price
    )
}

/// Full view of a single record.
pub fn detail(record: &PatientRecord) -> String {
    let mut out = String::new();
    out.push_str(&format!("Name:        {}\n", record.name));
    out.push_str(&format!("Mobile:      {}\n", record.mobile));
    out.push_str(&format!("Date:        {}\n", record.date));
    out.push_str(&format!("Right eye:   {}\n", prescription(&record.right_eye)));
    out.push_str(&format!("Left eye:    {}\n", prescription(&record.left_eye)));
    out.push_str(&format!("Frame price: {:.2}\n", record.frame_price));
    out.push_str(&format!("Glass price: {:.2}\n", record.glass_price));
    out.push_str(&format!("Total price: {:.2}\n", record.total_price));
    out.push_str(&format!("Remarks:     {}", record.remarks));
    out
}

fn prescription(eye: &EyePrescription) -> String {
    if eye.is_empty() {
        return "-".to_string();
    }
    format!(
        "SPH {}  CYL {}  AXIS {}  ADD {}",
        or_dash(&eye.sphere),
        or_dash(&eye.cylinder),
        or_dash(&eye.axis),
        or_dash(&eye.add)
    )
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
