//! Domain models for the eye records system.

mod record;
mod validation;

pub use record::*;
pub use validation::*;
