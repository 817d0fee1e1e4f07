//! Stokvel definitions, membership rules and statistics.

pub mod error;
pub mod rules;
pub mod statistics;

pub use error::StokvelError;
pub use rules::{NewStokvel, check_enrollment, validate_contribution};
pub use statistics::StokvelStatistics;

