//! Tax domain errors

use core_kernel::{Money, MoneyError};
use thiserror::Error;

/// Errors that can occur in the tax domain
#[derive(Debug, Error)]
pub enum TaxError {
    /// Negative or otherwise unusable amount supplied
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A stored amount does not reconcile with the recomputed value
    #[error("Amount mismatch for {field}: expected {expected}, got {actual}")]
    AmountMismatch {
        field: &'static str,
        expected: Money,
        actual: Money,
    },
}

impl From<MoneyError> for TaxError {
    fn from(err: MoneyError) -> Self {
        TaxError::InvalidAmount(err.to_string())
    }
}
