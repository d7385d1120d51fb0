//! Document domain errors
//!
//! These are the hard failures: every one of them aborts the requested
//! operation before any write. Soft failures (journal posting, notification
//! delivery) never surface here; they travel as warnings on
//! [`crate::outcome::TransitionOutcome`].

use core_kernel::Money;
use domain_tax::TaxError;
use thiserror::Error;

/// Errors that can occur in the document domain
#[derive(Debug, Error)]
pub enum DocumentError {
    /// Malformed input or failed business-rule check
    #[error("Validation error: {0}")]
    Validation(String),

    /// Monetary/tax fields do not reconcile
    #[error(transparent)]
    Tax(#[from] TaxError),

    /// Referenced entity missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Requested status change is not in the allowed-transition table
    #[error("Illegal transition from {from} to {requested}; allowed next states: {}", allowed.join(", "))]
    IllegalTransition {
        from: String,
        requested: String,
        allowed: Vec<String>,
    },

    /// Payment would push the confirmed sum above the invoice total
    #[error("Overpayment rejected: confirmed payments would reach {attempted} against total {total}")]
    OverpaymentRejected { total: Money, attempted: Money },

    /// Materai flag set on an invoice below the stamp-duty threshold
    #[error("Materai not required for invoice total {0}")]
    MateraiNotRequired(Money),
}

impl DocumentError {
    pub fn validation(message: impl Into<String>) -> Self {
        DocumentError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        DocumentError::NotFound(message.into())
    }
}
