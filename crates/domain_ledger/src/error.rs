//! Ledger domain errors

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Entry debits and credits do not balance
    #[error("Unbalanced entry: debits={debits}, credits={credits}")]
    UnbalancedEntry { debits: Decimal, credits: Decimal },

    /// Entry has no line items
    #[error("Journal entry must have at least one line item")]
    EmptyEntry,

    /// Entry is already posted and cannot be posted or mutated again
    #[error("Journal entry already posted: {0}")]
    AlreadyPosted(String),

    /// Only posted entries can be reversed
    #[error("Journal entry not posted, cannot reverse: {0}")]
    NotPosted(String),

    /// Journal entry not found
    #[error("Journal entry not found: {0}")]
    EntryNotFound(String),

    /// Referenced account missing from the chart or inactive
    #[error("Account not found or inactive: {0}")]
    AccountNotFound(String),

    /// Account code does not match the N-NNNN format
    #[error("Invalid account code format: {0}")]
    InvalidAccountCode(String),

    /// Negative debit or credit amount on a line item
    #[error("Invalid line amount: {0}")]
    InvalidAmount(String),
}
