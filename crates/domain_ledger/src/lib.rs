//! Ledger Domain - Double-Entry Journal System
//!
//! This crate implements the double-entry bookkeeping core of the
//! business-administration platform.
//!
//! # Double-Entry Principles
//!
//! Every accounting side effect creates balanced debits and credits:
//! - Debits increase asset/expense accounts
//! - Credits increase liability/equity/revenue accounts
//! - The sum of all debits must equal the sum of all credits
//!
//! # Entry Lifecycle
//!
//! Entries are created in `Draft` and posted exactly once. Posted entries
//! are immutable; corrections go through reversing entries with swapped
//! debit/credit values.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{JournalEngine, PostingEvent};
//!
//! let mut engine = JournalEngine::new();
//! let entry_id = engine.post_document_entry(
//!     PostingEvent::ExpenseApproved,
//!     expense_id,
//!     "EXP-2026-00001",
//!     "6-1000",
//!     total,
//!     entry_date,
//!     "budi",
//! )?;
//! ```

pub mod accounts;
pub mod engine;
pub mod error;
pub mod events;
pub mod journal;

pub use accounts::{codes, Account, AccountType, ChartOfAccounts};
pub use engine::{JournalEngine, NewJournalEntry};
pub use error::LedgerError;
pub use events::{posting_rule, PostingEvent, PostingRule, RuleAccount};
pub use journal::{JournalEntry, JournalLineItem, JournalStatus, TransactionType};
