//! Core Kernel - Foundational types and utilities for the accounting platform
//!
//! This crate provides the fundamental building blocks used across all domain
//! modules:
//! - Money type with precise rupiah decimal arithmetic
//! - Strongly-typed identifiers for business documents and ledger entries
//! - Sequential document numbering (per kind, per calendar year)
//! - Jakarta-local temporal helpers
//! - Ports for external collaborators (notifications)

pub mod identifiers;
pub mod money;
pub mod ports;
pub mod sequence;
pub mod temporal;

pub use identifiers::{
    ClientId, ExpenseId, InvoiceId, JournalEntryId, PaymentId, ProjectId, PurchaseOrderId,
    QuotationId,
};
pub use money::{Money, MoneyError, TOLERANCE};
pub use ports::{NotificationKind, Notifier, NotifyError, NullNotifier, RecordingNotifier};
pub use sequence::{DocumentKind, SequenceCounter};
