//! Sequential document numbering
//!
//! Business documents carry human-readable numbers such as `EXP-2026-00042`,
//! monotonically increasing per document kind and calendar year. Numbering is
//! backed by an explicit counter per (kind, year) with increment-and-read
//! semantics, so two concurrent creators can never observe the same number.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The kinds of documents that receive sequential numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Expense,
    Invoice,
    Quotation,
    PurchaseOrder,
}

impl DocumentKind {
    /// Returns the number prefix for this document kind
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Expense => "EXP",
            DocumentKind::Invoice => "INV",
            DocumentKind::Quotation => "QUO",
            DocumentKind::PurchaseOrder => "PO",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// Monotonic counters for document numbering
///
/// One counter exists per (kind, year). `next` atomically increments and
/// reads the counter, formatting the result as `PREFIX-YYYY-NNNNN`.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SequenceCounter {
    counters: HashMap<(DocumentKind, i32), u32>,
}

impl SequenceCounter {
    /// Creates an empty counter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a counter, used when resuming from persisted state
    pub fn seed(&mut self, kind: DocumentKind, year: i32, last_used: u32) {
        self.counters.insert((kind, year), last_used);
    }

    /// Increments and returns the next number for the kind and year
    pub fn next(&mut self, kind: DocumentKind, year: i32) -> String {
        let counter = self.counters.entry((kind, year)).or_insert(0);
        *counter += 1;
        format!("{}-{}-{:05}", kind.prefix(), year, counter)
    }

    /// Returns the last number issued for the kind and year, if any
    pub fn current(&self, kind: DocumentKind, year: i32) -> Option<u32> {
        self.counters.get(&(kind, year)).copied()
    }
}
