//! Journal entry types
//!
//! A journal entry is an ordered set of debit/credit line items against the
//! chart of accounts. Entries are created in `Draft`, transition exactly once
//! to `Posted`, and are immutable afterwards; corrections always go through a
//! new reversing entry.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{JournalEntryId, Money, TOLERANCE};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Journal entry lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JournalStatus {
    Draft,
    Posted,
}

/// The kind of business transaction an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Expense,
    ExpensePayment,
    Invoice,
    InvoicePayment,
    PurchaseOrder,
    PurchaseOrderPayment,
    Reversal,
}

/// A single debit or credit line in a journal entry
///
/// Exactly one of `debit`/`credit` is non-zero per line by convention; the
/// model does not hard-enforce single-sidedness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLineItem {
    /// Chart-of-accounts code, `N-NNNN` format
    pub account_code: String,
    pub debit: Money,
    pub credit: Money,
    pub description: Option<String>,
}

impl JournalLineItem {
    /// Creates a debit line
    pub fn debit(account_code: impl Into<String>, amount: Money) -> Self {
        Self {
            account_code: account_code.into(),
            debit: amount,
            credit: Money::zero(),
            description: None,
        }
    }

    /// Creates a credit line
    pub fn credit(account_code: impl Into<String>, amount: Money) -> Self {
        Self {
            account_code: account_code.into(),
            debit: Money::zero(),
            credit: amount,
            description: None,
        }
    }

    /// Adds a line description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the same line with debit and credit swapped
    pub fn swapped(&self) -> Self {
        Self {
            account_code: self.account_code.clone(),
            debit: self.credit,
            credit: self.debit,
            description: self.description.clone(),
        }
    }
}

/// A journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: JournalEntryId,
    pub entry_date: NaiveDate,
    pub description: String,
    /// Source business document
    pub transaction_id: Uuid,
    pub transaction_type: TransactionType,
    pub status: JournalStatus,
    pub created_by: String,
    pub posted_by: Option<String>,
    pub line_items: Vec<JournalLineItem>,
    pub created_at: DateTime<Utc>,
    pub posted_at: Option<DateTime<Utc>>,
}

impl JournalEntry {
    /// Sum of all debit amounts
    pub fn total_debits(&self) -> Money {
        self.line_items.iter().map(|l| l.debit).sum()
    }

    /// Sum of all credit amounts
    pub fn total_credits(&self) -> Money {
        self.line_items.iter().map(|l| l.credit).sum()
    }

    /// True when debits equal credits within the reconciliation tolerance
    pub fn is_balanced(&self) -> bool {
        let diff = (self.total_debits().amount() - self.total_credits().amount()).abs();
        diff < TOLERANCE
    }

    /// True once the entry has been posted
    pub fn is_posted(&self) -> bool {
        self.status == JournalStatus::Posted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with_lines(lines: Vec<JournalLineItem>) -> JournalEntry {
        JournalEntry {
            id: JournalEntryId::new_v7(),
            entry_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            description: "test".to_string(),
            transaction_id: Uuid::new_v4(),
            transaction_type: TransactionType::Expense,
            status: JournalStatus::Draft,
            created_by: "tester".to_string(),
            posted_by: None,
            line_items: lines,
            created_at: Utc::now(),
            posted_at: None,
        }
    }

    #[test]
    fn test_balanced_entry() {
        let entry = entry_with_lines(vec![
            JournalLineItem::debit("6-1000", Money::from_rupiah(100)),
            JournalLineItem::credit("2-1100", Money::from_rupiah(100)),
        ]);
        assert!(entry.is_balanced());
    }

    #[test]
    fn test_unbalanced_entry() {
        let entry = entry_with_lines(vec![
            JournalLineItem::debit("6-1000", Money::from_rupiah(100)),
            JournalLineItem::credit("2-1100", Money::from_rupiah(90)),
        ]);
        assert!(!entry.is_balanced());
    }

    #[test]
    fn test_swapped_line() {
        let line = JournalLineItem::debit("1-1000", Money::from_rupiah(500));
        let swapped = line.swapped();
        assert!(swapped.debit.is_zero());
        assert_eq!(swapped.credit, Money::from_rupiah(500));
        assert_eq!(swapped.account_code, "1-1000");
    }
}
