//! Journal engine
//!
//! The sole writer of ledger state. The engine validates that every entry
//! balances before it is stored, owns the draft -> posted transition, and
//! produces reversing entries for corrections.
//!
//! # Invariants
//!
//! - An entry is only ever stored if its debits equal its credits
//! - Posting is one-way; a posted entry is never mutated again
//! - Corrections are new reversing entries, never edits

use chrono::{NaiveDate, Utc};
use core_kernel::{JournalEntryId, Money};
use std::collections::HashMap;
use uuid::Uuid;

use crate::accounts::{is_valid_code_format, ChartOfAccounts};
use crate::error::LedgerError;
use crate::events::{posting_rule, PostingEvent, RuleAccount};
use crate::journal::{JournalEntry, JournalLineItem, JournalStatus, TransactionType};

/// Input for creating a journal entry
#[derive(Debug, Clone)]
pub struct NewJournalEntry {
    pub description: String,
    pub entry_date: NaiveDate,
    /// Source business document id
    pub transaction_id: Uuid,
    pub transaction_type: TransactionType,
    pub line_items: Vec<JournalLineItem>,
    pub created_by: String,
}

/// Creates, balances, and posts journal entries
#[derive(Debug)]
pub struct JournalEngine {
    chart: ChartOfAccounts,
    entries: HashMap<JournalEntryId, JournalEntry>,
    /// Entry ids in creation order
    order: Vec<JournalEntryId>,
}

impl JournalEngine {
    /// Creates an engine over the standard chart of accounts
    pub fn new() -> Self {
        Self::with_chart(ChartOfAccounts::standard())
    }

    /// Creates an engine over a custom chart
    pub fn with_chart(chart: ChartOfAccounts) -> Self {
        Self {
            chart,
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// The chart of accounts this engine posts against
    pub fn chart(&self) -> &ChartOfAccounts {
        &self.chart
    }

    /// Creates a draft entry after validating balance and accounts
    ///
    /// # Errors
    ///
    /// - `EmptyEntry` when no line items are supplied
    /// - `InvalidAccountCode` / `AccountNotFound` for bad account references
    /// - `InvalidAmount` for negative debit or credit amounts
    /// - `UnbalancedEntry` when debits and credits differ; the entry is
    ///   not stored in that case
    pub fn create_entry(&mut self, new: NewJournalEntry) -> Result<JournalEntryId, LedgerError> {
        if new.line_items.is_empty() {
            return Err(LedgerError::EmptyEntry);
        }

        for line in &new.line_items {
            if !is_valid_code_format(&line.account_code) {
                return Err(LedgerError::InvalidAccountCode(line.account_code.clone()));
            }
            if !self.chart.is_postable(&line.account_code) {
                return Err(LedgerError::AccountNotFound(line.account_code.clone()));
            }
            if line.debit.is_negative() || line.credit.is_negative() {
                return Err(LedgerError::InvalidAmount(format!(
                    "negative amount on account {}",
                    line.account_code
                )));
            }
        }

        let entry = JournalEntry {
            id: JournalEntryId::new_v7(),
            entry_date: new.entry_date,
            description: new.description,
            transaction_id: new.transaction_id,
            transaction_type: new.transaction_type,
            status: JournalStatus::Draft,
            created_by: new.created_by,
            posted_by: None,
            line_items: new.line_items,
            created_at: Utc::now(),
            posted_at: None,
        };

        if !entry.is_balanced() {
            return Err(LedgerError::UnbalancedEntry {
                debits: entry.total_debits().amount(),
                credits: entry.total_credits().amount(),
            });
        }

        let id = entry.id;
        self.entries.insert(id, entry);
        self.order.push(id);
        Ok(id)
    }

    /// Posts a draft entry; one-way transition
    pub fn post_entry(
        &mut self,
        entry_id: JournalEntryId,
        posted_by: &str,
    ) -> Result<&JournalEntry, LedgerError> {
        let entry = self
            .entries
            .get_mut(&entry_id)
            .ok_or_else(|| LedgerError::EntryNotFound(entry_id.to_string()))?;

        if entry.status == JournalStatus::Posted {
            return Err(LedgerError::AlreadyPosted(entry_id.to_string()));
        }

        entry.status = JournalStatus::Posted;
        entry.posted_by = Some(posted_by.to_string());
        entry.posted_at = Some(Utc::now());

        tracing::debug!(entry = %entry_id, posted_by, "journal entry posted");
        Ok(&*entry)
    }

    /// Gets an entry by id
    pub fn get_entry(&self, entry_id: JournalEntryId) -> Option<&JournalEntry> {
        self.entries.get(&entry_id)
    }

    /// All entries recorded against a source document, in creation order
    pub fn entries_for_transaction(&self, transaction_id: Uuid) -> Vec<&JournalEntry> {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .filter(|e| e.transaction_id == transaction_id)
            .collect()
    }

    /// Creates a posted reversing entry for a previously posted entry
    ///
    /// The reversal carries the original's line items with debit and credit
    /// swapped and a cross-reference in its description.
    pub fn reverse_entry(
        &mut self,
        entry_id: JournalEntryId,
        reason: &str,
        actor: &str,
    ) -> Result<JournalEntryId, LedgerError> {
        let original = self
            .entries
            .get(&entry_id)
            .ok_or_else(|| LedgerError::EntryNotFound(entry_id.to_string()))?;

        if original.status != JournalStatus::Posted {
            return Err(LedgerError::NotPosted(entry_id.to_string()));
        }

        let reversal = NewJournalEntry {
            description: format!("Reversal of {entry_id}: {reason}"),
            entry_date: original.entry_date,
            transaction_id: original.transaction_id,
            transaction_type: TransactionType::Reversal,
            line_items: original.line_items.iter().map(|l| l.swapped()).collect(),
            created_by: actor.to_string(),
        };

        let reversal_id = self.create_entry(reversal)?;
        self.post_entry(reversal_id, actor)?;
        Ok(reversal_id)
    }

    /// Builds the two canonical line items for a document event as a draft
    ///
    /// The mapping from event to debit/credit accounts is the exhaustive
    /// table in [`crate::events`]. `account_code` supplies the document-side
    /// account where the rule calls for one (expense category accounts).
    pub fn create_document_entry(
        &mut self,
        event: PostingEvent,
        document_id: Uuid,
        document_number: &str,
        account_code: &str,
        amount: Money,
        entry_date: NaiveDate,
        actor: &str,
    ) -> Result<JournalEntryId, LedgerError> {
        let rule = posting_rule(event);

        let resolve = |side: RuleAccount| -> String {
            match side {
                RuleAccount::Fixed(code) => code.to_string(),
                RuleAccount::Document => account_code.to_string(),
            }
        };

        let line_items = vec![
            JournalLineItem::debit(resolve(rule.debit), amount),
            JournalLineItem::credit(resolve(rule.credit), amount),
        ];

        self.create_entry(NewJournalEntry {
            description: format!("{} - {}", rule.label, document_number),
            entry_date,
            transaction_id: document_id,
            transaction_type: rule.transaction_type,
            line_items,
            created_by: actor.to_string(),
        })
    }

    /// Creates and immediately posts a document entry
    pub fn post_document_entry(
        &mut self,
        event: PostingEvent,
        document_id: Uuid,
        document_number: &str,
        account_code: &str,
        amount: Money,
        entry_date: NaiveDate,
        actor: &str,
    ) -> Result<JournalEntryId, LedgerError> {
        let id = self.create_document_entry(
            event,
            document_id,
            document_number,
            account_code,
            amount,
            entry_date,
            actor,
        )?;
        self.post_entry(id, actor)?;
        Ok(id)
    }

    /// Number of entries still in draft
    pub fn draft_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.status == JournalStatus::Draft)
            .count()
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for JournalEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::codes;

    fn balanced_entry() -> NewJournalEntry {
        NewJournalEntry {
            description: "Office rent".to_string(),
            entry_date: NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
            transaction_id: Uuid::new_v4(),
            transaction_type: TransactionType::Expense,
            line_items: vec![
                JournalLineItem::debit(codes::RENT_EXPENSE, Money::from_rupiah(5_000_000)),
                JournalLineItem::credit(codes::ACCOUNTS_PAYABLE, Money::from_rupiah(5_000_000)),
            ],
            created_by: "tester".to_string(),
        }
    }

    #[test]
    fn test_create_and_post() {
        let mut engine = JournalEngine::new();
        let id = engine.create_entry(balanced_entry()).unwrap();
        assert_eq!(engine.draft_count(), 1);

        let posted = engine.post_entry(id, "approver").unwrap();
        assert!(posted.is_posted());
        assert_eq!(posted.posted_by.as_deref(), Some("approver"));
        assert_eq!(engine.draft_count(), 0);
    }

    #[test]
    fn test_unbalanced_entry_not_stored() {
        let mut engine = JournalEngine::new();
        let mut new = balanced_entry();
        new.line_items = vec![
            JournalLineItem::debit(codes::RENT_EXPENSE, Money::from_rupiah(100)),
            JournalLineItem::credit(codes::ACCOUNTS_PAYABLE, Money::from_rupiah(90)),
        ];

        let result = engine.create_entry(new);
        assert!(matches!(result, Err(LedgerError::UnbalancedEntry { .. })));
        assert!(engine.is_empty());
    }

    #[test]
    fn test_posting_twice_fails() {
        let mut engine = JournalEngine::new();
        let id = engine.create_entry(balanced_entry()).unwrap();
        engine.post_entry(id, "a").unwrap();

        let result = engine.post_entry(id, "b");
        assert!(matches!(result, Err(LedgerError::AlreadyPosted(_))));
    }

    #[test]
    fn test_empty_entry_rejected() {
        let mut engine = JournalEngine::new();
        let mut new = balanced_entry();
        new.line_items.clear();
        assert!(matches!(
            engine.create_entry(new),
            Err(LedgerError::EmptyEntry)
        ));
    }

    #[test]
    fn test_unknown_account_rejected() {
        let mut engine = JournalEngine::new();
        let mut new = balanced_entry();
        new.line_items[0].account_code = "9-9999".to_string();
        assert!(matches!(
            engine.create_entry(new),
            Err(LedgerError::AccountNotFound(_))
        ));
    }

    #[test]
    fn test_malformed_account_code_rejected() {
        let mut engine = JournalEngine::new();
        let mut new = balanced_entry();
        new.line_items[0].account_code = "61000".to_string();
        assert!(matches!(
            engine.create_entry(new),
            Err(LedgerError::InvalidAccountCode(_))
        ));
    }

    #[test]
    fn test_reversal_swaps_sides_and_balances() {
        let mut engine = JournalEngine::new();
        let id = engine.create_entry(balanced_entry()).unwrap();
        engine.post_entry(id, "approver").unwrap();

        let reversal_id = engine.reverse_entry(id, "amount corrected", "approver").unwrap();
        let reversal = engine.get_entry(reversal_id).unwrap();

        assert!(reversal.is_posted());
        assert!(reversal.is_balanced());
        assert_eq!(reversal.transaction_type, TransactionType::Reversal);
        assert!(reversal.description.contains(&id.to_string()));
        // Original debit side became credit side
        assert_eq!(reversal.line_items[0].credit, Money::from_rupiah(5_000_000));
        assert!(reversal.line_items[0].debit.is_zero());
    }

    #[test]
    fn test_reversing_a_draft_fails() {
        let mut engine = JournalEngine::new();
        let id = engine.create_entry(balanced_entry()).unwrap();
        let result = engine.reverse_entry(id, "nope", "x");
        assert!(matches!(result, Err(LedgerError::NotPosted(_))));
    }

    #[test]
    fn test_document_entry_resolves_accounts() {
        let mut engine = JournalEngine::new();
        let doc_id = Uuid::new_v4();
        let id = engine
            .post_document_entry(
                PostingEvent::ExpenseApproved,
                doc_id,
                "EXP-2026-00001",
                codes::OPERATING_EXPENSE,
                Money::from_rupiah(1_000_000),
                NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
                "approver",
            )
            .unwrap();

        let entry = engine.get_entry(id).unwrap();
        assert_eq!(entry.line_items[0].account_code, codes::OPERATING_EXPENSE);
        assert_eq!(entry.line_items[1].account_code, codes::ACCOUNTS_PAYABLE);
        assert!(entry.is_posted());
        assert_eq!(engine.entries_for_transaction(doc_id).len(), 1);
    }
}
