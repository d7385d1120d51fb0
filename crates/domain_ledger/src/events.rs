//! Posting events and their canonical line items
//!
//! Every document transition that produces an accounting side effect is
//! tagged with a [`PostingEvent`]. The mapping from event to its two
//! canonical line items lives here and nowhere else; the `match` is
//! exhaustive, so adding an event without a rule is a compile error.

use serde::{Deserialize, Serialize};

use crate::accounts::codes;
use crate::journal::TransactionType;

/// Document transitions that post to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PostingEvent {
    /// Expense approved: liability recognized
    ExpenseApproved,
    /// Approved expense paid: liability cleared from cash
    ExpensePaid,
    /// Expense created under the immediate-pay policy: expense settled from cash
    ExpenseSettled,
    /// Invoice issued to a client: receivable recognized
    InvoiceIssued,
    /// Invoice paid: receivable cleared into cash
    InvoicePaid,
    /// Purchase order goods received: inventory and payable recognized
    PurchaseOrderReceived,
    /// Purchase order paid: payable cleared from cash
    PurchaseOrderPaid,
}

/// One side of a posting rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAccount {
    /// A fixed chart-of-accounts code
    Fixed(&'static str),
    /// The account carried on the source document (e.g. expense category)
    Document,
}

/// The canonical debit/credit pair for a posting event
#[derive(Debug, Clone, Copy)]
pub struct PostingRule {
    pub debit: RuleAccount,
    pub credit: RuleAccount,
    pub label: &'static str,
    pub transaction_type: TransactionType,
}

/// Returns the posting rule for an event
pub fn posting_rule(event: PostingEvent) -> PostingRule {
    match event {
        PostingEvent::ExpenseApproved => PostingRule {
            debit: RuleAccount::Document,
            credit: RuleAccount::Fixed(codes::ACCOUNTS_PAYABLE),
            label: "Expense approved",
            transaction_type: TransactionType::Expense,
        },
        PostingEvent::ExpensePaid => PostingRule {
            debit: RuleAccount::Fixed(codes::ACCOUNTS_PAYABLE),
            credit: RuleAccount::Fixed(codes::CASH),
            label: "Expense payment",
            transaction_type: TransactionType::ExpensePayment,
        },
        PostingEvent::ExpenseSettled => PostingRule {
            debit: RuleAccount::Document,
            credit: RuleAccount::Fixed(codes::CASH),
            label: "Expense settled",
            transaction_type: TransactionType::ExpensePayment,
        },
        PostingEvent::InvoiceIssued => PostingRule {
            debit: RuleAccount::Fixed(codes::ACCOUNTS_RECEIVABLE),
            credit: RuleAccount::Fixed(codes::SERVICE_REVENUE),
            label: "Invoice issued",
            transaction_type: TransactionType::Invoice,
        },
        PostingEvent::InvoicePaid => PostingRule {
            debit: RuleAccount::Fixed(codes::CASH),
            credit: RuleAccount::Fixed(codes::ACCOUNTS_RECEIVABLE),
            label: "Invoice payment",
            transaction_type: TransactionType::InvoicePayment,
        },
        PostingEvent::PurchaseOrderReceived => PostingRule {
            debit: RuleAccount::Fixed(codes::INVENTORY),
            credit: RuleAccount::Fixed(codes::ACCOUNTS_PAYABLE),
            label: "Purchase order received",
            transaction_type: TransactionType::PurchaseOrder,
        },
        PostingEvent::PurchaseOrderPaid => PostingRule {
            debit: RuleAccount::Fixed(codes::ACCOUNTS_PAYABLE),
            credit: RuleAccount::Fixed(codes::CASH),
            label: "Purchase order payment",
            transaction_type: TransactionType::PurchaseOrderPayment,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_EVENTS: [PostingEvent; 7] = [
        PostingEvent::ExpenseApproved,
        PostingEvent::ExpensePaid,
        PostingEvent::ExpenseSettled,
        PostingEvent::InvoiceIssued,
        PostingEvent::InvoicePaid,
        PostingEvent::PurchaseOrderReceived,
        PostingEvent::PurchaseOrderPaid,
    ];

    #[test]
    fn test_every_event_has_a_rule() {
        for event in ALL_EVENTS {
            let rule = posting_rule(event);
            assert!(!rule.label.is_empty());
            assert_ne!(rule.debit, rule.credit, "sides must differ for {event:?}");
        }
    }

    #[test]
    fn test_expense_approved_hits_payables() {
        let rule = posting_rule(PostingEvent::ExpenseApproved);
        assert_eq!(rule.debit, RuleAccount::Document);
        assert_eq!(rule.credit, RuleAccount::Fixed(codes::ACCOUNTS_PAYABLE));
    }

    #[test]
    fn test_expense_paid_clears_payables_from_cash() {
        let rule = posting_rule(PostingEvent::ExpensePaid);
        assert_eq!(rule.debit, RuleAccount::Fixed(codes::ACCOUNTS_PAYABLE));
        assert_eq!(rule.credit, RuleAccount::Fixed(codes::CASH));
    }
}
