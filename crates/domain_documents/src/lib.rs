//! Document Domain - Business Document Lifecycles
//!
//! This crate drives the state machines of the business documents
//! (expenses, quotations, invoices, purchase orders) and reconciles
//! incoming payments against invoices.
//!
//! # Transition Discipline
//!
//! Every document carries an explicit allowed-transition table. A request
//! for a transition outside the table fails with
//! [`DocumentError::IllegalTransition`], naming the states that would have
//! been legal.
//!
//! # Primary vs. Secondary Effects
//!
//! A transition's primary effect is the document status change. Journal
//! postings and notifications are secondary: when one fails, the transition
//! still commits, the failure is logged, and the caller receives it as a
//! warning on [`TransitionOutcome`]. Documents left without their expected
//! journal reference are surfaced by the per-service `unposted_*` metrics.

pub mod error;
pub mod expense;
pub mod invoice;
pub mod outcome;
pub mod purchase_order;
pub mod quotation;
pub mod reconciliation;

pub use error::DocumentError;
pub use expense::{
    Actor, ApprovalRecord, Expense, ExpenseService, ExpenseStatus, NewExpense, PaymentDetails,
    PaymentMethod, UpdateExpense,
};
pub use invoice::{
    materai_threshold, Invoice, InvoiceService, InvoiceStatus, NewInvoice, UpdateInvoice,
    MATERAI_THRESHOLD_RUPIAH,
};
pub use outcome::{SecondaryEffect, SecondaryEffectFailure, TransitionOutcome};
pub use purchase_order::{
    NewPurchaseOrder, PurchaseOrder, PurchaseOrderService, PurchaseOrderStatus,
};
pub use quotation::{NewQuotation, Quotation, QuotationService, QuotationStatus};
pub use reconciliation::{NewPayment, Payment, PaymentStatus, ReconciliationService};
