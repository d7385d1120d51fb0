//! Ports for external collaborators
//!
//! The accounting core talks to the outside world through narrow traits.
//! Notification delivery is the one collaborator the domain services invoke
//! directly; it is strictly fire-and-forget, and a failed send must never
//! abort the business transition that triggered it (callers catch and log).

use serde_json::Value;
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;

/// Notification categories emitted by the document lifecycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    InvoiceOverdue,
    PaymentReminder,
    ExpenseSettled,
    QuotationExpired,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NotificationKind::InvoiceOverdue => "invoice_overdue",
            NotificationKind::PaymentReminder => "payment_reminder",
            NotificationKind::ExpenseSettled => "expense_settled",
            NotificationKind::QuotationExpired => "quotation_expired",
        };
        write!(f, "{name}")
    }
}

/// Error from a notification adapter
#[derive(Debug, Error)]
#[error("Notification delivery failed: {0}")]
pub struct NotifyError(pub String);

/// Fire-and-forget notification delivery
pub trait Notifier: Send + Sync {
    /// Sends a notification to a recipient with template data
    fn send(&self, kind: NotificationKind, recipient: &str, payload: Value)
        -> Result<(), NotifyError>;
}

/// Notifier that discards everything, for contexts without delivery wiring
#[derive(Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn send(&self, _: NotificationKind, _: &str, _: Value) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Test double that records every send
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(NotificationKind, String)>>,
    /// When set, every send fails with this message
    fail_with: Option<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a notifier whose sends always fail
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(message.into()),
        }
    }

    /// Returns the (kind, recipient) pairs recorded so far
    pub fn sent(&self) -> Vec<(NotificationKind, String)> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, kind: NotificationKind, recipient: &str, _: Value) -> Result<(), NotifyError> {
        if let Some(message) = &self.fail_with {
            return Err(NotifyError(message.clone()));
        }
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push((kind, recipient.to_string()));
        Ok(())
    }
}
