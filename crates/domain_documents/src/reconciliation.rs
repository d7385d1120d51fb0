//! Payment reconciliation
//!
//! Payments are recorded against invoices and drive the invoice's paid
//! status through [`crate::invoice::InvoiceService::recompute_status`].
//! Only `Confirmed` payments count toward coverage. The confirmed sum may
//! reach the invoice total exactly but never exceed it; any write that
//! would push it over is rejected outright.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{InvoiceId, Money, PaymentId};
use domain_ledger::JournalEngine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::DocumentError;
use crate::expense::{Actor, PaymentMethod};
use crate::invoice::{InvoiceService, InvoiceStatus};
use crate::outcome::TransitionOutcome;

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl PaymentStatus {
    pub fn allowed_next(&self) -> &'static [PaymentStatus] {
        match self {
            PaymentStatus::Pending => &[PaymentStatus::Confirmed, PaymentStatus::Cancelled],
            PaymentStatus::Confirmed => &[PaymentStatus::Cancelled],
            PaymentStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, target: PaymentStatus) -> bool {
        self.allowed_next().contains(&target)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Confirmed => "CONFIRMED",
            PaymentStatus::Cancelled => "CANCELLED",
        }
    }
}

/// A payment received against an invoice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub received_date: NaiveDate,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    fn guard_transition(&self, requested: PaymentStatus) -> Result<(), DocumentError> {
        if !self.status.can_transition_to(requested) {
            return Err(DocumentError::IllegalTransition {
                from: self.status.name().to_string(),
                requested: requested.name().to_string(),
                allowed: self
                    .status
                    .allowed_next()
                    .iter()
                    .map(|s| s.name().to_string())
                    .collect(),
            });
        }
        Ok(())
    }
}

/// Input for recording a payment
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub invoice_id: InvoiceId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub received_date: NaiveDate,
    /// Record directly as confirmed (bank-verified) or as pending
    pub confirmed: bool,
}

/// Payment reconciliation service
pub struct ReconciliationService {
    payments: HashMap<PaymentId, Payment>,
    order: Vec<PaymentId>,
}

impl ReconciliationService {
    pub fn new() -> Self {
        Self {
            payments: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Records a payment against an invoice
    ///
    /// # Errors
    ///
    /// - `NotFound` when the invoice does not exist
    /// - `Validation` for non-positive amounts or cancelled invoices
    /// - `OverpaymentRejected` when a confirmed payment would push the
    ///   confirmed sum above the invoice total
    pub fn record_payment(
        &mut self,
        new: NewPayment,
        invoices: &mut InvoiceService,
        actor: &Actor,
        journal: &mut JournalEngine,
    ) -> Result<TransitionOutcome<Payment>, DocumentError> {
        let invoice = invoices
            .get(new.invoice_id)
            .ok_or_else(|| DocumentError::not_found(format!("invoice {}", new.invoice_id)))?;
        if invoice.status == InvoiceStatus::Cancelled {
            return Err(DocumentError::validation(format!(
                "invoice {} is cancelled and cannot receive payments",
                invoice.number
            )));
        }
        if !new.amount.is_positive() {
            return Err(DocumentError::validation("payment amount must be positive"));
        }

        let total = invoice.amounts.total;
        if new.confirmed {
            self.check_coverage(new.invoice_id, total, new.amount, None)?;
        }

        let now = Utc::now();
        let payment = Payment {
            id: PaymentId::new_v7(),
            invoice_id: new.invoice_id,
            amount: new.amount,
            method: new.method,
            reference: new.reference,
            received_date: new.received_date,
            status: if new.confirmed {
                PaymentStatus::Confirmed
            } else {
                PaymentStatus::Pending
            },
            created_at: now,
            updated_at: now,
        };

        let id = payment.id;
        self.payments.insert(id, payment.clone());
        self.order.push(id);

        if payment.status == PaymentStatus::Confirmed {
            let outcome = invoices.recompute_status(
                new.invoice_id,
                self.confirmed_total(new.invoice_id),
                actor,
                journal,
            )?;
            return Ok(TransitionOutcome::with_warnings(payment, outcome.warnings));
        }
        Ok(TransitionOutcome::clean(payment))
    }

    /// Confirms a pending payment and re-evaluates invoice coverage
    pub fn confirm_payment(
        &mut self,
        id: PaymentId,
        invoices: &mut InvoiceService,
        actor: &Actor,
        journal: &mut JournalEngine,
    ) -> Result<TransitionOutcome<Payment>, DocumentError> {
        let (invoice_id, amount) = {
            let payment = self.get_ref(id)?;
            payment.guard_transition(PaymentStatus::Confirmed)?;
            (payment.invoice_id, payment.amount)
        };
        let total = invoices
            .get(invoice_id)
            .ok_or_else(|| DocumentError::not_found(format!("invoice {invoice_id}")))?
            .amounts
            .total;
        self.check_coverage(invoice_id, total, amount, Some(id))?;

        let payment = self.get_mut(id)?;
        payment.status = PaymentStatus::Confirmed;
        payment.updated_at = Utc::now();
        let payment = payment.clone();

        let outcome =
            invoices.recompute_status(invoice_id, self.confirmed_total(invoice_id), actor, journal)?;
        Ok(TransitionOutcome::with_warnings(payment, outcome.warnings))
    }

    /// Cancels a payment and re-evaluates invoice coverage
    ///
    /// Cancelling a confirmed payment under a paid invoice does not move
    /// the invoice backwards; the coverage gap is logged for manual review.
    pub fn cancel_payment(
        &mut self,
        id: PaymentId,
        invoices: &mut InvoiceService,
        actor: &Actor,
        journal: &mut JournalEngine,
    ) -> Result<TransitionOutcome<Payment>, DocumentError> {
        let payment = self.get_mut(id)?;
        payment.guard_transition(PaymentStatus::Cancelled)?;
        let was_confirmed = payment.status == PaymentStatus::Confirmed;
        payment.status = PaymentStatus::Cancelled;
        payment.updated_at = Utc::now();
        let payment = payment.clone();

        if was_confirmed {
            let outcome = invoices.recompute_status(
                payment.invoice_id,
                self.confirmed_total(payment.invoice_id),
                actor,
                journal,
            )?;
            return Ok(TransitionOutcome::with_warnings(payment, outcome.warnings));
        }
        Ok(TransitionOutcome::clean(payment))
    }

    /// Corrects the amount of a payment
    ///
    /// Confirmed payments are re-checked against the overpayment rule with
    /// the new amount before the change is applied.
    pub fn update_amount(
        &mut self,
        id: PaymentId,
        amount: Money,
        invoices: &mut InvoiceService,
        actor: &Actor,
        journal: &mut JournalEngine,
    ) -> Result<TransitionOutcome<Payment>, DocumentError> {
        if !amount.is_positive() {
            return Err(DocumentError::validation("payment amount must be positive"));
        }

        let (invoice_id, status) = {
            let payment = self.get_ref(id)?;
            (payment.invoice_id, payment.status)
        };

        if status == PaymentStatus::Confirmed {
            let total = invoices
                .get(invoice_id)
                .ok_or_else(|| DocumentError::not_found(format!("invoice {invoice_id}")))?
                .amounts
                .total;
            self.check_coverage(invoice_id, total, amount, Some(id))?;
        }

        let payment = self.get_mut(id)?;
        payment.amount = amount;
        payment.updated_at = Utc::now();
        let payment = payment.clone();

        if status == PaymentStatus::Confirmed {
            let outcome =
                invoices.recompute_status(invoice_id, self.confirmed_total(invoice_id), actor, journal)?;
            return Ok(TransitionOutcome::with_warnings(payment, outcome.warnings));
        }
        Ok(TransitionOutcome::clean(payment))
    }

    /// Deletes a payment record; confirmed payments must be cancelled first
    pub fn remove(&mut self, id: PaymentId) -> Result<(), DocumentError> {
        let payment = self.get_ref(id)?;
        if payment.status == PaymentStatus::Confirmed {
            return Err(DocumentError::validation(
                "confirmed payments must be cancelled before deletion",
            ));
        }
        self.payments.remove(&id);
        self.order.retain(|p| *p != id);
        Ok(())
    }

    /// Sum of confirmed payments recorded against an invoice
    pub fn confirmed_total(&self, invoice_id: InvoiceId) -> Money {
        self.payments
            .values()
            .filter(|p| p.invoice_id == invoice_id && p.status == PaymentStatus::Confirmed)
            .map(|p| p.amount)
            .sum()
    }

    /// Amount still outstanding on an invoice, floored at zero
    pub fn outstanding(&self, invoice_id: InvoiceId, total: Money) -> Money {
        let confirmed = self.confirmed_total(invoice_id);
        if confirmed >= total {
            Money::zero()
        } else {
            total - confirmed
        }
    }

    pub fn get(&self, id: PaymentId) -> Option<&Payment> {
        self.payments.get(&id)
    }

    /// Payments against an invoice, in recording order
    pub fn payments_for_invoice(&self, invoice_id: InvoiceId) -> Vec<&Payment> {
        self.order
            .iter()
            .filter_map(|id| self.payments.get(id))
            .filter(|p| p.invoice_id == invoice_id)
            .collect()
    }

    /// Rejects the write when confirmed coverage would exceed the total
    ///
    /// `exclude` removes a payment from the existing sum, used when that
    /// payment's own amount is being replaced by `candidate`.
    fn check_coverage(
        &self,
        invoice_id: InvoiceId,
        total: Money,
        candidate: Money,
        exclude: Option<PaymentId>,
    ) -> Result<(), DocumentError> {
        let existing: Money = self
            .payments
            .values()
            .filter(|p| {
                p.invoice_id == invoice_id
                    && p.status == PaymentStatus::Confirmed
                    && Some(p.id) != exclude
            })
            .map(|p| p.amount)
            .sum();
        let attempted = existing + candidate;

        // Exact coverage is allowed; strictly exceeding the total is not.
        if attempted > total && !attempted.approx_eq(&total) {
            return Err(DocumentError::OverpaymentRejected { total, attempted });
        }
        Ok(())
    }

    fn get_ref(&self, id: PaymentId) -> Result<&Payment, DocumentError> {
        self.payments
            .get(&id)
            .ok_or_else(|| DocumentError::not_found(format!("payment {id}")))
    }

    fn get_mut(&mut self, id: PaymentId) -> Result<&mut Payment, DocumentError> {
        self.payments
            .get_mut(&id)
            .ok_or_else(|| DocumentError::not_found(format!("payment {id}")))
    }
}

impl Default for ReconciliationService {
    fn default() -> Self {
        Self::new()
    }
}
