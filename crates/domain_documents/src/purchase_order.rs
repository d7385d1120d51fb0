//! Purchase order lifecycle
//!
//! States: `Draft -> Submitted -> Approved -> Received -> Paid`, with
//! `Submitted -> Rejected` as the terminal alternative. The ledger is only
//! touched once goods arrive: receiving books the liability (Dr inventory /
//! Cr accounts payable), payment clears it against cash. Approval alone has
//! no accounting effect for purchase orders.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{
    temporal, DocumentKind, JournalEntryId, Money, PurchaseOrderId, SequenceCounter,
};
use domain_ledger::{codes, JournalEngine, PostingEvent};
use domain_tax::{DocumentAmounts, TaxProfile, WithholdingProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::DocumentError;
use crate::expense::Actor;
use crate::outcome::{SecondaryEffectFailure, TransitionOutcome};

/// Purchase order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseOrderStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
    Received,
    Paid,
}

impl PurchaseOrderStatus {
    pub fn allowed_next(&self) -> &'static [PurchaseOrderStatus] {
        match self {
            PurchaseOrderStatus::Draft => &[PurchaseOrderStatus::Submitted],
            PurchaseOrderStatus::Submitted => {
                &[PurchaseOrderStatus::Approved, PurchaseOrderStatus::Rejected]
            }
            PurchaseOrderStatus::Approved => &[PurchaseOrderStatus::Received],
            PurchaseOrderStatus::Received => &[PurchaseOrderStatus::Paid],
            PurchaseOrderStatus::Rejected | PurchaseOrderStatus::Paid => &[],
        }
    }

    pub fn can_transition_to(&self, target: PurchaseOrderStatus) -> bool {
        self.allowed_next().contains(&target)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Draft => "DRAFT",
            PurchaseOrderStatus::Submitted => "SUBMITTED",
            PurchaseOrderStatus::Approved => "APPROVED",
            PurchaseOrderStatus::Rejected => "REJECTED",
            PurchaseOrderStatus::Received => "RECEIVED",
            PurchaseOrderStatus::Paid => "PAID",
        }
    }
}

/// A purchase order document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    /// Human-readable number, `PO-YYYY-NNNNN`
    pub number: String,
    pub vendor_name: String,
    pub description: String,
    pub order_date: NaiveDate,
    pub expected_date: Option<NaiveDate>,
    pub amounts: DocumentAmounts,
    pub tax_profile: Option<TaxProfile>,
    pub withholding: WithholdingProfile,
    pub status: PurchaseOrderStatus,
    /// Liability entry posted at goods receipt
    pub receipt_journal_id: Option<JournalEntryId>,
    /// Clearing entry posted at payment
    pub payment_journal_id: Option<JournalEntryId>,
    pub received_date: Option<NaiveDate>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PurchaseOrder {
    fn guard_transition(&self, requested: PurchaseOrderStatus) -> Result<(), DocumentError> {
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

/// Input for creating a purchase order
#[derive(Debug, Clone)]
pub struct NewPurchaseOrder {
    pub vendor_name: String,
    pub description: String,
    pub order_date: NaiveDate,
    pub expected_date: Option<NaiveDate>,
    pub gross: Money,
    pub tax_profile: Option<TaxProfile>,
    pub withholding: WithholdingProfile,
}

/// Purchase order lifecycle service
pub struct PurchaseOrderService {
    orders: HashMap<PurchaseOrderId, PurchaseOrder>,
    order: Vec<PurchaseOrderId>,
    sequence: SequenceCounter,
}

impl PurchaseOrderService {
    pub fn new() -> Self {
        Self {
            orders: HashMap::new(),
            order: Vec::new(),
            sequence: SequenceCounter::new(),
        }
    }

    /// Creates a purchase order in `Draft`
    pub fn create(&mut self, new: NewPurchaseOrder) -> Result<PurchaseOrder, DocumentError> {
        if new.vendor_name.trim().is_empty() {
            return Err(DocumentError::validation("vendor name is required"));
        }
        if let Some(expected) = new.expected_date {
            if expected < new.order_date {
                return Err(DocumentError::validation(
                    "expected date precedes the order date",
                ));
            }
        }

        let profile = new.tax_profile.unwrap_or_else(TaxProfile::exempt);
        let amounts = DocumentAmounts::derive(
            new.gross,
            &profile,
            new.withholding.withholding_type,
            new.withholding.rate,
        )?;

        let now = Utc::now();
        let order = PurchaseOrder {
            id: PurchaseOrderId::new_v7(),
            number: self
                .sequence
                .next(DocumentKind::PurchaseOrder, temporal::jakarta_year()),
            vendor_name: new.vendor_name,
            description: new.description,
            order_date: new.order_date,
            expected_date: new.expected_date,
            amounts,
            tax_profile: new.tax_profile,
            withholding: new.withholding,
            status: PurchaseOrderStatus::Draft,
            receipt_journal_id: None,
            payment_journal_id: None,
            received_date: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };

        let id = order.id;
        self.orders.insert(id, order.clone());
        self.order.push(id);
        Ok(order)
    }

    pub fn submit(&mut self, id: PurchaseOrderId) -> Result<PurchaseOrder, DocumentError> {
        let order = self.get_mut(id)?;
        order.guard_transition(PurchaseOrderStatus::Submitted)?;
        order.status = PurchaseOrderStatus::Submitted;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    /// Approves a submitted order; no accounting effect yet
    pub fn approve(&mut self, id: PurchaseOrderId) -> Result<PurchaseOrder, DocumentError> {
        let order = self.get_mut(id)?;
        order.guard_transition(PurchaseOrderStatus::Approved)?;
        order.status = PurchaseOrderStatus::Approved;
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    pub fn reject(
        &mut self,
        id: PurchaseOrderId,
        reason: impl Into<String>,
    ) -> Result<PurchaseOrder, DocumentError> {
        let order = self.get_mut(id)?;
        order.guard_transition(PurchaseOrderStatus::Rejected)?;
        order.status = PurchaseOrderStatus::Rejected;
        order.rejection_reason = Some(reason.into());
        order.updated_at = Utc::now();
        Ok(order.clone())
    }

    /// Records goods receipt and books the liability
    pub fn mark_received(
        &mut self,
        id: PurchaseOrderId,
        actor: &Actor,
        received_date: NaiveDate,
        journal: &mut JournalEngine,
    ) -> Result<TransitionOutcome<PurchaseOrder>, DocumentError> {
        let order = self.get_mut(id)?;
        order.guard_transition(PurchaseOrderStatus::Received)?;
        order.status = PurchaseOrderStatus::Received;
        order.received_date = Some(received_date);
        order.updated_at = Utc::now();

        let mut warnings = Vec::new();
        match journal.post_document_entry(
            PostingEvent::PurchaseOrderReceived,
            *order.id.as_uuid(),
            &order.number,
            codes::INVENTORY,
            order.amounts.total,
            received_date,
            &actor.id,
        ) {
            Ok(entry_id) => order.receipt_journal_id = Some(entry_id),
            Err(err) => {
                tracing::warn!(order = %order.number, error = %err, "receipt journal posting failed");
                warnings.push(SecondaryEffectFailure::journal(&err));
            }
        }

        Ok(TransitionOutcome::with_warnings(order.clone(), warnings))
    }

    /// Marks a received order paid and clears the liability
    pub fn mark_paid(
        &mut self,
        id: PurchaseOrderId,
        actor: &Actor,
        journal: &mut JournalEngine,
    ) -> Result<TransitionOutcome<PurchaseOrder>, DocumentError> {
        let order = self.get_mut(id)?;
        order.guard_transition(PurchaseOrderStatus::Paid)?;
        order.status = PurchaseOrderStatus::Paid;
        order.updated_at = Utc::now();

        let mut warnings = Vec::new();
        match journal.post_document_entry(
            PostingEvent::PurchaseOrderPaid,
            *order.id.as_uuid(),
            &order.number,
            codes::CASH,
            order.amounts.total,
            temporal::jakarta_today(),
            &actor.id,
        ) {
            Ok(entry_id) => order.payment_journal_id = Some(entry_id),
            Err(err) => {
                tracing::warn!(order = %order.number, error = %err, "payment journal posting failed");
                warnings.push(SecondaryEffectFailure::journal(&err));
            }
        }

        Ok(TransitionOutcome::with_warnings(order.clone(), warnings))
    }

    pub fn get(&self, id: PurchaseOrderId) -> Option<&PurchaseOrder> {
        self.orders.get(&id)
    }

    pub fn list(&self) -> Vec<&PurchaseOrder> {
        self.order
            .iter()
            .filter_map(|id| self.orders.get(id))
            .collect()
    }

    /// Orders whose status implies a journal reference that is missing
    pub fn unposted_orders(&self) -> Vec<PurchaseOrderId> {
        self.order
            .iter()
            .filter_map(|id| self.orders.get(id))
            .filter(|o| match o.status {
                PurchaseOrderStatus::Received => o.receipt_journal_id.is_none(),
                PurchaseOrderStatus::Paid => {
                    o.receipt_journal_id.is_none() || o.payment_journal_id.is_none()
                }
                _ => false,
            })
            .map(|o| o.id)
            .collect()
    }

    fn get_mut(&mut self, id: PurchaseOrderId) -> Result<&mut PurchaseOrder, DocumentError> {
        self.orders
            .get_mut(&id)
            .ok_or_else(|| DocumentError::not_found(format!("purchase order {id}")))
    }
}

impl Default for PurchaseOrderService {
    fn default() -> Self {
        Self::new()
    }
}
