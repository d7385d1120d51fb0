//! Quotation lifecycle
//!
//! States: `Draft -> Sent -> {Approved, Rejected, Expired}`. Quotations
//! never touch the ledger; an approved quotation's only downstream effect
//! is conversion into an invoice (see [`crate::invoice`]).

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{
    temporal, ClientId, DocumentKind, Money, NotificationKind, Notifier, NullNotifier,
    QuotationId, SequenceCounter,
};
use domain_tax::{DocumentAmounts, TaxProfile, WithholdingProfile};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::DocumentError;
use crate::outcome::{SecondaryEffectFailure, TransitionOutcome};

/// Quotation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuotationStatus {
    Draft,
    Sent,
    Approved,
    Rejected,
    Expired,
}

impl QuotationStatus {
    pub fn allowed_next(&self) -> &'static [QuotationStatus] {
        match self {
            QuotationStatus::Draft => &[QuotationStatus::Sent],
            QuotationStatus::Sent => &[
                QuotationStatus::Approved,
                QuotationStatus::Rejected,
                QuotationStatus::Expired,
            ],
            QuotationStatus::Approved | QuotationStatus::Rejected | QuotationStatus::Expired => &[],
        }
    }

    pub fn can_transition_to(&self, target: QuotationStatus) -> bool {
        self.allowed_next().contains(&target)
    }

    pub fn name(&self) -> &'static str {
        match self {
            QuotationStatus::Draft => "DRAFT",
            QuotationStatus::Sent => "SENT",
            QuotationStatus::Approved => "APPROVED",
            QuotationStatus::Rejected => "REJECTED",
            QuotationStatus::Expired => "EXPIRED",
        }
    }
}

/// A quotation document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quotation {
    pub id: QuotationId,
    /// Human-readable number, `QUO-YYYY-NNNNN`
    pub number: String,
    pub client_id: ClientId,
    /// Contact the client receives notifications at
    pub client_contact: String,
    pub description: String,
    pub quote_date: NaiveDate,
    pub valid_until: NaiveDate,
    pub amounts: DocumentAmounts,
    pub tax_profile: Option<TaxProfile>,
    pub withholding: WithholdingProfile,
    pub status: QuotationStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quotation {
    fn guard_transition(&self, requested: QuotationStatus) -> Result<(), DocumentError> {
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

/// Input for creating a quotation
#[derive(Debug, Clone)]
pub struct NewQuotation {
    pub client_id: ClientId,
    pub client_contact: String,
    pub description: String,
    pub quote_date: NaiveDate,
    pub valid_until: NaiveDate,
    pub gross: Money,
    pub tax_profile: Option<TaxProfile>,
    pub withholding: WithholdingProfile,
}

/// Quotation lifecycle service
pub struct QuotationService {
    quotations: HashMap<QuotationId, Quotation>,
    order: Vec<QuotationId>,
    sequence: SequenceCounter,
    clients: HashSet<ClientId>,
    notifier: Arc<dyn Notifier>,
}

impl QuotationService {
    pub fn new() -> Self {
        Self::with_notifier(Arc::new(NullNotifier))
    }

    pub fn with_notifier(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            quotations: HashMap::new(),
            order: Vec::new(),
            sequence: SequenceCounter::new(),
            clients: HashSet::new(),
            notifier,
        }
    }

    pub fn register_client(&mut self, id: ClientId) {
        self.clients.insert(id);
    }

    /// Creates a quotation in `Draft`
    pub fn create(&mut self, new: NewQuotation) -> Result<Quotation, DocumentError> {
        if !self.clients.contains(&new.client_id) {
            return Err(DocumentError::not_found(format!("client {}", new.client_id)));
        }
        if new.valid_until < new.quote_date {
            return Err(DocumentError::validation(
                "validity date precedes the quote date",
            ));
        }

        let profile = new.tax_profile.unwrap_or_else(TaxProfile::exempt);
        let amounts = DocumentAmounts::derive(
            new.gross,
            &profile,
            new.withholding.withholding_type,
            new.withholding.rate,
        )?;

        let now = Utc::now();
        let quotation = Quotation {
            id: QuotationId::new_v7(),
            number: self
                .sequence
                .next(DocumentKind::Quotation, temporal::jakarta_year()),
            client_id: new.client_id,
            client_contact: new.client_contact,
            description: new.description,
            quote_date: new.quote_date,
            valid_until: new.valid_until,
            amounts,
            tax_profile: new.tax_profile,
            withholding: new.withholding,
            status: QuotationStatus::Draft,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };

        let id = quotation.id;
        self.quotations.insert(id, quotation.clone());
        self.order.push(id);
        Ok(quotation)
    }

    pub fn mark_sent(&mut self, id: QuotationId) -> Result<Quotation, DocumentError> {
        self.transition(id, QuotationStatus::Sent, None)
    }

    pub fn approve(&mut self, id: QuotationId) -> Result<Quotation, DocumentError> {
        self.transition(id, QuotationStatus::Approved, None)
    }

    pub fn reject(
        &mut self,
        id: QuotationId,
        reason: impl Into<String>,
    ) -> Result<Quotation, DocumentError> {
        self.transition(id, QuotationStatus::Rejected, Some(reason.into()))
    }

    /// Expires every sent quotation whose validity has lapsed
    ///
    /// Only `Sent` quotations are eligible; notification sends are soft.
    pub fn expiry_sweep(&mut self, today: NaiveDate) -> TransitionOutcome<Vec<QuotationId>> {
        let mut expired = Vec::new();
        let mut warnings = Vec::new();

        for id in &self.order {
            let quotation = match self.quotations.get_mut(id) {
                Some(q) => q,
                None => continue,
            };
            if quotation.status != QuotationStatus::Sent || quotation.valid_until >= today {
                continue;
            }

            quotation.status = QuotationStatus::Expired;
            quotation.updated_at = Utc::now();
            expired.push(*id);
            tracing::info!(quotation = %quotation.number, "quotation expired");

            if let Err(err) = self.notifier.send(
                NotificationKind::QuotationExpired,
                &quotation.client_contact,
                json!({ "number": quotation.number, "valid_until": quotation.valid_until }),
            ) {
                tracing::warn!(quotation = %quotation.number, error = %err, "expiry notification failed");
                warnings.push(SecondaryEffectFailure::notification(&err));
            }
        }

        TransitionOutcome::with_warnings(expired, warnings)
    }

    pub fn get(&self, id: QuotationId) -> Option<&Quotation> {
        self.quotations.get(&id)
    }

    pub fn list(&self) -> Vec<&Quotation> {
        self.order
            .iter()
            .filter_map(|id| self.quotations.get(id))
            .collect()
    }

    fn transition(
        &mut self,
        id: QuotationId,
        target: QuotationStatus,
        reason: Option<String>,
    ) -> Result<Quotation, DocumentError> {
        let quotation = self
            .quotations
            .get_mut(&id)
            .ok_or_else(|| DocumentError::not_found(format!("quotation {id}")))?;
        quotation.guard_transition(target)?;
        quotation.status = target;
        if let Some(reason) = reason {
            quotation.rejection_reason = Some(reason);
        }
        quotation.updated_at = Utc::now();
        Ok(quotation.clone())
    }
}

impl Default for QuotationService {
    fn default() -> Self {
        Self::new()
    }
}
