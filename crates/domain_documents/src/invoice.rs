//! Invoice lifecycle
//!
//! States: `Draft -> Sent -> Paid`, with `Sent -> Overdue -> Paid` when the
//! due date lapses first, and cancellation available from every non-terminal
//! state. Issuing posts revenue recognition (Dr accounts receivable /
//! Cr service revenue); payment clears the receivable against cash.
//!
//! Invoices whose total exceeds the stamp-duty threshold are flagged as
//! requiring materai (Indonesian duty stamp); the flag is recomputed
//! whenever the total changes.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{
    temporal, ClientId, DocumentKind, InvoiceId, JournalEntryId, Money, NotificationKind,
    Notifier, NullNotifier, ProjectId, QuotationId, SequenceCounter,
};
use domain_ledger::{codes, JournalEngine, PostingEvent};
use domain_tax::{DocumentAmounts, TaxProfile, WithholdingProfile};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::DocumentError;
use crate::expense::Actor;
use crate::outcome::{SecondaryEffectFailure, TransitionOutcome};
use crate::quotation::{Quotation, QuotationStatus};

/// Invoice totals above this amount require a duty stamp
pub const MATERAI_THRESHOLD_RUPIAH: i64 = 5_000_000;

/// The materai threshold as a monetary amount
pub fn materai_threshold() -> Money {
    Money::from_rupiah(MATERAI_THRESHOLD_RUPIAH)
}

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Overdue,
    Paid,
    Cancelled,
}

impl InvoiceStatus {
    /// The legal forward transitions
    pub fn allowed_next(&self) -> &'static [InvoiceStatus] {
        match self {
            InvoiceStatus::Draft => &[InvoiceStatus::Sent, InvoiceStatus::Cancelled],
            InvoiceStatus::Sent => &[
                InvoiceStatus::Paid,
                InvoiceStatus::Overdue,
                InvoiceStatus::Cancelled,
            ],
            InvoiceStatus::Overdue => &[InvoiceStatus::Paid, InvoiceStatus::Cancelled],
            InvoiceStatus::Paid | InvoiceStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(&self, target: InvoiceStatus) -> bool {
        self.allowed_next().contains(&target)
    }

    pub fn name(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "DRAFT",
            InvoiceStatus::Sent => "SENT",
            InvoiceStatus::Overdue => "OVERDUE",
            InvoiceStatus::Paid => "PAID",
            InvoiceStatus::Cancelled => "CANCELLED",
        }
    }
}

/// An invoice document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    /// Human-readable number, `INV-YYYY-NNNNN`
    pub number: String,
    pub client_id: ClientId,
    /// Contact the client receives notifications at
    pub client_contact: String,
    pub project_id: Option<ProjectId>,
    pub description: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub amounts: DocumentAmounts,
    pub tax_profile: Option<TaxProfile>,
    pub withholding: WithholdingProfile,
    /// True when the total exceeds the stamp-duty threshold
    pub materai_required: bool,
    /// Set by [`InvoiceService::apply_materai`]
    pub materai_applied: bool,
    /// Quotation this invoice was converted from, if any
    pub quotation_id: Option<QuotationId>,
    pub status: InvoiceStatus,
    /// Revenue-recognition entry posted at issuance
    pub journal_entry_id: Option<JournalEntryId>,
    /// Receivable-clearing entry posted at payment
    pub payment_journal_id: Option<JournalEntryId>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    fn guard_transition(&self, requested: InvoiceStatus) -> Result<(), DocumentError> {
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

/// Input for creating an invoice
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub client_id: ClientId,
    pub client_contact: String,
    pub project_id: Option<ProjectId>,
    pub description: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub gross: Money,
    pub tax_profile: Option<TaxProfile>,
    pub withholding: WithholdingProfile,
}

/// Fields that may be corrected on a draft invoice
#[derive(Debug, Clone, Default)]
pub struct UpdateInvoice {
    pub description: Option<String>,
    pub gross: Option<Money>,
    pub due_date: Option<NaiveDate>,
}

/// Invoice lifecycle service
///
/// Journal postings and notifications are soft effects reported as warnings
/// on the returned [`TransitionOutcome`], never as errors.
pub struct InvoiceService {
    invoices: HashMap<InvoiceId, Invoice>,
    order: Vec<InvoiceId>,
    sequence: SequenceCounter,
    clients: HashSet<ClientId>,
    /// Conversion links; makes quotation conversion idempotent
    quotation_links: HashMap<QuotationId, InvoiceId>,
    notifier: Arc<dyn Notifier>,
}

impl InvoiceService {
    pub fn new() -> Self {
        Self::with_notifier(Arc::new(NullNotifier))
    }

    pub fn with_notifier(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            invoices: HashMap::new(),
            order: Vec::new(),
            sequence: SequenceCounter::new(),
            clients: HashSet::new(),
            quotation_links: HashMap::new(),
            notifier,
        }
    }

    pub fn register_client(&mut self, id: ClientId) {
        self.clients.insert(id);
    }

    /// Creates an invoice in `Draft`
    pub fn create(&mut self, new: NewInvoice) -> Result<Invoice, DocumentError> {
        if !self.clients.contains(&new.client_id) {
            return Err(DocumentError::not_found(format!("client {}", new.client_id)));
        }
        if new.due_date < new.issue_date {
            return Err(DocumentError::validation("due date precedes the issue date"));
        }

        let profile = new.tax_profile.unwrap_or_else(TaxProfile::exempt);
        let amounts = DocumentAmounts::derive(
            new.gross,
            &profile,
            new.withholding.withholding_type,
            new.withholding.rate,
        )?;

        let invoice = self.store_new(
            new.client_id,
            new.client_contact,
            new.project_id,
            new.description,
            new.issue_date,
            new.due_date,
            amounts,
            new.tax_profile,
            new.withholding,
            None,
        );
        Ok(invoice)
    }

    /// Converts an approved quotation into an invoice
    ///
    /// Idempotent: converting the same quotation again returns the invoice
    /// already created for it, without creating a duplicate.
    pub fn create_from_quotation(
        &mut self,
        quotation: &Quotation,
        due_date: NaiveDate,
    ) -> Result<Invoice, DocumentError> {
        if let Some(existing_id) = self.quotation_links.get(&quotation.id) {
            if let Some(existing) = self.invoices.get(existing_id) {
                tracing::info!(
                    quotation = %quotation.number,
                    invoice = %existing.number,
                    "quotation already converted"
                );
                return Ok(existing.clone());
            }
        }

        if quotation.status != QuotationStatus::Approved {
            return Err(DocumentError::validation(format!(
                "only approved quotations can be invoiced, {} is {}",
                quotation.number,
                quotation.status.name()
            )));
        }
        if !self.clients.contains(&quotation.client_id) {
            return Err(DocumentError::not_found(format!(
                "client {}",
                quotation.client_id
            )));
        }

        let issue_date = temporal::jakarta_today();
        if due_date < issue_date {
            return Err(DocumentError::validation("due date precedes the issue date"));
        }

        let invoice = self.store_new(
            quotation.client_id,
            quotation.client_contact.clone(),
            None,
            quotation.description.clone(),
            issue_date,
            due_date,
            quotation.amounts,
            quotation.tax_profile,
            quotation.withholding,
            Some(quotation.id),
        );
        self.quotation_links.insert(quotation.id, invoice.id);
        Ok(invoice)
    }

    /// Sends a draft invoice and posts revenue recognition
    pub fn mark_sent(
        &mut self,
        id: InvoiceId,
        actor: &Actor,
        journal: &mut JournalEngine,
    ) -> Result<TransitionOutcome<Invoice>, DocumentError> {
        let invoice = self.get_mut(id)?;
        invoice.guard_transition(InvoiceStatus::Sent)?;
        invoice.status = InvoiceStatus::Sent;
        invoice.updated_at = Utc::now();

        let mut warnings = Vec::new();
        match journal.post_document_entry(
            PostingEvent::InvoiceIssued,
            *invoice.id.as_uuid(),
            &invoice.number,
            codes::SERVICE_REVENUE,
            invoice.amounts.total,
            invoice.issue_date,
            &actor.id,
        ) {
            Ok(entry_id) => invoice.journal_entry_id = Some(entry_id),
            Err(err) => {
                tracing::warn!(invoice = %invoice.number, error = %err, "issuance journal posting failed");
                warnings.push(SecondaryEffectFailure::journal(&err));
            }
        }

        Ok(TransitionOutcome::with_warnings(invoice.clone(), warnings))
    }

    /// Marks an invoice paid and posts the receivable-clearing entry
    pub fn mark_paid(
        &mut self,
        id: InvoiceId,
        actor: &Actor,
        journal: &mut JournalEngine,
    ) -> Result<TransitionOutcome<Invoice>, DocumentError> {
        let invoice = self.get_mut(id)?;
        invoice.guard_transition(InvoiceStatus::Paid)?;
        invoice.status = InvoiceStatus::Paid;
        invoice.updated_at = Utc::now();

        let mut warnings = Vec::new();
        match journal.post_document_entry(
            PostingEvent::InvoicePaid,
            *invoice.id.as_uuid(),
            &invoice.number,
            codes::CASH,
            invoice.amounts.total,
            temporal::jakarta_today(),
            &actor.id,
        ) {
            Ok(entry_id) => invoice.payment_journal_id = Some(entry_id),
            Err(err) => {
                tracing::warn!(invoice = %invoice.number, error = %err, "payment journal posting failed");
                warnings.push(SecondaryEffectFailure::journal(&err));
            }
        }

        Ok(TransitionOutcome::with_warnings(invoice.clone(), warnings))
    }

    /// Cancels an invoice; reverses the issuance entry when one was posted
    pub fn cancel(
        &mut self,
        id: InvoiceId,
        actor: &Actor,
        reason: impl Into<String>,
        journal: &mut JournalEngine,
    ) -> Result<TransitionOutcome<Invoice>, DocumentError> {
        let invoice = self.get_mut(id)?;
        invoice.guard_transition(InvoiceStatus::Cancelled)?;
        invoice.status = InvoiceStatus::Cancelled;
        invoice.cancellation_reason = Some(reason.into());
        invoice.updated_at = Utc::now();

        let mut warnings = Vec::new();
        if let Some(entry_id) = invoice.journal_entry_id {
            if let Err(err) = journal.reverse_entry(entry_id, "invoice cancelled", &actor.id) {
                tracing::warn!(invoice = %invoice.number, error = %err, "issuance reversal failed");
                warnings.push(SecondaryEffectFailure::journal(&err));
            }
        }

        Ok(TransitionOutcome::with_warnings(invoice.clone(), warnings))
    }

    /// Corrects a draft invoice in place
    ///
    /// An amount change re-derives the tax breakdown and recomputes the
    /// materai requirement; a stamp applied to an invoice that drops back
    /// below the threshold is cleared along with the flag. Invoices that
    /// have been sent are immutable.
    pub fn update(
        &mut self,
        id: InvoiceId,
        changes: UpdateInvoice,
    ) -> Result<Invoice, DocumentError> {
        // Validate everything before touching stored state.
        let new_amounts = {
            let invoice = self.get_ref(id)?;
            if invoice.status != InvoiceStatus::Draft {
                return Err(DocumentError::validation(format!(
                    "only draft invoices may be edited, {} is {}",
                    invoice.number,
                    invoice.status.name()
                )));
            }
            if let Some(due) = changes.due_date {
                if due < invoice.issue_date {
                    return Err(DocumentError::validation("due date precedes the issue date"));
                }
            }
            match changes.gross {
                Some(gross) => {
                    let profile = invoice.tax_profile.unwrap_or_else(TaxProfile::exempt);
                    Some(DocumentAmounts::derive(
                        gross,
                        &profile,
                        invoice.withholding.withholding_type,
                        invoice.withholding.rate,
                    )?)
                }
                None => None,
            }
        };

        let invoice = self.get_mut(id)?;
        if let Some(description) = changes.description {
            invoice.description = description;
        }
        if let Some(due) = changes.due_date {
            invoice.due_date = due;
        }
        if let Some(amounts) = new_amounts {
            invoice.amounts = amounts;
            invoice.materai_required = amounts.total > materai_threshold();
            if !invoice.materai_required {
                invoice.materai_applied = false;
            }
        }
        invoice.updated_at = Utc::now();
        Ok(invoice.clone())
    }

    /// Records that the duty stamp has been affixed
    ///
    /// # Errors
    ///
    /// `MateraiNotRequired` when the invoice total is below the threshold.
    pub fn apply_materai(&mut self, id: InvoiceId) -> Result<Invoice, DocumentError> {
        let invoice = self.get_mut(id)?;
        if !invoice.materai_required {
            return Err(DocumentError::MateraiNotRequired(invoice.amounts.total));
        }
        invoice.materai_applied = true;
        invoice.updated_at = Utc::now();
        Ok(invoice.clone())
    }

    /// Flags every sent invoice past its due date as overdue
    ///
    /// Only `Sent` invoices are flagged; paid, cancelled, and draft
    /// invoices are never touched. Invoices flagged by an earlier sweep
    /// get a payment reminder instead. Notification sends are soft.
    pub fn overdue_sweep(&mut self, today: NaiveDate) -> TransitionOutcome<Vec<InvoiceId>> {
        let mut flagged = Vec::new();
        let mut warnings = Vec::new();

        for id in &self.order {
            let invoice = match self.invoices.get_mut(id) {
                Some(i) => i,
                None => continue,
            };
            if invoice.status == InvoiceStatus::Overdue {
                if let Err(err) = self.notifier.send(
                    NotificationKind::PaymentReminder,
                    &invoice.client_contact,
                    json!({
                        "number": invoice.number,
                        "total": invoice.amounts.total,
                        "due_date": invoice.due_date,
                    }),
                ) {
                    tracing::warn!(invoice = %invoice.number, error = %err, "payment reminder failed");
                    warnings.push(SecondaryEffectFailure::notification(&err));
                }
                continue;
            }
            if invoice.status != InvoiceStatus::Sent || invoice.due_date >= today {
                continue;
            }

            invoice.status = InvoiceStatus::Overdue;
            invoice.updated_at = Utc::now();
            flagged.push(*id);
            tracing::info!(invoice = %invoice.number, due = %invoice.due_date, "invoice overdue");

            if let Err(err) = self.notifier.send(
                NotificationKind::InvoiceOverdue,
                &invoice.client_contact,
                json!({
                    "number": invoice.number,
                    "total": invoice.amounts.total,
                    "due_date": invoice.due_date,
                }),
            ) {
                tracing::warn!(invoice = %invoice.number, error = %err, "overdue notification failed");
                warnings.push(SecondaryEffectFailure::notification(&err));
            }
        }

        TransitionOutcome::with_warnings(flagged, warnings)
    }

    /// Applies the payment-coverage verdict from reconciliation
    ///
    /// When confirmed payments cover the total and the invoice can legally
    /// move to `Paid`, it is marked paid. A coverage drop below the total
    /// never moves a paid invoice backwards; the discrepancy is logged for
    /// manual review instead.
    pub fn recompute_status(
        &mut self,
        id: InvoiceId,
        confirmed_sum: Money,
        actor: &Actor,
        journal: &mut JournalEngine,
    ) -> Result<TransitionOutcome<Invoice>, DocumentError> {
        let (total, status, number) = {
            let invoice = self.get_ref(id)?;
            (invoice.amounts.total, invoice.status, invoice.number.clone())
        };

        let covered = confirmed_sum.approx_eq(&total) || confirmed_sum > total;
        if covered && status.can_transition_to(InvoiceStatus::Paid) {
            return self.mark_paid(id, actor, journal);
        }
        if !covered && status == InvoiceStatus::Paid {
            tracing::warn!(
                invoice = %number,
                confirmed = %confirmed_sum,
                total = %total,
                "confirmed payments no longer cover a paid invoice; manual review needed"
            );
        }

        Ok(TransitionOutcome::clean(self.get_ref(id)?.clone()))
    }

    pub fn get(&self, id: InvoiceId) -> Option<&Invoice> {
        self.invoices.get(&id)
    }

    pub fn list(&self) -> Vec<&Invoice> {
        self.order
            .iter()
            .filter_map(|id| self.invoices.get(id))
            .collect()
    }

    /// Invoices whose status implies a journal reference that is missing
    pub fn unposted_invoices(&self) -> Vec<InvoiceId> {
        self.order
            .iter()
            .filter_map(|id| self.invoices.get(id))
            .filter(|i| match i.status {
                InvoiceStatus::Paid => {
                    i.journal_entry_id.is_none() || i.payment_journal_id.is_none()
                }
                InvoiceStatus::Sent | InvoiceStatus::Overdue => i.journal_entry_id.is_none(),
                _ => false,
            })
            .map(|i| i.id)
            .collect()
    }

    fn get_mut(&mut self, id: InvoiceId) -> Result<&mut Invoice, DocumentError> {
        self.invoices
            .get_mut(&id)
            .ok_or_else(|| DocumentError::not_found(format!("invoice {id}")))
    }

    fn get_ref(&self, id: InvoiceId) -> Result<&Invoice, DocumentError> {
        self.invoices
            .get(&id)
            .ok_or_else(|| DocumentError::not_found(format!("invoice {id}")))
    }

    #[allow(clippy::too_many_arguments)]
    fn store_new(
        &mut self,
        client_id: ClientId,
        client_contact: String,
        project_id: Option<ProjectId>,
        description: String,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        amounts: DocumentAmounts,
        tax_profile: Option<TaxProfile>,
        withholding: WithholdingProfile,
        quotation_id: Option<QuotationId>,
    ) -> Invoice {
        let now = Utc::now();
        let invoice = Invoice {
            id: InvoiceId::new_v7(),
            number: self
                .sequence
                .next(DocumentKind::Invoice, temporal::jakarta_year()),
            client_id,
            client_contact,
            project_id,
            description,
            issue_date,
            due_date,
            amounts,
            tax_profile,
            withholding,
            materai_required: amounts.total > materai_threshold(),
            materai_applied: false,
            quotation_id,
            status: InvoiceStatus::Draft,
            journal_entry_id: None,
            payment_journal_id: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };

        let id = invoice.id;
        self.invoices.insert(id, invoice.clone());
        self.order.push(id);
        invoice
    }
}

impl Default for InvoiceService {
    fn default() -> Self {
        Self::new()
    }
}
