//! Expense lifecycle
//!
//! States: `Draft -> Submitted -> Approved -> Paid`, with
//! `Submitted -> Rejected` as the alternative terminal branch. There are no
//! backward transitions; drafts may be deleted, everything else may only be
//! corrected in place or progressed forward.
//!
//! Note on creation: a newly created expense is immediately marked `Paid`
//! and a settlement journal entry is posted synchronously, bypassing the
//! formal submit/approve flow. This policy applies uniformly to all new
//! expenses and is preserved deliberately; the full approval workflow
//! remains available for expenses opened through [`ExpenseService::create_draft`].
//! Flagged for product clarification, do not "fix" silently.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{
    temporal, ClientId, DocumentKind, ExpenseId, JournalEntryId, Money, NotificationKind,
    Notifier, NullNotifier, ProjectId, SequenceCounter,
};
use domain_ledger::{JournalEngine, PostingEvent};
use domain_tax::{
    calculator, efaktur, DocumentAmounts, EfakturStatus, TaxProfile, WithholdingProfile,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::DocumentError;
use crate::outcome::{SecondaryEffectFailure, TransitionOutcome};

/// The caller identity supplied by the auth layer, trusted as-is
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: String,
    pub is_admin: bool,
}

impl Actor {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_admin: false,
        }
    }

    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_admin: true,
        }
    }
}

/// How a document was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    BankTransfer,
    Cash,
    Check,
    DigitalWallet,
}

/// Payment metadata recorded when an expense is settled
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub paid_date: NaiveDate,
}

/// Expense status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpenseStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
    Paid,
}

impl ExpenseStatus {
    /// The legal forward transitions
    pub fn allowed_next(&self) -> &'static [ExpenseStatus] {
        match self {
            ExpenseStatus::Draft => &[ExpenseStatus::Submitted],
            ExpenseStatus::Submitted => &[ExpenseStatus::Approved, ExpenseStatus::Rejected],
            ExpenseStatus::Approved => &[ExpenseStatus::Paid],
            ExpenseStatus::Rejected | ExpenseStatus::Paid => &[],
        }
    }

    pub fn can_transition_to(&self, target: ExpenseStatus) -> bool {
        self.allowed_next().contains(&target)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExpenseStatus::Draft => "DRAFT",
            ExpenseStatus::Submitted => "SUBMITTED",
            ExpenseStatus::Approved => "APPROVED",
            ExpenseStatus::Rejected => "REJECTED",
            ExpenseStatus::Paid => "PAID",
        }
    }
}

/// Immutable record of a status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub actor: String,
    pub at: DateTime<Utc>,
    pub from: ExpenseStatus,
    pub to: ExpenseStatus,
    pub comments: Option<String>,
}

/// An expense document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    /// Human-readable number, `EXP-YYYY-NNNNN`
    pub number: String,
    pub description: String,
    pub expense_date: NaiveDate,
    /// Expense category account in the chart of accounts
    pub account_code: String,
    pub client_id: Option<ClientId>,
    pub project_id: Option<ProjectId>,
    /// User who owns the expense
    pub owner: String,
    pub amounts: DocumentAmounts,
    pub tax_profile: Option<TaxProfile>,
    pub withholding: WithholdingProfile,
    pub efaktur_serial: Option<String>,
    pub efaktur_proof: Option<String>,
    pub efaktur_issue_date: Option<NaiveDate>,
    pub efaktur_status: EfakturStatus,
    pub status: ExpenseStatus,
    /// Entry created at approval; weak reference, the ledger owns the entry
    pub journal_entry_id: Option<JournalEntryId>,
    /// Entry created at payment/settlement
    pub payment_journal_id: Option<JournalEntryId>,
    pub approval_history: Vec<ApprovalRecord>,
    pub payment: Option<PaymentDetails>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    fn record_transition(&mut self, actor: &Actor, to: ExpenseStatus, comments: Option<String>) {
        self.approval_history.push(ApprovalRecord {
            actor: actor.id.clone(),
            at: Utc::now(),
            from: self.status,
            to,
            comments,
        });
        self.status = to;
        self.updated_at = Utc::now();
    }

    fn guard_transition(&self, requested: ExpenseStatus) -> Result<(), DocumentError> {
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

/// Input for creating an expense
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub description: String,
    pub expense_date: NaiveDate,
    pub account_code: String,
    pub client_id: Option<ClientId>,
    pub project_id: Option<ProjectId>,
    pub owner: String,
    pub gross: Money,
    /// Claimed PPN amount, re-validated against the profile when supplied
    pub claimed_tax: Option<Money>,
    pub tax_profile: Option<TaxProfile>,
    pub withholding: WithholdingProfile,
    pub efaktur_serial: Option<String>,
    pub efaktur_proof: Option<String>,
    pub efaktur_issue_date: Option<NaiveDate>,
    pub payment_method: PaymentMethod,
    pub payment_reference: Option<String>,
}

/// Fields that may be corrected in place
#[derive(Debug, Clone, Default)]
pub struct UpdateExpense {
    pub description: Option<String>,
    pub gross: Option<Money>,
    pub efaktur_serial: Option<String>,
    pub efaktur_proof: Option<String>,
    pub efaktur_issue_date: Option<NaiveDate>,
}

/// Expense lifecycle service
///
/// Owns expense documents and drives their state machine. Journal postings
/// and notifications are secondary effects: failures are logged, reported
/// as warnings, and never abort the primary status change.
pub struct ExpenseService {
    expenses: HashMap<ExpenseId, Expense>,
    order: Vec<ExpenseId>,
    sequence: SequenceCounter,
    clients: HashSet<ClientId>,
    projects: HashSet<ProjectId>,
    notifier: Arc<dyn Notifier>,
}

impl ExpenseService {
    pub fn new() -> Self {
        Self::with_notifier(Arc::new(NullNotifier))
    }

    pub fn with_notifier(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            expenses: HashMap::new(),
            order: Vec::new(),
            sequence: SequenceCounter::new(),
            clients: HashSet::new(),
            projects: HashSet::new(),
            notifier,
        }
    }

    /// Registers a client the expenses may reference
    pub fn register_client(&mut self, id: ClientId) {
        self.clients.insert(id);
    }

    /// Registers a project the expenses may reference
    pub fn register_project(&mut self, id: ProjectId) {
        self.projects.insert(id);
    }

    /// Creates an expense under the immediate-pay policy
    ///
    /// The document is validated, numbered, marked `Paid`, and a settlement
    /// entry (Dr expense category / Cr cash) is posted synchronously. The
    /// journal posting and the settlement notification are soft effects.
    pub fn create(
        &mut self,
        new: NewExpense,
        journal: &mut JournalEngine,
        actor: &Actor,
    ) -> Result<TransitionOutcome<Expense>, DocumentError> {
        let method = new.payment_method;
        let reference = new.payment_reference.clone();
        let mut expense = self.build_validated(new, journal)?;
        let mut warnings = Vec::new();

        expense.payment = Some(PaymentDetails {
            method,
            reference,
            paid_date: expense.expense_date,
        });
        expense.record_transition(actor, ExpenseStatus::Paid, Some("settled on creation".into()));

        match journal.post_document_entry(
            PostingEvent::ExpenseSettled,
            *expense.id.as_uuid(),
            &expense.number,
            &expense.account_code,
            expense.amounts.total,
            expense.expense_date,
            &actor.id,
        ) {
            Ok(entry_id) => expense.payment_journal_id = Some(entry_id),
            Err(err) => {
                tracing::warn!(
                    expense = %expense.number,
                    error = %err,
                    "settlement journal posting failed; expense remains paid without ledger reference"
                );
                warnings.push(SecondaryEffectFailure::journal(&err));
            }
        }

        if let Err(err) = self.notifier.send(
            NotificationKind::ExpenseSettled,
            &expense.owner,
            json!({ "number": expense.number, "total": expense.amounts.total }),
        ) {
            tracing::warn!(expense = %expense.number, error = %err, "settlement notification failed");
            warnings.push(SecondaryEffectFailure::notification(&err));
        }

        let id = expense.id;
        self.expenses.insert(id, expense.clone());
        self.order.push(id);
        Ok(TransitionOutcome::with_warnings(expense, warnings))
    }

    /// Creates an expense in `Draft` for the formal approval workflow
    pub fn create_draft(
        &mut self,
        new: NewExpense,
        journal: &JournalEngine,
    ) -> Result<Expense, DocumentError> {
        let expense = self.build_validated(new, journal)?;
        let id = expense.id;
        self.expenses.insert(id, expense.clone());
        self.order.push(id);
        Ok(expense)
    }

    /// Submits a draft; only the owner or an admin may submit
    pub fn submit(&mut self, id: ExpenseId, actor: &Actor) -> Result<Expense, DocumentError> {
        let expense = self.get_mut(id)?;
        if actor.id != expense.owner && !actor.is_admin {
            return Err(DocumentError::validation(
                "only the owner or an admin may submit an expense",
            ));
        }
        expense.guard_transition(ExpenseStatus::Submitted)?;
        expense.record_transition(actor, ExpenseStatus::Submitted, None);
        Ok(expense.clone())
    }

    /// Approves a submitted expense and posts the approval entry
    pub fn approve(
        &mut self,
        id: ExpenseId,
        actor: &Actor,
        comments: Option<String>,
        journal: &mut JournalEngine,
    ) -> Result<TransitionOutcome<Expense>, DocumentError> {
        let expense = self.get_mut(id)?;
        expense.guard_transition(ExpenseStatus::Approved)?;
        expense.record_transition(actor, ExpenseStatus::Approved, comments);

        let mut warnings = Vec::new();
        match journal.post_document_entry(
            PostingEvent::ExpenseApproved,
            *expense.id.as_uuid(),
            &expense.number,
            &expense.account_code,
            expense.amounts.total,
            expense.expense_date,
            &actor.id,
        ) {
            Ok(entry_id) => expense.journal_entry_id = Some(entry_id),
            Err(err) => {
                tracing::warn!(expense = %expense.number, error = %err, "approval journal posting failed");
                warnings.push(SecondaryEffectFailure::journal(&err));
            }
        }

        Ok(TransitionOutcome::with_warnings(expense.clone(), warnings))
    }

    /// Rejects a submitted expense; no journal effect
    pub fn reject(
        &mut self,
        id: ExpenseId,
        actor: &Actor,
        reason: impl Into<String>,
    ) -> Result<Expense, DocumentError> {
        let expense = self.get_mut(id)?;
        expense.guard_transition(ExpenseStatus::Rejected)?;
        let reason = reason.into();
        expense.rejection_reason = Some(reason.clone());
        expense.record_transition(actor, ExpenseStatus::Rejected, Some(reason));
        Ok(expense.clone())
    }

    /// Marks an approved expense paid and posts the payment entry
    pub fn mark_paid(
        &mut self,
        id: ExpenseId,
        actor: &Actor,
        method: PaymentMethod,
        reference: Option<String>,
        journal: &mut JournalEngine,
    ) -> Result<TransitionOutcome<Expense>, DocumentError> {
        let expense = self.get_mut(id)?;
        expense.guard_transition(ExpenseStatus::Paid)?;
        expense.payment = Some(PaymentDetails {
            method,
            reference,
            paid_date: temporal::jakarta_today(),
        });
        expense.record_transition(actor, ExpenseStatus::Paid, None);

        let mut warnings = Vec::new();
        match journal.post_document_entry(
            PostingEvent::ExpensePaid,
            *expense.id.as_uuid(),
            &expense.number,
            &expense.account_code,
            expense.amounts.total,
            temporal::jakarta_today(),
            &actor.id,
        ) {
            Ok(entry_id) => expense.payment_journal_id = Some(entry_id),
            Err(err) => {
                tracing::warn!(expense = %expense.number, error = %err, "payment journal posting failed");
                warnings.push(SecondaryEffectFailure::journal(&err));
            }
        }

        Ok(TransitionOutcome::with_warnings(expense.clone(), warnings))
    }

    /// Corrects an expense in place at any status
    ///
    /// When monetary fields change after a payment journal exists, the old
    /// entries are reversed and fresh entries posted (soft effects).
    pub fn update(
        &mut self,
        id: ExpenseId,
        changes: UpdateExpense,
        actor: &Actor,
        journal: &mut JournalEngine,
    ) -> Result<TransitionOutcome<Expense>, DocumentError> {
        let mut warnings = Vec::new();

        // Validate the new amounts before touching stored state.
        let new_amounts = {
            let expense = self.get_ref(id)?;
            match changes.gross {
                Some(gross) => {
                    let profile = expense.tax_profile.unwrap_or_else(TaxProfile::exempt);
                    Some(DocumentAmounts::derive(
                        gross,
                        &profile,
                        expense.withholding.withholding_type,
                        expense.withholding.rate,
                    )?)
                }
                None => None,
            }
        };

        let expense = self.get_mut(id)?;
        if let Some(description) = changes.description {
            expense.description = description;
        }
        if let Some(serial) = changes.efaktur_serial {
            expense.efaktur_serial = Some(serial);
        }
        if let Some(proof) = changes.efaktur_proof {
            expense.efaktur_proof = Some(proof);
        }
        if let Some(issued) = changes.efaktur_issue_date {
            expense.efaktur_issue_date = Some(issued);
        }
        expense.efaktur_status = efaktur::determine_status(
            expense.efaktur_serial.as_deref(),
            expense.efaktur_proof.as_deref(),
            expense.efaktur_issue_date,
            temporal::jakarta_today(),
        );

        if let Some(amounts) = new_amounts {
            expense.amounts = amounts;

            // Monetary change with ledger entries on file: reverse and repost.
            if let Some(old_id) = expense.payment_journal_id {
                let event = if expense.journal_entry_id.is_some() {
                    PostingEvent::ExpensePaid
                } else {
                    PostingEvent::ExpenseSettled
                };
                expense.payment_journal_id = Self::reverse_and_repost(
                    journal,
                    old_id,
                    event,
                    expense,
                    actor,
                    &mut warnings,
                );
            }
            if let Some(old_id) = expense.journal_entry_id {
                expense.journal_entry_id = Self::reverse_and_repost(
                    journal,
                    old_id,
                    PostingEvent::ExpenseApproved,
                    expense,
                    actor,
                    &mut warnings,
                );
            }
        }

        expense.updated_at = Utc::now();
        Ok(TransitionOutcome::with_warnings(expense.clone(), warnings))
    }

    /// Deletes an expense; only permitted from `Draft`
    pub fn remove(&mut self, id: ExpenseId) -> Result<(), DocumentError> {
        let expense = self.get_ref(id)?;
        if expense.status != ExpenseStatus::Draft {
            return Err(DocumentError::validation(format!(
                "only draft expenses may be deleted, {} is {}",
                expense.number,
                expense.status.name()
            )));
        }
        self.expenses.remove(&id);
        self.order.retain(|e| *e != id);
        Ok(())
    }

    pub fn get(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.get(&id)
    }

    /// All expenses in creation order
    pub fn list(&self) -> Vec<&Expense> {
        self.order
            .iter()
            .filter_map(|id| self.expenses.get(id))
            .collect()
    }

    /// Expenses whose status implies a journal reference that is missing
    ///
    /// These are the documents whose secondary ledger effect failed and
    /// needs manual remediation; exposed as an operational metric.
    pub fn unposted_expenses(&self) -> Vec<ExpenseId> {
        self.order
            .iter()
            .filter_map(|id| self.expenses.get(id))
            .filter(|e| match e.status {
                ExpenseStatus::Paid => e.payment_journal_id.is_none(),
                ExpenseStatus::Approved => e.journal_entry_id.is_none(),
                _ => false,
            })
            .map(|e| e.id)
            .collect()
    }

    fn get_mut(&mut self, id: ExpenseId) -> Result<&mut Expense, DocumentError> {
        self.expenses
            .get_mut(&id)
            .ok_or_else(|| DocumentError::not_found(format!("expense {id}")))
    }

    fn get_ref(&self, id: ExpenseId) -> Result<&Expense, DocumentError> {
        self.expenses
            .get(&id)
            .ok_or_else(|| DocumentError::not_found(format!("expense {id}")))
    }

    /// Validates references, amounts, and tax identifiers; assigns a number
    fn build_validated(
        &mut self,
        new: NewExpense,
        journal: &JournalEngine,
    ) -> Result<Expense, DocumentError> {
        if !journal.chart().is_postable(&new.account_code) {
            return Err(DocumentError::not_found(format!(
                "expense account {}",
                new.account_code
            )));
        }
        if let Some(client_id) = new.client_id {
            if !self.clients.contains(&client_id) {
                return Err(DocumentError::not_found(format!("client {client_id}")));
            }
        }
        if let Some(project_id) = new.project_id {
            if !self.projects.contains(&project_id) {
                return Err(DocumentError::not_found(format!("project {project_id}")));
            }
        }

        let profile = new.tax_profile.unwrap_or_else(TaxProfile::exempt);
        let amounts = DocumentAmounts::derive(
            new.gross,
            &profile,
            new.withholding.withholding_type,
            new.withholding.rate,
        )?;

        if let Some(claimed) = new.claimed_tax {
            if !calculator::validate_tax_calculation(new.gross, claimed, &profile) {
                return Err(DocumentError::validation(format!(
                    "claimed PPN {claimed} does not reconcile with gross {}",
                    new.gross
                )));
            }
            // A claimed PPN amount must carry well-formed e-Faktur data.
            if let Some(serial) = new.efaktur_serial.as_deref() {
                if !efaktur::validate_format(serial) {
                    return Err(DocumentError::validation(format!(
                        "malformed e-Faktur serial: {serial}"
                    )));
                }
            }
        }

        let efaktur_status = efaktur::determine_status(
            new.efaktur_serial.as_deref(),
            new.efaktur_proof.as_deref(),
            new.efaktur_issue_date,
            temporal::jakarta_today(),
        );

        let now = Utc::now();
        Ok(Expense {
            id: ExpenseId::new_v7(),
            number: self
                .sequence
                .next(DocumentKind::Expense, temporal::jakarta_year()),
            description: new.description,
            expense_date: new.expense_date,
            account_code: new.account_code,
            client_id: new.client_id,
            project_id: new.project_id,
            owner: new.owner,
            amounts,
            tax_profile: new.tax_profile,
            withholding: new.withholding,
            efaktur_serial: new.efaktur_serial,
            efaktur_proof: new.efaktur_proof,
            efaktur_issue_date: new.efaktur_issue_date,
            efaktur_status,
            status: ExpenseStatus::Draft,
            journal_entry_id: None,
            payment_journal_id: None,
            approval_history: Vec::new(),
            payment: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn reverse_and_repost(
        journal: &mut JournalEngine,
        old_id: JournalEntryId,
        event: PostingEvent,
        expense: &Expense,
        actor: &Actor,
        warnings: &mut Vec<SecondaryEffectFailure>,
    ) -> Option<JournalEntryId> {
        if let Err(err) = journal.reverse_entry(old_id, "monetary correction", &actor.id) {
            tracing::warn!(expense = %expense.number, error = %err, "reversal failed");
            warnings.push(SecondaryEffectFailure::journal(&err));
            return Some(old_id);
        }
        match journal.post_document_entry(
            event,
            *expense.id.as_uuid(),
            &expense.number,
            &expense.account_code,
            expense.amounts.total,
            expense.expense_date,
            &actor.id,
        ) {
            Ok(new_id) => Some(new_id),
            Err(err) => {
                tracing::warn!(expense = %expense.number, error = %err, "repost after reversal failed");
                warnings.push(SecondaryEffectFailure::journal(&err));
                None
            }
        }
    }
}

impl Default for ExpenseService {
    fn default() -> Self {
        Self::new()
    }
}
