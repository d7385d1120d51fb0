//! Transition outcomes with structured secondary-effect warnings
//!
//! A document transition has one primary effect (the status change) and up
//! to two secondary effects (journal posting, notification). The primary
//! effect is authoritative: when a secondary effect fails, the transition
//! still commits and the failure is logged and reported here as a warning,
//! never as an error. Documents left without a journal reference this way
//! are picked up by the unposted-document metrics for manual remediation.

use core_kernel::NotifyError;
use domain_ledger::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which secondary effect failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryEffect {
    JournalPosting,
    Notification,
}

impl fmt::Display for SecondaryEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecondaryEffect::JournalPosting => write!(f, "journal posting"),
            SecondaryEffect::Notification => write!(f, "notification"),
        }
    }
}

/// A secondary effect that failed during an otherwise-successful transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryEffectFailure {
    pub effect: SecondaryEffect,
    pub message: String,
}

impl SecondaryEffectFailure {
    pub fn journal(err: &LedgerError) -> Self {
        Self {
            effect: SecondaryEffect::JournalPosting,
            message: err.to_string(),
        }
    }

    pub fn notification(err: &NotifyError) -> Self {
        Self {
            effect: SecondaryEffect::Notification,
            message: err.to_string(),
        }
    }
}

/// The result of a document transition
///
/// The document is always delivered; `warnings` lists any secondary effects
/// that failed along the way.
#[derive(Debug, Clone)]
pub struct TransitionOutcome<T> {
    pub document: T,
    pub warnings: Vec<SecondaryEffectFailure>,
}

impl<T> TransitionOutcome<T> {
    pub fn clean(document: T) -> Self {
        Self {
            document,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(document: T, warnings: Vec<SecondaryEffectFailure>) -> Self {
        Self { document, warnings }
    }

    /// True when every secondary effect succeeded
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_outcome() {
        let outcome = TransitionOutcome::clean(42);
        assert!(outcome.is_clean());
        assert_eq!(outcome.document, 42);
    }

    #[test]
    fn test_warnings_preserved() {
        let outcome = TransitionOutcome::with_warnings(
            1,
            vec![SecondaryEffectFailure {
                effect: SecondaryEffect::JournalPosting,
                message: "ledger unavailable".to_string(),
            }],
        );
        assert!(!outcome.is_clean());
        assert_eq!(outcome.warnings[0].effect, SecondaryEffect::JournalPosting);
    }
}
