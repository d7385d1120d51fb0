//! e-Faktur document validation
//!
//! Validates the structured tax identifiers that must accompany a document
//! before it may post: the NSFP tax-invoice serial number and the NPWP
//! taxpayer ID. Validation here is purely local format and business-rule
//! checking; confirmation against the DJP authority is an external concern,
//! which is why `Valid` is never self-assigned.

use chrono::{Datelike, NaiveDate};
use core_kernel::{temporal, Money};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// NSFP serial: document-type code, regional code, 2-digit year, 8-digit sequence
static NSFP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{3})\.(\d{3})-(\d{2})\.(\d{8})$").expect("valid NSFP pattern"));

/// NPWP taxpayer ID: fixed 15-digit grouping
static NPWP_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}\.\d{3}\.\d{3}\.\d-\d{3}\.\d{3}$").expect("valid NPWP pattern"));

/// Months after issuance before a tax invoice serial is considered stale
pub const DEFAULT_EXPIRY_MONTHS: i32 = 3;

/// Below this gross amount a tax invoice is not mandatory
pub const EFAKTUR_MINIMUM_GROSS: i64 = 250_000;

/// Account codes whose spending never requires a tax invoice
/// (payroll-like and non-cash expense categories)
pub const EXEMPT_ACCOUNT_CODES: [&str; 2] = ["6-2000", "6-3000"];

/// Compliance status of a document's e-Faktur evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EfakturStatus {
    /// No tax identifiers supplied and none required
    NotRequired,
    /// Serial supplied, proof of validity still missing
    Pending,
    /// Serial and proof supplied, awaiting authority confirmation
    Uploaded,
    /// Serial fails format validation
    Invalid,
    /// Issue date beyond the validity window
    Expired,
}

/// Parsed fields of an NSFP serial number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NsfpSerial {
    /// Three-digit document-type code
    pub document_code: String,
    /// Three-digit regional code
    pub region_code: String,
    /// Four-digit year expanded from the two-digit serial field
    pub year: i32,
    /// Eight-digit sequence number
    pub sequence: u32,
}

/// Parses an NSFP serial into its structured fields
///
/// Returns `None` on any format failure; never panics or errors.
pub fn parse(serial: &str) -> Option<NsfpSerial> {
    let captures = NSFP_PATTERN.captures(serial)?;
    let year_2digit: i32 = captures[3].parse().ok()?;
    Some(NsfpSerial {
        document_code: captures[1].to_string(),
        region_code: captures[2].to_string(),
        year: 2000 + year_2digit,
        sequence: captures[4].parse().ok()?,
    })
}

/// Validates the serial format against the current Jakarta calendar year
pub fn validate_format(serial: &str) -> bool {
    validate_format_at(serial, temporal::jakarta_year())
}

/// Validates format plus the year window [current - 2, current + 1]
pub fn validate_format_at(serial: &str, current_year: i32) -> bool {
    match parse(serial) {
        Some(parsed) => {
            parsed.year >= current_year - 2 && parsed.year <= current_year + 1
        }
        None => false,
    }
}

/// Returns true when the issue date is older than the default threshold
pub fn is_expired(issue_date: NaiveDate, today: NaiveDate) -> bool {
    is_expired_with_threshold(issue_date, today, DEFAULT_EXPIRY_MONTHS)
}

/// Returns true when the issue date is older than `threshold_months`
pub fn is_expired_with_threshold(
    issue_date: NaiveDate,
    today: NaiveDate,
    threshold_months: i32,
) -> bool {
    temporal::months_between(issue_date, today) >= threshold_months
}

/// Determines the compliance status from the supplied evidence
///
/// Fixed decision table:
/// - nothing supplied            -> NotRequired
/// - malformed serial            -> Invalid
/// - issue date past threshold   -> Expired
/// - serial without proof        -> Pending
/// - serial and proof present    -> Uploaded
pub fn determine_status(
    serial: Option<&str>,
    proof_of_validity: Option<&str>,
    issue_date: Option<NaiveDate>,
    today: NaiveDate,
) -> EfakturStatus {
    if serial.is_none() && proof_of_validity.is_none() {
        return EfakturStatus::NotRequired;
    }
    if let Some(serial) = serial {
        if !validate_format_at(serial, today.year()) {
            return EfakturStatus::Invalid;
        }
    }
    if let Some(issued) = issue_date {
        if is_expired(issued, today) {
            return EfakturStatus::Expired;
        }
    }
    if serial.is_none() || proof_of_validity.is_none() {
        return EfakturStatus::Pending;
    }
    EfakturStatus::Uploaded
}

/// Whether a tax invoice is required for this spend
///
/// False for exempt account codes and for amounts below the statutory
/// minimum; true otherwise.
pub fn is_required(gross: Money, account_code: &str) -> bool {
    if EXEMPT_ACCOUNT_CODES.contains(&account_code) {
        return false;
    }
    gross >= Money::from_rupiah(EFAKTUR_MINIMUM_GROSS)
}

/// Validates the NPWP taxpayer-ID format
pub fn validate_npwp(npwp: &str) -> bool {
    NPWP_PATTERN.is_match(npwp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
    }

    #[test]
    fn test_parse_valid_serial() {
        let parsed = parse("010.002-26.00000123").unwrap();
        assert_eq!(parsed.document_code, "010");
        assert_eq!(parsed.region_code, "002");
        assert_eq!(parsed.year, 2026);
        assert_eq!(parsed.sequence, 123);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse("010-002.26.00000123").is_none());
        assert!(parse("010.002-26.123").is_none());
        assert!(parse("").is_none());
        assert!(parse("abc.def-gh.ijklmnop").is_none());
    }

    #[test]
    fn test_year_window() {
        assert!(validate_format_at("010.002-26.00000123", 2026));
        assert!(validate_format_at("010.002-24.00000123", 2026));
        assert!(validate_format_at("010.002-27.00000123", 2026));
        // Too old and too far ahead
        assert!(!validate_format_at("010.002-23.00000123", 2026));
        assert!(!validate_format_at("010.002-28.00000123", 2026));
    }

    #[test]
    fn test_is_expired() {
        let issued = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        assert!(is_expired(issued, today()));

        let recent = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        assert!(!is_expired(recent, today()));
    }

    #[test]
    fn test_status_not_required() {
        assert_eq!(
            determine_status(None, None, None, today()),
            EfakturStatus::NotRequired
        );
    }

    #[test]
    fn test_status_pending_without_proof() {
        assert_eq!(
            determine_status(Some("010.002-26.00000123"), None, None, today()),
            EfakturStatus::Pending
        );
    }

    #[test]
    fn test_status_invalid_beats_pending() {
        assert_eq!(
            determine_status(Some("garbage"), None, None, today()),
            EfakturStatus::Invalid
        );
    }

    #[test]
    fn test_status_expired() {
        let issued = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        assert_eq!(
            determine_status(
                Some("010.002-26.00000123"),
                Some("proof.pdf"),
                Some(issued),
                today()
            ),
            EfakturStatus::Expired
        );
    }

    #[test]
    fn test_status_uploaded_never_valid() {
        let issued = NaiveDate::from_ymd_opt(2026, 7, 15).unwrap();
        assert_eq!(
            determine_status(
                Some("010.002-26.00000123"),
                Some("proof.pdf"),
                Some(issued),
                today()
            ),
            EfakturStatus::Uploaded
        );
    }

    #[test]
    fn test_is_required_thresholds() {
        assert!(is_required(Money::from_rupiah(1_000_000), "6-1000"));
        assert!(!is_required(Money::from_rupiah(100_000), "6-1000"));
        // Payroll and depreciation are exempt regardless of amount
        assert!(!is_required(Money::from_rupiah(50_000_000), "6-2000"));
        assert!(!is_required(Money::from_rupiah(50_000_000), "6-3000"));
    }

    #[test]
    fn test_npwp_format() {
        assert!(validate_npwp("01.234.567.8-901.000"));
        assert!(!validate_npwp("01.234.567.8-901"));
        assert!(!validate_npwp("0123456789010000"));
    }
}
