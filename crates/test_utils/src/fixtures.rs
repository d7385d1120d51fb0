//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common entities across the accounting core.
//! These fixtures are designed to be consistent and predictable for unit
//! tests; anything random belongs in `generators`.

use chrono::NaiveDate;
use core_kernel::{ClientId, InvoiceId, Money, ProjectId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A round consulting-fee gross amount
    pub fn gross_10m() -> Money {
        Money::from_rupiah(10_000_000)
    }

    /// PPN on [`Self::gross_10m`] at the effective 11% rate
    pub fn ppn_on_10m() -> Money {
        Money::from_rupiah(1_100_000)
    }

    /// A gross amount below the materai threshold
    pub fn gross_small() -> Money {
        Money::from_rupiah(1_500_000)
    }

    /// A luxury-goods gross amount
    pub fn gross_luxury() -> Money {
        Money::from_rupiah(5_000_000)
    }

    pub fn zero() -> Money {
        Money::zero()
    }

    /// Negative amount for validation failure paths
    pub fn negative() -> Money {
        Money::new(dec!(-50000.00))
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard fiscal period start (Jan 1, 2026)
    pub fn period_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
    }

    /// Standard document date (Mar 15, 2026)
    pub fn document_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    /// Due date 30 days after [`Self::document_date`]
    pub fn due_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 14).unwrap()
    }

    /// A date safely past [`Self::due_date`]
    pub fn after_due() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
    }

    /// The fiscal year the fixed dates fall in
    pub fn fiscal_year() -> i32 {
        2026
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Creates a deterministic client ID for testing
    pub fn client_id() -> ClientId {
        ClientId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    /// Creates a deterministic project ID for testing
    pub fn project_id() -> ProjectId {
        ProjectId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }

    /// Creates a deterministic invoice ID for testing
    pub fn invoice_id() -> InvoiceId {
        InvoiceId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap())
    }
}

/// Fixture for decimal test data
pub struct DecimalFixtures;

impl DecimalFixtures {
    /// Effective standard PPN rate
    pub fn ppn_effective() -> Decimal {
        dec!(0.11)
    }

    /// Statutory luxury PPN rate
    pub fn ppn_luxury() -> Decimal {
        dec!(0.12)
    }

    /// PPh 23 services withholding rate
    pub fn pph23_services() -> Decimal {
        dec!(0.02)
    }

    /// PPh 4(2) rental withholding rate
    pub fn pph42_rental() -> Decimal {
        dec!(0.10)
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// A well-formed NSFP serial with a 2026 issue year
    pub fn nsfp_serial() -> &'static str {
        "010.000-26.00000001"
    }

    /// An NSFP serial with the wrong shape
    pub fn nsfp_malformed() -> &'static str {
        "10.000-26.00000001"
    }

    /// A well-formed NPWP
    pub fn npwp() -> &'static str {
        "01.234.567.8-901.234"
    }

    /// Standard operating-expense account code
    pub fn expense_account() -> &'static str {
        "6-1000"
    }

    /// Test client contact address
    pub fn client_contact() -> &'static str {
        "finance@client.co.id"
    }

    /// Test actor user names
    pub fn owner() -> &'static str {
        "budi"
    }

    pub fn approver() -> &'static str {
        "siti"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporal_fixtures_ordering() {
        assert!(TemporalFixtures::period_start() < TemporalFixtures::document_date());
        assert!(TemporalFixtures::document_date() < TemporalFixtures::due_date());
        assert!(TemporalFixtures::due_date() < TemporalFixtures::after_due());
    }

    #[test]
    fn test_id_fixtures_are_deterministic() {
        assert_eq!(IdFixtures::client_id(), IdFixtures::client_id());
    }

    #[test]
    fn test_ppn_fixture_matches_rate() {
        let expected = MoneyFixtures::gross_10m().multiply(DecimalFixtures::ppn_effective());
        assert_eq!(expected, MoneyFixtures::ppn_on_10m());
    }
}
