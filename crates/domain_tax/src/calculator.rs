//! PPN (value-added tax) calculation
//!
//! Indonesian VAT carries a 12% statutory rate. Non-luxury goods apply the
//! statutory rate to an 11/12 taxable base (DPP), which works out to an
//! effective 11% on the gross amount; luxury goods pay the full 12%. The
//! dual-rate design is a domain invariant, not a simplification.
//!
//! All functions here are pure: they take amounts in, return amounts out,
//! and round exactly once at the end of each computation.

use core_kernel::Money;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::TaxError;
use crate::withholding::WithholdingType;

/// Statutory PPN rate applied to luxury goods
pub const LUXURY_RATE: Decimal = dec!(0.12);

/// Effective PPN rate for non-luxury goods (12% on an 11/12 DPP base)
pub const STANDARD_EFFECTIVE_RATE: Decimal = dec!(0.11);

/// Creditability of input tax for this purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxCategory {
    /// Input tax can be credited against output tax
    Creditable,
    /// Input tax is a cost, not creditable
    NonCreditable,
    /// Transaction is exempt from PPN
    Exempt,
}

/// The PPN treatment of a taxable document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxProfile {
    /// Nominal rate recorded on the document (e.g. 0.11 or 0.12)
    pub rate: Decimal,
    pub category: TaxCategory,
    pub is_luxury: bool,
}

impl TaxProfile {
    /// Standard non-luxury creditable profile (effective 11%)
    pub fn standard() -> Self {
        Self {
            rate: STANDARD_EFFECTIVE_RATE,
            category: TaxCategory::Creditable,
            is_luxury: false,
        }
    }

    /// Luxury-goods profile (full statutory 12%)
    pub fn luxury() -> Self {
        Self {
            rate: LUXURY_RATE,
            category: TaxCategory::Creditable,
            is_luxury: true,
        }
    }

    /// Exempt profile, computes zero tax
    pub fn exempt() -> Self {
        Self {
            rate: Decimal::ZERO,
            category: TaxCategory::Exempt,
            is_luxury: false,
        }
    }

    /// The rate actually applied to the gross amount
    pub fn effective_rate(&self) -> Decimal {
        match (self.category, self.is_luxury) {
            (TaxCategory::Exempt, _) => Decimal::ZERO,
            (_, true) => LUXURY_RATE,
            (_, false) => STANDARD_EFFECTIVE_RATE,
        }
    }
}

/// Computes the PPN amount for a gross amount
///
/// Rounding is half-up to two decimal places, applied once at the end.
pub fn compute_tax(gross: Money, profile: &TaxProfile) -> Result<Money, TaxError> {
    let gross = gross.require_non_negative()?;
    Ok(gross.multiply(profile.effective_rate()))
}

/// Computes gross plus PPN
pub fn compute_total_with_tax(gross: Money, profile: &TaxProfile) -> Result<Money, TaxError> {
    let tax = compute_tax(gross, profile)?;
    Ok(gross + tax)
}

/// Recovers the gross amount from a tax-inclusive total
///
/// Inverse of [`compute_total_with_tax`] up to the 0.01 rounding tolerance.
pub fn extract_gross_from_total(total: Money, profile: &TaxProfile) -> Result<Money, TaxError> {
    let total = total.require_non_negative()?;
    let divisor = Decimal::ONE + profile.effective_rate();
    Ok(total
        .divide(divisor)
        .map_err(|e| TaxError::InvalidAmount(e.to_string()))?)
}

/// Returns true when the claimed tax matches the recomputed tax within tolerance
pub fn validate_tax_calculation(gross: Money, claimed_tax: Money, profile: &TaxProfile) -> bool {
    match compute_tax(gross, profile) {
        Ok(expected) => expected.approx_eq(&claimed_tax),
        Err(_) => false,
    }
}

/// Computes the net amount actually paid out: gross + PPN - withholding
pub fn compute_net_payment(gross: Money, tax: Money, withholding: Money) -> Result<Money, TaxError> {
    gross.require_non_negative()?;
    tax.require_non_negative()?;
    withholding.require_non_negative()?;
    Ok(gross + tax - withholding)
}

/// The stored monetary fields of a taxable document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentAmounts {
    pub gross: Money,
    pub tax: Money,
    pub withholding: Money,
    pub total: Money,
    pub net: Money,
}

impl DocumentAmounts {
    /// Builds a consistent amount set from gross, profile, and withholding
    pub fn derive(
        gross: Money,
        profile: &TaxProfile,
        withholding_type: WithholdingType,
        rate_override: Option<Decimal>,
    ) -> Result<Self, TaxError> {
        let tax = compute_tax(gross, profile)?;
        let withholding =
            crate::withholding::compute_withholding(gross, withholding_type, rate_override)?;
        let total = gross + tax;
        let net = compute_net_payment(gross, tax, withholding)?;
        Ok(Self {
            gross,
            tax,
            withholding,
            total,
            net,
        })
    }
}

/// Validates that the stored amounts of a document reconcile
///
/// Enforced identities, each within the 0.01 tolerance:
/// - `total == gross + tax`
/// - `net == total - withholding`
/// - `tax == gross x effective_rate` when a profile is supplied
/// - `withholding == gross x rate` when a withholding type applies
pub fn validate_document_amounts(
    amounts: &DocumentAmounts,
    profile: Option<&TaxProfile>,
    withholding: Option<(WithholdingType, Option<Decimal>)>,
) -> Result<(), TaxError> {
    amounts.gross.require_non_negative()?;

    let expected_total = amounts.gross + amounts.tax;
    if !expected_total.approx_eq(&amounts.total) {
        return Err(TaxError::AmountMismatch {
            field: "total",
            expected: expected_total,
            actual: amounts.total,
        });
    }

    let expected_net = amounts.total - amounts.withholding;
    if !expected_net.approx_eq(&amounts.net) {
        return Err(TaxError::AmountMismatch {
            field: "net",
            expected: expected_net,
            actual: amounts.net,
        });
    }

    if let Some(profile) = profile {
        let expected_tax = compute_tax(amounts.gross, profile)?;
        if !expected_tax.approx_eq(&amounts.tax) {
            return Err(TaxError::AmountMismatch {
                field: "tax",
                expected: expected_tax,
                actual: amounts.tax,
            });
        }
    }

    if let Some((withholding_type, rate_override)) = withholding {
        let expected =
            crate::withholding::compute_withholding(amounts.gross, withholding_type, rate_override)?;
        if !expected.approx_eq(&amounts.withholding) {
            return Err(TaxError::AmountMismatch {
                field: "withholding",
                expected,
                actual: amounts.withholding,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_rate_ten_million() {
        let gross = Money::from_rupiah(10_000_000);
        let tax = compute_tax(gross, &TaxProfile::standard()).unwrap();
        assert_eq!(tax, Money::from_rupiah(1_100_000));

        let total = compute_total_with_tax(gross, &TaxProfile::standard()).unwrap();
        assert_eq!(total, Money::from_rupiah(11_100_000));
    }

    #[test]
    fn test_luxury_rate_five_million() {
        let gross = Money::from_rupiah(5_000_000);
        let tax = compute_tax(gross, &TaxProfile::luxury()).unwrap();
        assert_eq!(tax, Money::from_rupiah(600_000));

        let total = compute_total_with_tax(gross, &TaxProfile::luxury()).unwrap();
        assert_eq!(total, Money::from_rupiah(5_600_000));
    }

    #[test]
    fn test_exempt_profile_computes_zero() {
        let gross = Money::from_rupiah(10_000_000);
        let tax = compute_tax(gross, &TaxProfile::exempt()).unwrap();
        assert!(tax.is_zero());
    }

    #[test]
    fn test_negative_gross_rejected() {
        let result = compute_tax(Money::from_rupiah(-1), &TaxProfile::standard());
        assert!(matches!(result, Err(TaxError::InvalidAmount(_))));
    }

    #[test]
    fn test_extract_gross_inverts_total() {
        let gross = Money::from_rupiah(10_000_000);
        let total = compute_total_with_tax(gross, &TaxProfile::standard()).unwrap();
        let recovered = extract_gross_from_total(total, &TaxProfile::standard()).unwrap();
        assert!(recovered.approx_eq(&gross));
    }

    #[test]
    fn test_validate_tax_calculation() {
        let gross = Money::from_rupiah(10_000_000);
        assert!(validate_tax_calculation(
            gross,
            Money::from_rupiah(1_100_000),
            &TaxProfile::standard()
        ));
        assert!(!validate_tax_calculation(
            gross,
            Money::from_rupiah(1_200_000),
            &TaxProfile::standard()
        ));
    }

    #[test]
    fn test_validate_document_amounts_accepts_derived() {
        let amounts = DocumentAmounts::derive(
            Money::from_rupiah(10_000_000),
            &TaxProfile::standard(),
            WithholdingType::Services,
            None,
        )
        .unwrap();

        validate_document_amounts(
            &amounts,
            Some(&TaxProfile::standard()),
            Some((WithholdingType::Services, None)),
        )
        .unwrap();
    }

    #[test]
    fn test_validate_document_amounts_rejects_bad_total() {
        let mut amounts = DocumentAmounts::derive(
            Money::from_rupiah(10_000_000),
            &TaxProfile::standard(),
            WithholdingType::None,
            None,
        )
        .unwrap();
        amounts.total = Money::from_rupiah(11_000_000);

        let result = validate_document_amounts(&amounts, Some(&TaxProfile::standard()), None);
        assert!(matches!(
            result,
            Err(TaxError::AmountMismatch { field: "total", .. })
        ));
    }

    #[test]
    fn test_net_payment_with_withholding() {
        let net = compute_net_payment(
            Money::from_rupiah(10_000_000),
            Money::from_rupiah(1_100_000),
            Money::from_rupiah(200_000),
        )
        .unwrap();
        assert_eq!(net, Money::from_rupiah(10_900_000));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// extract_gross_from_total(compute_total_with_tax(g)) == g within tolerance
        #[test]
        fn tax_round_trip(gross_rupiah in 0i64..10_000_000_000i64) {
            for profile in [TaxProfile::standard(), TaxProfile::luxury(), TaxProfile::exempt()] {
                let gross = Money::from_rupiah(gross_rupiah);
                let total = compute_total_with_tax(gross, &profile).unwrap();
                let recovered = extract_gross_from_total(total, &profile).unwrap();
                prop_assert!(recovered.approx_eq(&gross),
                    "profile {:?}: gross {} recovered {}", profile, gross, recovered);
            }
        }

        #[test]
        fn derived_amounts_always_reconcile(gross_rupiah in 0i64..10_000_000_000i64) {
            let amounts = DocumentAmounts::derive(
                Money::from_rupiah(gross_rupiah),
                &TaxProfile::standard(),
                WithholdingType::Services,
                None,
            ).unwrap();

            prop_assert!(validate_document_amounts(
                &amounts,
                Some(&TaxProfile::standard()),
                Some((WithholdingType::Services, None)),
            ).is_ok());
        }
    }
}
