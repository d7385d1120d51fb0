//! PPh withholding tax
//!
//! Income-tax withholding on outgoing payments. Each category maps to a
//! statutory article and default rate; documents may override the rate when
//! the counterparty holds a different assessment (e.g. no NPWP surcharge).

use core_kernel::Money;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::TaxError;

/// Withholding categories and their statutory articles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithholdingType {
    /// No withholding applies
    None,
    /// Technical, management, and other services (PPh 23)
    Services,
    /// Land and building rental (PPh 4(2) final)
    Rental,
    /// Interest payments (PPh 23)
    Interest,
    /// Royalty payments (PPh 23)
    Royalty,
    /// Construction services (PPh 4(2) final)
    Construction,
    /// Domestic air charter (PPh 15)
    Aviation,
    /// Domestic shipping (PPh 15)
    Shipping,
}

impl WithholdingType {
    /// Statutory default rate for this category
    pub fn default_rate(&self) -> Decimal {
        match self {
            WithholdingType::None => Decimal::ZERO,
            WithholdingType::Services => dec!(0.02),
            WithholdingType::Rental => dec!(0.10),
            WithholdingType::Interest => dec!(0.15),
            WithholdingType::Royalty => dec!(0.15),
            WithholdingType::Construction => dec!(0.0265),
            WithholdingType::Aviation => dec!(0.018),
            WithholdingType::Shipping => dec!(0.012),
        }
    }

    /// The tax article this category is withheld under
    pub fn article(&self) -> &'static str {
        match self {
            WithholdingType::None => "-",
            WithholdingType::Services | WithholdingType::Interest | WithholdingType::Royalty => {
                "PPh 23"
            }
            WithholdingType::Rental | WithholdingType::Construction => "PPh 4(2)",
            WithholdingType::Aviation | WithholdingType::Shipping => "PPh 15",
        }
    }
}

/// The withholding treatment of a taxable document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingProfile {
    pub withholding_type: WithholdingType,
    /// Overrides the statutory default when set
    pub rate: Option<Decimal>,
}

impl WithholdingProfile {
    pub fn new(withholding_type: WithholdingType) -> Self {
        Self {
            withholding_type,
            rate: None,
        }
    }

    pub fn with_rate(withholding_type: WithholdingType, rate: Decimal) -> Self {
        Self {
            withholding_type,
            rate: Some(rate),
        }
    }

    /// The rate actually withheld
    pub fn effective_rate(&self) -> Decimal {
        self.rate.unwrap_or_else(|| self.withholding_type.default_rate())
    }
}

/// Computes the withheld amount for a gross payment
///
/// `WithholdingType::None` always yields zero regardless of any override.
pub fn compute_withholding(
    gross: Money,
    withholding_type: WithholdingType,
    rate_override: Option<Decimal>,
) -> Result<Money, TaxError> {
    let gross = gross.require_non_negative()?;
    if withholding_type == WithholdingType::None {
        return Ok(Money::zero());
    }
    let rate = rate_override.unwrap_or_else(|| withholding_type.default_rate());
    if rate.is_sign_negative() {
        return Err(TaxError::InvalidAmount(format!(
            "withholding rate must not be negative, got {rate}"
        )));
    }
    Ok(gross.multiply(rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rates() {
        assert_eq!(WithholdingType::Services.default_rate(), dec!(0.02));
        assert_eq!(WithholdingType::Rental.default_rate(), dec!(0.10));
        assert_eq!(WithholdingType::Interest.default_rate(), dec!(0.15));
        assert_eq!(WithholdingType::Royalty.default_rate(), dec!(0.15));
        assert_eq!(WithholdingType::Construction.default_rate(), dec!(0.0265));
        assert_eq!(WithholdingType::Aviation.default_rate(), dec!(0.018));
        assert_eq!(WithholdingType::Shipping.default_rate(), dec!(0.012));
    }

    #[test]
    fn test_services_withholding() {
        let amount =
            compute_withholding(Money::from_rupiah(10_000_000), WithholdingType::Services, None)
                .unwrap();
        assert_eq!(amount, Money::from_rupiah(200_000));
    }

    #[test]
    fn test_none_short_circuits_even_with_override() {
        let amount = compute_withholding(
            Money::from_rupiah(10_000_000),
            WithholdingType::None,
            Some(dec!(0.5)),
        )
        .unwrap();
        assert!(amount.is_zero());
    }

    #[test]
    fn test_rate_override() {
        // Counterparty without NPWP: doubled PPh 23 rate
        let amount = compute_withholding(
            Money::from_rupiah(10_000_000),
            WithholdingType::Services,
            Some(dec!(0.04)),
        )
        .unwrap();
        assert_eq!(amount, Money::from_rupiah(400_000));
    }

    #[test]
    fn test_negative_gross_rejected() {
        let result =
            compute_withholding(Money::from_rupiah(-100), WithholdingType::Services, None);
        assert!(matches!(result, Err(TaxError::InvalidAmount(_))));
    }

    #[test]
    fn test_articles() {
        assert_eq!(WithholdingType::Services.article(), "PPh 23");
        assert_eq!(WithholdingType::Rental.article(), "PPh 4(2)");
        assert_eq!(WithholdingType::Shipping.article(), "PPh 15");
    }

    #[test]
    fn test_profile_effective_rate() {
        let profile = WithholdingProfile::new(WithholdingType::Royalty);
        assert_eq!(profile.effective_rate(), dec!(0.15));

        let overridden = WithholdingProfile::with_rate(WithholdingType::Royalty, dec!(0.30));
        assert_eq!(overridden.effective_rate(), dec!(0.30));
    }
}
