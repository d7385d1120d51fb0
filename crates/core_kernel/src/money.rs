//! Money type with precise decimal arithmetic
//!
//! This module provides a fixed-point representation of Indonesian rupiah
//! amounts using rust_decimal. The rupiah has no minor subunit in practice,
//! but all arithmetic keeps two decimal places internally so that percentage
//! calculations (PPN, PPh) round consistently instead of compounding error.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Neg, Sub};
use thiserror::Error;

/// Tolerance used when comparing two amounts for reconciliation.
///
/// Two amounts within 0.01 rupiah of each other are considered equal.
pub const TOLERANCE: Decimal = dec!(0.01);

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,
}

/// A monetary amount in Indonesian rupiah
///
/// Amounts are stored with two decimal places, rounded half-up at
/// construction. Half-up (away from zero at the midpoint) matches the
/// statutory rounding used for Indonesian tax amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a new amount, rounding half-up to two decimal places
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Creates an amount from whole rupiah
    pub fn from_rupiah(rupiah: i64) -> Self {
        Self(Decimal::new(rupiah, 0))
    }

    /// The zero amount
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the underlying decimal value
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Compares two amounts within the reconciliation tolerance
    pub fn approx_eq(&self, other: &Money) -> bool {
        (self.0 - other.0).abs() < TOLERANCE
    }

    /// Multiplies by a scalar rate, rounding the result once
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.0 * factor)
    }

    /// Divides by a scalar, rounding the result once
    pub fn divide(&self, divisor: Decimal) -> Result<Self, MoneyError> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        Ok(Self::new(self.0 / divisor))
    }

    /// Validates that the amount is not negative
    pub fn require_non_negative(&self) -> Result<Self, MoneyError> {
        if self.is_negative() {
            return Err(MoneyError::InvalidAmount(format!(
                "amount must not be negative, got {}",
                self.0
            )));
        }
        Ok(*self)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rp {:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.0 - other.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_rounds_half_up() {
        assert_eq!(Money::new(dec!(10.005)).amount(), dec!(10.01));
        assert_eq!(Money::new(dec!(10.004)).amount(), dec!(10.00));
    }

    #[test]
    fn test_money_from_rupiah() {
        let m = Money::from_rupiah(1_100_000);
        assert_eq!(m.amount(), dec!(1100000));
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_rupiah(100_000);
        let b = Money::from_rupiah(50_000);

        assert_eq!((a + b).amount(), dec!(150000));
        assert_eq!((a - b).amount(), dec!(50000));
        assert_eq!((-a).amount(), dec!(-100000));
    }

    #[test]
    fn test_approx_eq_within_tolerance() {
        let a = Money::new(dec!(100.00));
        assert!(a.approx_eq(&Money::new(dec!(100.004))));
        // Exactly 0.01 apart is outside the strict tolerance.
        assert!(!a.approx_eq(&Money::new(dec!(100.01))));
    }

    #[test]
    fn test_divide_by_zero() {
        let m = Money::from_rupiah(100);
        assert_eq!(m.divide(Decimal::ZERO), Err(MoneyError::DivisionByZero));
    }

    #[test]
    fn test_require_non_negative() {
        assert!(Money::from_rupiah(-1).require_non_negative().is_err());
        assert!(Money::zero().require_non_negative().is_ok());
    }

    #[test]
    fn test_sum() {
        let total: Money = vec![
            Money::from_rupiah(1000),
            Money::from_rupiah(2000),
            Money::from_rupiah(3000),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, Money::from_rupiah(6000));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn money_addition_is_associative(
            a in -1_000_000_000i64..1_000_000_000i64,
            b in -1_000_000_000i64..1_000_000_000i64,
            c in -1_000_000_000i64..1_000_000_000i64
        ) {
            let ma = Money::from_rupiah(a);
            let mb = Money::from_rupiah(b);
            let mc = Money::from_rupiah(c);

            prop_assert_eq!((ma + mb) + mc, ma + (mb + mc));
        }

        #[test]
        fn money_sub_then_add_round_trips(
            a in -1_000_000_000i64..1_000_000_000i64,
            b in -1_000_000_000i64..1_000_000_000i64
        ) {
            let ma = Money::from_rupiah(a);
            let mb = Money::from_rupiah(b);

            prop_assert_eq!((ma - mb) + mb, ma);
        }

        #[test]
        fn money_always_two_decimal_places(raw in -1_000_000_000i64..1_000_000_000i64) {
            let m = Money::new(Decimal::new(raw, 4));
            prop_assert!(m.amount().scale() <= 2);
        }
    }
}
