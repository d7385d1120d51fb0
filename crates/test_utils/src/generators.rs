//! Property-Based Test Generators
//!
//! Proptest strategies for generating random test data that maintains
//! domain invariants.

use core_kernel::{ClientId, InvoiceId, Money};
use domain_tax::{TaxProfile, WithholdingType};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for positive rupiah amounts (whole rupiah, up to 1 billion)
pub fn positive_rupiah_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for positive Money values
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    positive_rupiah_strategy().prop_map(Money::from_rupiah)
}

/// Strategy for Money values including zero
pub fn non_negative_money_strategy() -> impl Strategy<Value = Money> {
    (0i64..1_000_000_000i64).prop_map(Money::from_rupiah)
}

/// Strategy for fractional Money values with two decimal places
pub fn fractional_money_strategy() -> impl Strategy<Value = Money> {
    (1i64..100_000_000_000i64).prop_map(|cents| Money::new(Decimal::new(cents, 2)))
}

/// Strategy for the supported tax profiles
pub fn tax_profile_strategy() -> impl Strategy<Value = TaxProfile> {
    prop_oneof![
        Just(TaxProfile::standard()),
        Just(TaxProfile::luxury()),
        Just(TaxProfile::exempt()),
    ]
}

/// Strategy for withholding categories
pub fn withholding_type_strategy() -> impl Strategy<Value = WithholdingType> {
    prop_oneof![
        Just(WithholdingType::None),
        Just(WithholdingType::Services),
        Just(WithholdingType::Rental),
        Just(WithholdingType::Interest),
        Just(WithholdingType::Royalty),
        Just(WithholdingType::Construction),
        Just(WithholdingType::Aviation),
        Just(WithholdingType::Shipping),
    ]
}

/// Strategy for well-formed NSFP serials with an issue year near 2026
pub fn nsfp_serial_strategy() -> impl Strategy<Value = String> {
    (0u32..1000u32, 0u32..1000u32, 24u32..=27u32, 1u32..100_000_000u32).prop_map(
        |(doc, region, year, seq)| format!("{doc:03}.{region:03}-{year:02}.{seq:08}"),
    )
}

/// Strategy for well-formed account codes
pub fn account_code_strategy() -> impl Strategy<Value = String> {
    (1u32..=6u32, 0u32..10000u32).prop_map(|(class, num)| format!("{class}-{num:04}"))
}

/// Strategy for generating ClientId
pub fn client_id_strategy() -> impl Strategy<Value = ClientId> {
    any::<[u8; 16]>().prop_map(|bytes| ClientId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for generating InvoiceId
pub fn invoice_id_strategy() -> impl Strategy<Value = InvoiceId> {
    any::<[u8; 16]>().prop_map(|bytes| InvoiceId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_tax::efaktur;

    proptest! {
        #[test]
        fn positive_money_is_always_positive(money in positive_money_strategy()) {
            prop_assert!(money.is_positive());
        }

        #[test]
        fn generated_nsfp_serials_parse(serial in nsfp_serial_strategy()) {
            prop_assert!(efaktur::parse(&serial).is_some());
        }

        #[test]
        fn generated_account_codes_are_valid(code in account_code_strategy()) {
            prop_assert!(domain_ledger::accounts::is_valid_code_format(&code));
        }
    }
}
