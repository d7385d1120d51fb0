//! Tax Domain - Indonesian statutory tax rules
//!
//! This crate holds the pure tax logic the document lifecycles re-validate
//! against before any ledger posting:
//!
//! - **PPN** value-added tax: 12% statutory rate, effective 11% on
//!   non-luxury goods via the 11/12 DPP base adjustment
//! - **PPh** withholding: per-category statutory rate tables
//!   (Pasal 23, 4(2), 15)
//! - **e-Faktur** evidence validation: NSFP serial format, NPWP format,
//!   and the compliance-status decision table
//!
//! Everything here is side-effect free.

pub mod calculator;
pub mod efaktur;
pub mod error;
pub mod withholding;

pub use calculator::{
    compute_net_payment, compute_tax, compute_total_with_tax, extract_gross_from_total,
    validate_document_amounts, validate_tax_calculation, DocumentAmounts, TaxCategory, TaxProfile,
    LUXURY_RATE, STANDARD_EFFECTIVE_RATE,
};
pub use efaktur::{EfakturStatus, NsfpSerial};
pub use error::TaxError;
pub use withholding::{compute_withholding, WithholdingProfile, WithholdingType};
