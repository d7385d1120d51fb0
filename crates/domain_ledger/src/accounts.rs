//! Chart of accounts
//!
//! The fixed catalogue of account codes journal line items post against.
//! Codes follow the Indonesian `N-NNNN` convention: a leading class digit
//! (1 assets, 2 liabilities, 3 equity, 4 revenue, 6 expenses) and a
//! four-digit account number.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Types of accounts in the chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// Asset accounts (debit normal balance)
    Asset,
    /// Liability accounts (credit normal balance)
    Liability,
    /// Equity accounts (credit normal balance)
    Equity,
    /// Revenue accounts (credit normal balance)
    Revenue,
    /// Expense accounts (debit normal balance)
    Expense,
}

impl AccountType {
    /// Returns true if this account type has a debit normal balance
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }
}

/// Well-known account codes used by the posting rules
pub mod codes {
    pub const CASH: &str = "1-1000";
    pub const ACCOUNTS_RECEIVABLE: &str = "1-1200";
    pub const INVENTORY: &str = "1-1300";
    pub const PPN_INPUT: &str = "1-1400";
    pub const ACCOUNTS_PAYABLE: &str = "2-1100";
    pub const PPN_OUTPUT: &str = "2-1200";
    pub const PPH_PAYABLE: &str = "2-1300";
    pub const OWNER_EQUITY: &str = "3-1000";
    pub const SERVICE_REVENUE: &str = "4-1000";
    pub const OPERATING_EXPENSE: &str = "6-1000";
    pub const RENT_EXPENSE: &str = "6-1100";
    pub const PAYROLL_EXPENSE: &str = "6-2000";
    pub const DEPRECIATION_EXPENSE: &str = "6-3000";
}

/// An account in the chart of accounts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Account code in `N-NNNN` format
    pub code: String,
    /// Account name
    pub name: String,
    /// Account type
    pub account_type: AccountType,
    /// Whether account accepts new postings
    pub is_active: bool,
}

impl Account {
    pub fn new(code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            account_type,
            is_active: true,
        }
    }
}

/// Returns true when the code matches the `N-NNNN` format
pub fn is_valid_code_format(code: &str) -> bool {
    let bytes = code.as_bytes();
    bytes.len() == 6
        && bytes[0].is_ascii_digit()
        && bytes[1] == b'-'
        && bytes[2..].iter().all(|b| b.is_ascii_digit())
}

/// The chart of accounts journal entries post against
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartOfAccounts {
    accounts: HashMap<String, Account>,
}

impl ChartOfAccounts {
    /// Creates an empty chart
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the standard chart for the business-administration platform
    pub fn standard() -> Self {
        let mut chart = Self::new();
        for account in [
            Account::new(codes::CASH, "Kas", AccountType::Asset),
            Account::new(codes::ACCOUNTS_RECEIVABLE, "Piutang Usaha", AccountType::Asset),
            Account::new(codes::INVENTORY, "Persediaan", AccountType::Asset),
            Account::new(codes::PPN_INPUT, "PPN Masukan", AccountType::Asset),
            Account::new(codes::ACCOUNTS_PAYABLE, "Utang Usaha", AccountType::Liability),
            Account::new(codes::PPN_OUTPUT, "PPN Keluaran", AccountType::Liability),
            Account::new(codes::PPH_PAYABLE, "Utang PPh", AccountType::Liability),
            Account::new(codes::OWNER_EQUITY, "Modal", AccountType::Equity),
            Account::new(codes::SERVICE_REVENUE, "Pendapatan Jasa", AccountType::Revenue),
            Account::new(codes::OPERATING_EXPENSE, "Beban Operasional", AccountType::Expense),
            Account::new(codes::RENT_EXPENSE, "Beban Sewa", AccountType::Expense),
            Account::new(codes::PAYROLL_EXPENSE, "Beban Gaji", AccountType::Expense),
            Account::new(codes::DEPRECIATION_EXPENSE, "Beban Penyusutan", AccountType::Expense),
        ] {
            chart
                .add(account)
                .expect("standard chart codes are well-formed and unique");
        }
        chart
    }

    /// Adds an account, rejecting malformed or duplicate codes
    pub fn add(&mut self, account: Account) -> Result<(), String> {
        if !is_valid_code_format(&account.code) {
            return Err(format!("malformed account code: {}", account.code));
        }
        if self.accounts.contains_key(&account.code) {
            return Err(format!("duplicate account code: {}", account.code));
        }
        self.accounts.insert(account.code.clone(), account);
        Ok(())
    }

    /// Gets an account by code
    pub fn get(&self, code: &str) -> Option<&Account> {
        self.accounts.get(code)
    }

    /// Returns true when the code exists and is active
    pub fn is_postable(&self, code: &str) -> bool {
        self.accounts.get(code).is_some_and(|a| a.is_active)
    }

    /// Number of accounts in the chart
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_format() {
        assert!(is_valid_code_format("1-1000"));
        assert!(is_valid_code_format("6-2000"));
        assert!(!is_valid_code_format("11000"));
        assert!(!is_valid_code_format("1-100"));
        assert!(!is_valid_code_format("1-10000"));
        assert!(!is_valid_code_format("x-1000"));
    }

    #[test]
    fn test_standard_chart_is_postable() {
        let chart = ChartOfAccounts::standard();
        assert!(chart.is_postable(codes::CASH));
        assert!(chart.is_postable(codes::ACCOUNTS_PAYABLE));
        assert!(!chart.is_postable("9-9999"));
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let mut chart = ChartOfAccounts::standard();
        let result = chart.add(Account::new(codes::CASH, "Kas 2", AccountType::Asset));
        assert!(result.is_err());
    }

    #[test]
    fn test_debit_normal_balance() {
        assert!(AccountType::Asset.is_debit_normal());
        assert!(AccountType::Expense.is_debit_normal());
        assert!(!AccountType::Liability.is_debit_normal());
        assert!(!AccountType::Revenue.is_debit_normal());
    }
}
