//! Test Data Builders
//!
//! Builder patterns for constructing document inputs with sensible
//! defaults. Tests specify only the fields they care about.

use chrono::NaiveDate;
use core_kernel::{ClientId, Money, ProjectId};
use domain_documents::{NewExpense, NewInvoice, NewPayment, NewPurchaseOrder, NewQuotation, PaymentMethod};
use domain_tax::{TaxProfile, WithholdingProfile, WithholdingType};
use fake::faker::company::en::CompanyName;
use fake::Fake;

use crate::fixtures::{IdFixtures, MoneyFixtures, StringFixtures, TemporalFixtures};

/// Builder for [`NewExpense`] inputs
pub struct NewExpenseBuilder {
    inner: NewExpense,
}

impl Default for NewExpenseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewExpenseBuilder {
    pub fn new() -> Self {
        Self {
            inner: NewExpense {
                description: "Office supplies".to_string(),
                expense_date: TemporalFixtures::document_date(),
                account_code: StringFixtures::expense_account().to_string(),
                client_id: None,
                project_id: None,
                owner: StringFixtures::owner().to_string(),
                gross: MoneyFixtures::gross_small(),
                claimed_tax: None,
                tax_profile: None,
                withholding: WithholdingProfile::new(WithholdingType::None),
                efaktur_serial: None,
                efaktur_proof: None,
                efaktur_issue_date: None,
                payment_method: PaymentMethod::BankTransfer,
                payment_reference: None,
            },
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.inner.description = description.into();
        self
    }

    pub fn with_account_code(mut self, code: impl Into<String>) -> Self {
        self.inner.account_code = code.into();
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.inner.owner = owner.into();
        self
    }

    pub fn with_gross(mut self, gross: Money) -> Self {
        self.inner.gross = gross;
        self
    }

    pub fn with_claimed_tax(mut self, tax: Money) -> Self {
        self.inner.claimed_tax = Some(tax);
        self
    }

    pub fn with_tax_profile(mut self, profile: TaxProfile) -> Self {
        self.inner.tax_profile = Some(profile);
        self
    }

    pub fn with_withholding(mut self, withholding_type: WithholdingType) -> Self {
        self.inner.withholding = WithholdingProfile::new(withholding_type);
        self
    }

    pub fn with_client(mut self, id: ClientId) -> Self {
        self.inner.client_id = Some(id);
        self
    }

    pub fn with_project(mut self, id: ProjectId) -> Self {
        self.inner.project_id = Some(id);
        self
    }

    pub fn with_efaktur(mut self, serial: impl Into<String>, issue_date: NaiveDate) -> Self {
        self.inner.efaktur_serial = Some(serial.into());
        self.inner.efaktur_proof = Some("QR-PROOF".to_string());
        self.inner.efaktur_issue_date = Some(issue_date);
        self
    }

    pub fn build(self) -> NewExpense {
        self.inner
    }
}

/// Builder for [`NewInvoice`] inputs
pub struct NewInvoiceBuilder {
    inner: NewInvoice,
}

impl Default for NewInvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewInvoiceBuilder {
    pub fn new() -> Self {
        Self {
            inner: NewInvoice {
                client_id: IdFixtures::client_id(),
                client_contact: StringFixtures::client_contact().to_string(),
                project_id: None,
                description: "Consulting services".to_string(),
                issue_date: TemporalFixtures::document_date(),
                due_date: TemporalFixtures::due_date(),
                gross: MoneyFixtures::gross_10m(),
                tax_profile: Some(TaxProfile::standard()),
                withholding: WithholdingProfile::new(WithholdingType::None),
            },
        }
    }

    pub fn with_client(mut self, id: ClientId) -> Self {
        self.inner.client_id = id;
        self
    }

    pub fn with_gross(mut self, gross: Money) -> Self {
        self.inner.gross = gross;
        self
    }

    pub fn with_tax_profile(mut self, profile: Option<TaxProfile>) -> Self {
        self.inner.tax_profile = profile;
        self
    }

    pub fn with_withholding(mut self, withholding_type: WithholdingType) -> Self {
        self.inner.withholding = WithholdingProfile::new(withholding_type);
        self
    }

    pub fn with_dates(mut self, issue: NaiveDate, due: NaiveDate) -> Self {
        self.inner.issue_date = issue;
        self.inner.due_date = due;
        self
    }

    pub fn build(self) -> NewInvoice {
        self.inner
    }
}

/// Builder for [`NewQuotation`] inputs
pub struct NewQuotationBuilder {
    inner: NewQuotation,
}

impl Default for NewQuotationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewQuotationBuilder {
    pub fn new() -> Self {
        Self {
            inner: NewQuotation {
                client_id: IdFixtures::client_id(),
                client_contact: StringFixtures::client_contact().to_string(),
                description: "Project proposal".to_string(),
                quote_date: TemporalFixtures::document_date(),
                valid_until: TemporalFixtures::due_date(),
                gross: MoneyFixtures::gross_10m(),
                tax_profile: Some(TaxProfile::standard()),
                withholding: WithholdingProfile::new(WithholdingType::None),
            },
        }
    }

    pub fn with_client(mut self, id: ClientId) -> Self {
        self.inner.client_id = id;
        self
    }

    pub fn with_gross(mut self, gross: Money) -> Self {
        self.inner.gross = gross;
        self
    }

    pub fn with_validity(mut self, quote_date: NaiveDate, valid_until: NaiveDate) -> Self {
        self.inner.quote_date = quote_date;
        self.inner.valid_until = valid_until;
        self
    }

    pub fn build(self) -> NewQuotation {
        self.inner
    }
}

/// Builder for [`NewPurchaseOrder`] inputs
pub struct NewPurchaseOrderBuilder {
    inner: NewPurchaseOrder,
}

impl Default for NewPurchaseOrderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NewPurchaseOrderBuilder {
    pub fn new() -> Self {
        Self {
            inner: NewPurchaseOrder {
                vendor_name: CompanyName().fake(),
                description: "Office equipment".to_string(),
                order_date: TemporalFixtures::document_date(),
                expected_date: Some(TemporalFixtures::due_date()),
                gross: MoneyFixtures::gross_luxury(),
                tax_profile: Some(TaxProfile::standard()),
                withholding: WithholdingProfile::new(WithholdingType::None),
            },
        }
    }

    pub fn with_vendor(mut self, name: impl Into<String>) -> Self {
        self.inner.vendor_name = name.into();
        self
    }

    pub fn with_gross(mut self, gross: Money) -> Self {
        self.inner.gross = gross;
        self
    }

    pub fn with_tax_profile(mut self, profile: Option<TaxProfile>) -> Self {
        self.inner.tax_profile = profile;
        self
    }

    pub fn build(self) -> NewPurchaseOrder {
        self.inner
    }
}

/// Builder for [`NewPayment`] inputs
pub struct NewPaymentBuilder {
    inner: NewPayment,
}

impl NewPaymentBuilder {
    /// Payments need a real invoice id; there is no sensible default
    pub fn for_invoice(invoice_id: core_kernel::InvoiceId) -> Self {
        Self {
            inner: NewPayment {
                invoice_id,
                amount: MoneyFixtures::gross_small(),
                method: PaymentMethod::BankTransfer,
                reference: Some("TRF-001".to_string()),
                received_date: TemporalFixtures::due_date(),
                confirmed: true,
            },
        }
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.inner.amount = amount;
        self
    }

    pub fn pending(mut self) -> Self {
        self.inner.confirmed = false;
        self
    }

    pub fn build(self) -> NewPayment {
        self.inner
    }
}
