//! Payment reconciliation tests

use core_kernel::{InvoiceId, Money};
use domain_documents::{
    Actor, DocumentError, InvoiceService, InvoiceStatus, PaymentStatus, ReconciliationService,
};
use domain_ledger::JournalEngine;
use test_utils::{IdFixtures, NewInvoiceBuilder, NewPaymentBuilder, StringFixtures};

fn actor() -> Actor {
    Actor::admin(StringFixtures::approver())
}

/// Sent invoice with a total of 2,220,000 (2,000,000 gross + 11% PPN)
fn sent_invoice(invoices: &mut InvoiceService, journal: &mut JournalEngine) -> InvoiceId {
    let invoice = invoices
        .create(
            NewInvoiceBuilder::new()
                .with_gross(Money::from_rupiah(2_000_000))
                .build(),
        )
        .unwrap();
    invoices.mark_sent(invoice.id, &actor(), journal).unwrap();
    invoice.id
}

fn setup() -> (ReconciliationService, InvoiceService, JournalEngine) {
    let mut invoices = InvoiceService::new();
    invoices.register_client(IdFixtures::client_id());
    (ReconciliationService::new(), invoices, JournalEngine::new())
}

#[test]
fn test_exact_coverage_marks_invoice_paid() {
    let (mut payments, mut invoices, mut journal) = setup();
    let invoice_id = sent_invoice(&mut invoices, &mut journal);

    let outcome = payments
        .record_payment(
            NewPaymentBuilder::for_invoice(invoice_id)
                .with_amount(Money::from_rupiah(2_220_000))
                .build(),
            &mut invoices,
            &actor(),
            &mut journal,
        )
        .unwrap();

    assert!(outcome.is_clean());
    assert_eq!(outcome.document.status, PaymentStatus::Confirmed);
    let invoice = invoices.get(invoice_id).unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert!(invoice.payment_journal_id.is_some());
    assert!(payments.outstanding(invoice_id, invoice.amounts.total).is_zero());
}

#[test]
fn test_partial_payments_accumulate() {
    let (mut payments, mut invoices, mut journal) = setup();
    let invoice_id = sent_invoice(&mut invoices, &mut journal);

    payments
        .record_payment(
            NewPaymentBuilder::for_invoice(invoice_id)
                .with_amount(Money::from_rupiah(1_000_000))
                .build(),
            &mut invoices,
            &actor(),
            &mut journal,
        )
        .unwrap();

    // Still short of the total
    assert_eq!(
        invoices.get(invoice_id).unwrap().status,
        InvoiceStatus::Sent
    );
    assert_eq!(
        payments.confirmed_total(invoice_id),
        Money::from_rupiah(1_000_000)
    );

    payments
        .record_payment(
            NewPaymentBuilder::for_invoice(invoice_id)
                .with_amount(Money::from_rupiah(1_220_000))
                .build(),
            &mut invoices,
            &actor(),
            &mut journal,
        )
        .unwrap();

    assert_eq!(
        invoices.get(invoice_id).unwrap().status,
        InvoiceStatus::Paid
    );
}

#[test]
fn test_overpayment_rejected() {
    let (mut payments, mut invoices, mut journal) = setup();
    let invoice_id = sent_invoice(&mut invoices, &mut journal);

    payments
        .record_payment(
            NewPaymentBuilder::for_invoice(invoice_id)
                .with_amount(Money::from_rupiah(2_000_000))
                .build(),
            &mut invoices,
            &actor(),
            &mut journal,
        )
        .unwrap();

    let err = payments
        .record_payment(
            NewPaymentBuilder::for_invoice(invoice_id)
                .with_amount(Money::from_rupiah(500_000))
                .build(),
            &mut invoices,
            &actor(),
            &mut journal,
        )
        .unwrap_err();

    match err {
        DocumentError::OverpaymentRejected { total, attempted } => {
            assert_eq!(total, Money::from_rupiah(2_220_000));
            assert_eq!(attempted, Money::from_rupiah(2_500_000));
        }
        other => panic!("expected OverpaymentRejected, got {other:?}"),
    }
    // The rejected payment was never stored
    assert_eq!(payments.payments_for_invoice(invoice_id).len(), 1);
}

#[test]
fn test_pending_payments_do_not_count() {
    let (mut payments, mut invoices, mut journal) = setup();
    let invoice_id = sent_invoice(&mut invoices, &mut journal);

    let outcome = payments
        .record_payment(
            NewPaymentBuilder::for_invoice(invoice_id)
                .with_amount(Money::from_rupiah(2_220_000))
                .pending()
                .build(),
            &mut invoices,
            &actor(),
            &mut journal,
        )
        .unwrap();

    assert_eq!(outcome.document.status, PaymentStatus::Pending);
    assert!(payments.confirmed_total(invoice_id).is_zero());
    assert_eq!(
        invoices.get(invoice_id).unwrap().status,
        InvoiceStatus::Sent
    );

    // Confirmation triggers the coverage check and the paid transition
    payments
        .confirm_payment(outcome.document.id, &mut invoices, &actor(), &mut journal)
        .unwrap();
    assert_eq!(
        invoices.get(invoice_id).unwrap().status,
        InvoiceStatus::Paid
    );
}

#[test]
fn test_confirming_beyond_total_rejected() {
    let (mut payments, mut invoices, mut journal) = setup();
    let invoice_id = sent_invoice(&mut invoices, &mut journal);

    payments
        .record_payment(
            NewPaymentBuilder::for_invoice(invoice_id)
                .with_amount(Money::from_rupiah(2_220_000))
                .build(),
            &mut invoices,
            &actor(),
            &mut journal,
        )
        .unwrap();

    let pending = payments
        .record_payment(
            NewPaymentBuilder::for_invoice(invoice_id)
                .with_amount(Money::from_rupiah(100_000))
                .pending()
                .build(),
            &mut invoices,
            &actor(),
            &mut journal,
        )
        .unwrap();

    let result =
        payments.confirm_payment(pending.document.id, &mut invoices, &actor(), &mut journal);
    assert!(matches!(
        result,
        Err(DocumentError::OverpaymentRejected { .. })
    ));
    assert_eq!(
        payments.get(pending.document.id).unwrap().status,
        PaymentStatus::Pending
    );
}

#[test]
fn test_cancelling_payment_never_unpays_invoice() {
    let (mut payments, mut invoices, mut journal) = setup();
    let invoice_id = sent_invoice(&mut invoices, &mut journal);

    let payment = payments
        .record_payment(
            NewPaymentBuilder::for_invoice(invoice_id)
                .with_amount(Money::from_rupiah(2_220_000))
                .build(),
            &mut invoices,
            &actor(),
            &mut journal,
        )
        .unwrap();
    assert_eq!(
        invoices.get(invoice_id).unwrap().status,
        InvoiceStatus::Paid
    );

    let cancelled = payments
        .cancel_payment(payment.document.id, &mut invoices, &actor(), &mut journal)
        .unwrap();
    assert_eq!(cancelled.document.status, PaymentStatus::Cancelled);

    // Paid has no legal backward transition; the gap is logged, not applied
    assert_eq!(
        invoices.get(invoice_id).unwrap().status,
        InvoiceStatus::Paid
    );
}

#[test]
fn test_update_amount_excludes_own_old_amount() {
    let (mut payments, mut invoices, mut journal) = setup();
    let invoice_id = sent_invoice(&mut invoices, &mut journal);

    let payment = payments
        .record_payment(
            NewPaymentBuilder::for_invoice(invoice_id)
                .with_amount(Money::from_rupiah(2_000_000))
                .build(),
            &mut invoices,
            &actor(),
            &mut journal,
        )
        .unwrap();

    // Raising its own amount to the exact total passes the coverage check
    let updated = payments
        .update_amount(
            payment.document.id,
            Money::from_rupiah(2_220_000),
            &mut invoices,
            &actor(),
            &mut journal,
        )
        .unwrap();
    assert_eq!(updated.document.amount, Money::from_rupiah(2_220_000));
    assert_eq!(
        invoices.get(invoice_id).unwrap().status,
        InvoiceStatus::Paid
    );
}

#[test]
fn test_update_amount_over_total_rejected() {
    let (mut payments, mut invoices, mut journal) = setup();
    let invoice_id = sent_invoice(&mut invoices, &mut journal);

    let payment = payments
        .record_payment(
            NewPaymentBuilder::for_invoice(invoice_id)
                .with_amount(Money::from_rupiah(2_000_000))
                .build(),
            &mut invoices,
            &actor(),
            &mut journal,
        )
        .unwrap();

    let result = payments.update_amount(
        payment.document.id,
        Money::from_rupiah(3_000_000),
        &mut invoices,
        &actor(),
        &mut journal,
    );
    assert!(matches!(
        result,
        Err(DocumentError::OverpaymentRejected { .. })
    ));
}

#[test]
fn test_confirmed_payment_cannot_be_deleted() {
    let (mut payments, mut invoices, mut journal) = setup();
    let invoice_id = sent_invoice(&mut invoices, &mut journal);

    let confirmed = payments
        .record_payment(
            NewPaymentBuilder::for_invoice(invoice_id)
                .with_amount(Money::from_rupiah(1_000_000))
                .build(),
            &mut invoices,
            &actor(),
            &mut journal,
        )
        .unwrap();
    assert!(matches!(
        payments.remove(confirmed.document.id),
        Err(DocumentError::Validation(_))
    ));

    let pending = payments
        .record_payment(
            NewPaymentBuilder::for_invoice(invoice_id)
                .with_amount(Money::from_rupiah(500_000))
                .pending()
                .build(),
            &mut invoices,
            &actor(),
            &mut journal,
        )
        .unwrap();
    payments.remove(pending.document.id).unwrap();
    assert!(payments.get(pending.document.id).is_none());
}

#[test]
fn test_payment_against_unknown_invoice() {
    let (mut payments, mut invoices, mut journal) = setup();

    let result = payments.record_payment(
        NewPaymentBuilder::for_invoice(IdFixtures::invoice_id()).build(),
        &mut invoices,
        &actor(),
        &mut journal,
    );
    assert!(matches!(result, Err(DocumentError::NotFound(_))));
}

#[test]
fn test_payment_against_cancelled_invoice() {
    let (mut payments, mut invoices, mut journal) = setup();
    let invoice_id = sent_invoice(&mut invoices, &mut journal);
    invoices
        .cancel(invoice_id, &actor(), "written off", &mut journal)
        .unwrap();

    let result = payments.record_payment(
        NewPaymentBuilder::for_invoice(invoice_id).build(),
        &mut invoices,
        &actor(),
        &mut journal,
    );
    assert!(matches!(result, Err(DocumentError::Validation(_))));
}

#[test]
fn test_non_positive_amount_rejected() {
    let (mut payments, mut invoices, mut journal) = setup();
    let invoice_id = sent_invoice(&mut invoices, &mut journal);

    let result = payments.record_payment(
        NewPaymentBuilder::for_invoice(invoice_id)
            .with_amount(Money::zero())
            .build(),
        &mut invoices,
        &actor(),
        &mut journal,
    );
    assert!(matches!(result, Err(DocumentError::Validation(_))));
}
