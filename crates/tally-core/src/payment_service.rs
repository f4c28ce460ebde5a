//! Incoming payments against invoices, outgoing payments against bills, and gateway IPNs.

use chrono::NaiveDate;
use uuid::Uuid;

use tally_domain::{
    is_settled, round_money, BillStatus, Book, DocumentStatus, GatewayEvent, GatewayStatus,
    PaymentIn, PaymentMethod, PaymentOut,
};

use crate::CoreError;

/// Result of applying a gateway notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    Applied {
        document: String,
        status: DocumentStatus,
    },
    /// The transaction id was already recorded; nothing changed.
    Duplicate,
    /// Non-completed events are acknowledged without touching the book.
    Ignored(GatewayStatus),
}

pub struct PaymentService;

impl PaymentService {
    /// Records a payment against an issued invoice and returns the resulting status.
    pub fn record_in(
        book: &mut Book,
        document_id: Uuid,
        payment: PaymentIn,
        today: NaiveDate,
    ) -> Result<DocumentStatus, CoreError> {
        let doc = book
            .document_mut(document_id)
            .ok_or_else(|| CoreError::DocumentNotFound(document_id.to_string()))?;
        if !doc.is_collectable() {
            return Err(CoreError::InvalidOperation(format!(
                "{} ({}) does not accept payments",
                doc.label(),
                doc.status
            )));
        }
        validate_amount(payment.amount, doc.balance())?;
        doc.payments.push(payment);
        doc.refresh_payment_status(today);
        let status = doc.status;
        book.touch();
        Ok(status)
    }

    /// Records a payment against an open bill and returns the resulting status.
    pub fn record_out(
        book: &mut Book,
        bill_id: Uuid,
        payment: PaymentOut,
        today: NaiveDate,
    ) -> Result<BillStatus, CoreError> {
        let bill = book.bill_mut(bill_id).ok_or(CoreError::BillNotFound(bill_id))?;
        if !bill.is_open() {
            return Err(CoreError::InvalidOperation(format!(
                "bill `{}` is {} and does not accept payments",
                bill.name, bill.status
            )));
        }
        validate_amount(payment.amount, bill.balance())?;
        bill.payments.push(payment);
        bill.refresh_payment_status(today);
        let status = bill.status;
        book.touch();
        Ok(status)
    }

    /// Applies an IPN, keyed on the gateway transaction id so replays are harmless.
    pub fn apply_gateway_event(
        book: &mut Book,
        event: &GatewayEvent,
        today: NaiveDate,
    ) -> Result<GatewayOutcome, CoreError> {
        if event.status != GatewayStatus::Completed {
            return Ok(GatewayOutcome::Ignored(event.status));
        }
        let already_applied = book.documents.iter().any(|doc| {
            doc.payments
                .iter()
                .any(|p| p.reference.as_deref() == Some(event.transaction_id.as_str()))
        });
        if already_applied {
            return Ok(GatewayOutcome::Duplicate);
        }
        let document_id = book
            .document_by_number(&event.document_number)
            .map(|doc| doc.id)
            .ok_or_else(|| CoreError::DocumentNotFound(event.document_number.clone()))?;
        let currency = event.currency.trim().to_uppercase();
        if currency != book.tenant.currency {
            return Err(CoreError::Validation(format!(
                "gateway paid in {currency} but {} is billed in {}",
                event.document_number, book.tenant.currency
            )));
        }
        let payment = PaymentIn::new(event.amount, event.paid_on, PaymentMethod::Gateway)
            .with_reference(event.transaction_id.clone());
        let status = Self::record_in(book, document_id, payment, today)?;
        tracing::info!(
            tenant = %book.tenant.slug,
            document = %event.document_number,
            transaction = %event.transaction_id,
            %status,
            "gateway payment applied"
        );
        Ok(GatewayOutcome::Applied {
            document: event.document_number.clone(),
            status,
        })
    }
}

fn validate_amount(amount: f64, balance: f64) -> Result<(), CoreError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CoreError::Validation("payment amount must be positive".into()));
    }
    let remaining = round_money(balance - amount);
    if remaining < 0.0 && !is_settled(remaining) {
        return Err(CoreError::Validation(format!(
            "payment of {amount:.2} exceeds the outstanding balance of {balance:.2}"
        )));
    }
    Ok(())
}
