//! Drafting, issuing and converting quotations, proformas and invoices.

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use tally_domain::{Book, Document, DocumentKind, DocumentStatus, LineItem};

use crate::{product_service::validate_tax_rate, CoreError};

pub struct DocumentService;

impl DocumentService {
    /// Creates a draft for an active client in the tenant's billing currency.
    pub fn create_draft(
        book: &mut Book,
        kind: DocumentKind,
        client_id: Uuid,
    ) -> Result<Uuid, CoreError> {
        let client = book
            .client(client_id)
            .ok_or(CoreError::ClientNotFound(client_id))?;
        if !client.active {
            return Err(CoreError::InvalidOperation(format!(
                "client `{}` is inactive",
                client.name
            )));
        }
        let document = Document::draft(kind, client_id, book.tenant.currency.clone());
        let id = document.id;
        book.documents.push(document);
        book.touch();
        Ok(id)
    }

    pub fn add_line(book: &mut Book, document_id: Uuid, line: LineItem) -> Result<(), CoreError> {
        validate_line(&line)?;
        let doc = draft_mut(book, document_id)?;
        doc.lines.push(line);
        book.touch();
        Ok(())
    }

    /// Copies the product's description, price and tax rate into a new line.
    pub fn add_product_line(
        book: &mut Book,
        document_id: Uuid,
        product_id: Uuid,
        quantity: f64,
    ) -> Result<(), CoreError> {
        let product = book
            .product(product_id)
            .ok_or(CoreError::ProductNotFound(product_id))?;
        let mut line =
            LineItem::new(product.name.clone(), quantity, product.unit_price).with_tax(product.tax_rate);
        line.product_id = Some(product_id);
        Self::add_line(book, document_id, line)
    }

    pub fn remove_line(
        book: &mut Book,
        document_id: Uuid,
        index: usize,
    ) -> Result<LineItem, CoreError> {
        let doc = draft_mut(book, document_id)?;
        if index >= doc.lines.len() {
            return Err(CoreError::Validation(format!(
                "line {index} does not exist on this document"
            )));
        }
        let removed = doc.lines.remove(index);
        book.touch();
        Ok(removed)
    }

    /// Issues a draft: assigns the next number and sets issue and due dates.
    pub fn issue(
        book: &mut Book,
        document_id: Uuid,
        issue_date: NaiveDate,
        payment_terms_days: u32,
    ) -> Result<String, CoreError> {
        let doc = draft_mut(book, document_id)?;
        if doc.lines.is_empty() {
            return Err(CoreError::InvalidOperation(
                "cannot issue a document without lines".into(),
            ));
        }
        let kind = doc.kind;
        let number = book.sequences.next(kind);
        let doc = book
            .document_mut(document_id)
            .ok_or_else(|| CoreError::DocumentNotFound(document_id.to_string()))?;
        doc.number = Some(number.clone());
        doc.issue_date = Some(issue_date);
        doc.due_date = Some(issue_date + Duration::days(i64::from(payment_terms_days)));
        doc.status = DocumentStatus::Sent;
        book.touch();
        tracing::debug!(document = %number, "document issued");
        Ok(number)
    }

    pub fn accept(book: &mut Book, document_id: Uuid) -> Result<(), CoreError> {
        Self::decide_quotation(book, document_id, DocumentStatus::Accepted)
    }

    pub fn reject(book: &mut Book, document_id: Uuid) -> Result<(), CoreError> {
        Self::decide_quotation(book, document_id, DocumentStatus::Rejected)
    }

    /// Converts a quotation or proforma into the next document kind as a new draft.
    pub fn convert(
        book: &mut Book,
        document_id: Uuid,
        target: DocumentKind,
    ) -> Result<Uuid, CoreError> {
        let source = book
            .document(document_id)
            .ok_or_else(|| CoreError::DocumentNotFound(document_id.to_string()))?;
        let allowed = match (source.kind, target) {
            (DocumentKind::Quotation, DocumentKind::Proforma)
            | (DocumentKind::Quotation, DocumentKind::Invoice) => matches!(
                source.status,
                DocumentStatus::Sent | DocumentStatus::Accepted
            ),
            (DocumentKind::Proforma, DocumentKind::Invoice) => {
                source.status == DocumentStatus::Sent
            }
            _ => false,
        };
        if !allowed {
            return Err(CoreError::InvalidOperation(format!(
                "cannot convert {} {} ({}) into {}",
                source.kind,
                source.label(),
                source.status,
                target
            )));
        }
        let mut converted = Document::draft(target, source.client_id, source.currency.clone());
        converted.lines = source.lines.clone();
        converted.notes = source.notes.clone();
        converted.converted_from = Some(source.id);
        let new_id = converted.id;
        if let Some(source) = book.document_mut(document_id) {
            source.status = DocumentStatus::Converted;
        }
        book.documents.push(converted);
        book.touch();
        Ok(new_id)
    }

    /// Cancels a document that has not been paid or converted.
    pub fn cancel(book: &mut Book, document_id: Uuid) -> Result<(), CoreError> {
        let doc = book
            .document_mut(document_id)
            .ok_or_else(|| CoreError::DocumentNotFound(document_id.to_string()))?;
        if !doc.payments.is_empty() {
            return Err(CoreError::InvalidOperation(
                "documents with payments cannot be cancelled".into(),
            ));
        }
        if matches!(
            doc.status,
            DocumentStatus::Paid | DocumentStatus::Converted | DocumentStatus::Cancelled
        ) {
            return Err(CoreError::InvalidOperation(format!(
                "document in status {} cannot be cancelled",
                doc.status
            )));
        }
        doc.status = DocumentStatus::Cancelled;
        book.touch();
        Ok(())
    }

    pub fn set_notes(
        book: &mut Book,
        document_id: Uuid,
        notes: Option<String>,
    ) -> Result<(), CoreError> {
        let doc = book
            .document_mut(document_id)
            .ok_or_else(|| CoreError::DocumentNotFound(document_id.to_string()))?;
        doc.notes = notes.filter(|n| !n.trim().is_empty());
        book.touch();
        Ok(())
    }

    fn decide_quotation(
        book: &mut Book,
        document_id: Uuid,
        outcome: DocumentStatus,
    ) -> Result<(), CoreError> {
        let doc = book
            .document_mut(document_id)
            .ok_or_else(|| CoreError::DocumentNotFound(document_id.to_string()))?;
        if doc.kind != DocumentKind::Quotation || doc.status != DocumentStatus::Sent {
            return Err(CoreError::InvalidOperation(
                "only sent quotations can be accepted or rejected".into(),
            ));
        }
        doc.status = outcome;
        book.touch();
        Ok(())
    }
}

fn draft_mut(book: &mut Book, document_id: Uuid) -> Result<&mut Document, CoreError> {
    let doc = book
        .document_mut(document_id)
        .ok_or_else(|| CoreError::DocumentNotFound(document_id.to_string()))?;
    if doc.status != DocumentStatus::Draft {
        return Err(CoreError::InvalidOperation(format!(
            "document {} is {} and can no longer be edited",
            doc.label(),
            doc.status
        )));
    }
    Ok(doc)
}

fn validate_line(line: &LineItem) -> Result<(), CoreError> {
    if line.description.trim().is_empty() {
        return Err(CoreError::Validation("line description must not be empty".into()));
    }
    if !line.quantity.is_finite() || line.quantity <= 0.0 {
        return Err(CoreError::Validation("quantity must be positive".into()));
    }
    if !line.unit_price.is_finite() || line.unit_price < 0.0 {
        return Err(CoreError::Validation("unit price must not be negative".into()));
    }
    validate_tax_rate(line.tax_rate)
}
