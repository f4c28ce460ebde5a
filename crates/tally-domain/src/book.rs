//! The per-tenant data set persisted as one unit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    bill::{Bill, Statutory},
    client::Client,
    document::{Document, DocumentKind},
    followup::Followup,
    notification::Notification,
    product::Product,
    tenant::Tenant,
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Last issued number per document kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NumberSequences {
    #[serde(default)]
    pub quotation: u32,
    #[serde(default)]
    pub proforma: u32,
    #[serde(default)]
    pub invoice: u32,
}

impl NumberSequences {
    /// Advances the sequence for `kind` and returns the formatted number.
    pub fn next(&mut self, kind: DocumentKind) -> String {
        let counter = match kind {
            DocumentKind::Quotation => &mut self.quotation,
            DocumentKind::Proforma => &mut self.proforma,
            DocumentKind::Invoice => &mut self.invoice,
        };
        *counter += 1;
        format!("{}-{:04}", kind.prefix(), counter)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub tenant: Tenant,
    #[serde(default)]
    pub clients: Vec<Client>,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub statutories: Vec<Statutory>,
    #[serde(default)]
    pub bills: Vec<Bill>,
    #[serde(default)]
    pub followups: Vec<Followup>,
    #[serde(default)]
    pub outbox: Vec<Notification>,
    #[serde(default)]
    pub sequences: NumberSequences,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Book::schema_version_default")]
    pub schema_version: u8,
}

impl Book {
    pub fn new(tenant: Tenant) -> Self {
        Self {
            tenant,
            clients: Vec::new(),
            products: Vec::new(),
            documents: Vec::new(),
            statutories: Vec::new(),
            bills: Vec::new(),
            followups: Vec::new(),
            outbox: Vec::new(),
            sequences: NumberSequences::default(),
            updated_at: Utc::now(),
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn slug(&self) -> &str {
        &self.tenant.slug
    }

    pub fn client(&self, id: Uuid) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn client_mut(&mut self, id: Uuid) -> Option<&mut Client> {
        self.clients.iter_mut().find(|c| c.id == id)
    }

    pub fn product(&self, id: Uuid) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn product_mut(&mut self, id: Uuid) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    pub fn document(&self, id: Uuid) -> Option<&Document> {
        self.documents.iter().find(|d| d.id == id)
    }

    pub fn document_mut(&mut self, id: Uuid) -> Option<&mut Document> {
        self.documents.iter_mut().find(|d| d.id == id)
    }

    pub fn document_by_number(&self, number: &str) -> Option<&Document> {
        self.documents
            .iter()
            .find(|d| d.number.as_deref() == Some(number))
    }

    pub fn statutory(&self, id: Uuid) -> Option<&Statutory> {
        self.statutories.iter().find(|s| s.id == id)
    }

    pub fn statutory_mut(&mut self, id: Uuid) -> Option<&mut Statutory> {
        self.statutories.iter_mut().find(|s| s.id == id)
    }

    pub fn bill(&self, id: Uuid) -> Option<&Bill> {
        self.bills.iter().find(|b| b.id == id)
    }

    pub fn bill_mut(&mut self, id: Uuid) -> Option<&mut Bill> {
        self.bills.iter_mut().find(|b| b.id == id)
    }

    pub fn followup_mut(&mut self, id: Uuid) -> Option<&mut Followup> {
        self.followups.iter_mut().find(|f| f.id == id)
    }

    /// True when an unpaid, uncancelled bill exists for the statutory.
    pub fn has_open_bill_for(&self, statutory_id: Uuid) -> bool {
        self.bills
            .iter()
            .any(|b| b.statutory_id == Some(statutory_id) && b.is_open())
    }

    pub fn pending_notifications(&self) -> usize {
        self.outbox.iter().filter(|n| n.is_pending()).count()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::Subscription;
    use chrono::NaiveDate;

    #[test]
    fn number_sequences_are_per_kind() {
        let mut seq = NumberSequences::default();
        assert_eq!(seq.next(DocumentKind::Invoice), "INV-0001");
        assert_eq!(seq.next(DocumentKind::Invoice), "INV-0002");
        assert_eq!(seq.next(DocumentKind::Quotation), "QUO-0001");
    }

    #[test]
    fn book_round_trips_through_json_with_defaults() {
        let trial_end = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let tenant = Tenant::new("Acme", "eur", "ops@acme.test", Subscription::trial("basic", trial_end));
        let book = Book::new(tenant);
        let json = serde_json::to_value(&book).unwrap();
        let restored: Book = serde_json::from_value(json).unwrap();
        assert_eq!(restored.tenant.currency, "EUR");
        assert_eq!(restored.slug(), "acme");
        assert_eq!(restored.schema_version, CURRENT_SCHEMA_VERSION);
    }
}
