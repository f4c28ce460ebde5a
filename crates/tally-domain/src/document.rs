//! Quotations, proformas and invoices, with their line items, payments and overdue ladder.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Quotation,
    Proforma,
    Invoice,
}

impl DocumentKind {
    /// Prefix used when numbering issued documents (`INV-0001`).
    pub fn prefix(self) -> &'static str {
        match self {
            DocumentKind::Quotation => "QUO",
            DocumentKind::Proforma => "PRO",
            DocumentKind::Invoice => "INV",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentKind::Quotation => "Quotation",
            DocumentKind::Proforma => "Proforma",
            DocumentKind::Invoice => "Invoice",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DocumentStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Converted,
    PartiallyPaid,
    Paid,
    Overdue,
    Cancelled,
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DocumentStatus::Draft => "Draft",
            DocumentStatus::Sent => "Sent",
            DocumentStatus::Accepted => "Accepted",
            DocumentStatus::Rejected => "Rejected",
            DocumentStatus::Converted => "Converted",
            DocumentStatus::PartiallyPaid => "Partially paid",
            DocumentStatus::Paid => "Paid",
            DocumentStatus::Overdue => "Overdue",
            DocumentStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
/// Collection progress of an overdue invoice. Only ever moves forward.
pub enum OverdueStage {
    #[default]
    None,
    LateFeeApplied,
    Reminder7d,
    TerminationWarning,
}

impl OverdueStage {
    pub fn next(self) -> Option<OverdueStage> {
        match self {
            OverdueStage::None => Some(OverdueStage::LateFeeApplied),
            OverdueStage::LateFeeApplied => Some(OverdueStage::Reminder7d),
            OverdueStage::Reminder7d => Some(OverdueStage::TerminationWarning),
            OverdueStage::TerminationWarning => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OverdueStage::None => "none",
            OverdueStage::LateFeeApplied => "late_fee_applied",
            OverdueStage::Reminder7d => "reminder_7d",
            OverdueStage::TerminationWarning => "termination_warning",
        }
    }
}

impl fmt::Display for OverdueStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<Uuid>,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            tax_rate: 0.0,
            product_id: None,
        }
    }

    pub fn with_tax(mut self, tax_rate: f64) -> Self {
        self.tax_rate = tax_rate;
        self
    }

    pub fn net(&self) -> f64 {
        round_money(self.quantity * self.unit_price)
    }

    pub fn tax(&self) -> f64 {
        round_money(self.net() * self.tax_rate / 100.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIn {
    pub id: Uuid,
    pub amount: f64,
    pub date: NaiveDate,
    pub method: PaymentMethod,
    /// Bank or gateway reference; gateway transaction ids make IPN replays detectable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl PaymentIn {
    pub fn new(amount: f64, date: NaiveDate, method: PaymentMethod) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount: round_money(amount),
            date,
            method,
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub kind: DocumentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    pub client_id: Uuid,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub lines: Vec<LineItem>,
    pub status: DocumentStatus,
    #[serde(default)]
    pub overdue_stage: OverdueStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_changed_on: Option<NaiveDate>,
    #[serde(default)]
    pub late_fee: f64,
    #[serde(default)]
    pub payments: Vec<PaymentIn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_from: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Document {
    pub fn draft(kind: DocumentKind, client_id: Uuid, currency: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            number: None,
            client_id,
            currency: currency.into(),
            issue_date: None,
            due_date: None,
            lines: Vec::new(),
            status: DocumentStatus::Draft,
            overdue_stage: OverdueStage::None,
            stage_changed_on: None,
            late_fee: 0.0,
            payments: Vec::new(),
            converted_from: None,
            notes: None,
        }
    }

    pub fn subtotal(&self) -> f64 {
        round_money(self.lines.iter().map(LineItem::net).sum())
    }

    pub fn tax_total(&self) -> f64 {
        round_money(self.lines.iter().map(LineItem::tax).sum())
    }

    /// Amount owed including tax and any late fee.
    pub fn total(&self) -> f64 {
        round_money(self.subtotal() + self.tax_total() + self.late_fee)
    }

    pub fn paid(&self) -> f64 {
        round_money(self.payments.iter().map(|p| p.amount).sum())
    }

    pub fn balance(&self) -> f64 {
        round_money(self.total() - self.paid())
    }

    /// Days past the due date, `None` until the due date has passed.
    pub fn days_overdue(&self, today: NaiveDate) -> Option<i64> {
        let due = self.due_date?;
        if today > due {
            Some((today - due).num_days())
        } else {
            None
        }
    }

    /// Issued invoices that still carry a balance.
    pub fn is_collectable(&self) -> bool {
        self.kind == DocumentKind::Invoice
            && matches!(
                self.status,
                DocumentStatus::Sent | DocumentStatus::PartiallyPaid | DocumentStatus::Overdue
            )
            && !is_settled(self.balance())
    }

    /// Re-derives the payment status after payments or fees changed.
    pub fn refresh_payment_status(&mut self, today: NaiveDate) {
        if !matches!(
            self.status,
            DocumentStatus::Sent
                | DocumentStatus::PartiallyPaid
                | DocumentStatus::Overdue
                | DocumentStatus::Paid
        ) {
            return;
        }
        let balance = self.balance();
        self.status = if is_settled(balance) {
            DocumentStatus::Paid
        } else if self.overdue_stage != OverdueStage::None || self.days_overdue(today).is_some() {
            DocumentStatus::Overdue
        } else if self.paid() > 0.0 {
            DocumentStatus::PartiallyPaid
        } else {
            DocumentStatus::Sent
        };
    }

    pub fn label(&self) -> String {
        self.number
            .clone()
            .unwrap_or_else(|| format!("{} draft {}", self.kind, short_id(self.id)))
    }
}

impl Identifiable for Document {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Document {
    fn display_label(&self) -> String {
        format!("{} [{}]", self.label(), self.status)
    }
}

pub(crate) fn short_id(id: Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice() -> Document {
        let mut doc = Document::draft(DocumentKind::Invoice, Uuid::new_v4(), "EUR");
        doc.lines.push(LineItem::new("Consulting", 2.0, 100.0).with_tax(20.0));
        doc.lines.push(LineItem::new("Travel", 1.0, 50.0));
        doc.status = DocumentStatus::Sent;
        doc.due_date = Some(date(2025, 3, 1));
        doc
    }

    #[test]
    fn totals_include_tax_and_late_fee() {
        let mut doc = invoice();
        assert_eq!(doc.subtotal(), 250.0);
        assert_eq!(doc.tax_total(), 40.0);
        assert_eq!(doc.total(), 290.0);
        doc.late_fee = 10.0;
        assert_eq!(doc.balance(), 300.0);
    }

    #[test]
    fn days_overdue_starts_after_due_date() {
        let doc = invoice();
        assert_eq!(doc.days_overdue(date(2025, 3, 1)), None);
        assert_eq!(doc.days_overdue(date(2025, 3, 2)), Some(1));
        assert_eq!(doc.days_overdue(date(2025, 3, 15)), Some(14));
    }

    #[test]
    fn payment_status_follows_balance() {
        let mut doc = invoice();
        doc.payments.push(PaymentIn::new(90.0, date(2025, 2, 20), PaymentMethod::Card));
        doc.refresh_payment_status(date(2025, 2, 20));
        assert_eq!(doc.status, DocumentStatus::PartiallyPaid);

        doc.payments.push(PaymentIn::new(200.0, date(2025, 2, 21), PaymentMethod::Card));
        doc.refresh_payment_status(date(2025, 2, 21));
        assert_eq!(doc.status, DocumentStatus::Paid);
        assert!(!doc.is_collectable());
    }

    #[test]
    fn stage_ladder_is_ordered() {
        assert_eq!(OverdueStage::None.next(), Some(OverdueStage::LateFeeApplied));
        assert_eq!(OverdueStage::TerminationWarning.next(), None);
        assert!(OverdueStage::Reminder7d > OverdueStage::LateFeeApplied);
        assert_eq!(OverdueStage::Reminder7d.to_string(), "reminder_7d");
    }
}
