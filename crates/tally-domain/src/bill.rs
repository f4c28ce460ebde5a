//! Payables: statutory obligation templates and the bills they spawn.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

/// Recurring payable obligation (rent, tax filing, licence fee) that spawns [`Bill`] rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statutory {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub payee: String,
    pub amount: f64,
    pub cycle: Cycle,
    pub next_due_date: NaiveDate,
    #[serde(default = "Statutory::default_active")]
    pub active: bool,
}

impl Statutory {
    pub fn new(
        name: impl Into<String>,
        payee: impl Into<String>,
        amount: f64,
        cycle: Cycle,
        next_due_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            payee: payee.into(),
            amount: round_money(amount),
            cycle,
            next_due_date,
            active: true,
        }
    }

    fn default_active() -> bool {
        true
    }
}

impl Identifiable for Statutory {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Statutory {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BillStatus {
    Pending,
    PartiallyPaid,
    Paid,
    Overdue,
    Cancelled,
}

impl BillStatus {
    pub fn is_open(self) -> bool {
        matches!(
            self,
            BillStatus::Pending | BillStatus::PartiallyPaid | BillStatus::Overdue
        )
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BillStatus::Pending => "Pending",
            BillStatus::PartiallyPaid => "Partially paid",
            BillStatus::Paid => "Paid",
            BillStatus::Overdue => "Overdue",
            BillStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
/// Notification progress of a bill: generated, reminded, overdue.
pub enum BillStage {
    #[default]
    Generated,
    ReminderSent,
    Overdue,
}

impl fmt::Display for BillStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BillStage::Generated => "generated",
            BillStage::ReminderSent => "reminder_sent",
            BillStage::Overdue => "overdue",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOut {
    pub id: Uuid,
    pub amount: f64,
    pub date: NaiveDate,
    pub method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl PaymentOut {
    pub fn new(amount: f64, date: NaiveDate, method: PaymentMethod) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount: round_money(amount),
            date,
            method,
            reference: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statutory_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub payee: String,
    pub amount: f64,
    pub due_date: NaiveDate,
    pub status: BillStatus,
    #[serde(default)]
    pub stage: BillStage,
    #[serde(default)]
    pub payments: Vec<PaymentOut>,
}

impl Bill {
    pub fn new(
        name: impl Into<String>,
        payee: impl Into<String>,
        amount: f64,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            statutory_id: None,
            name: name.into(),
            payee: payee.into(),
            amount: round_money(amount),
            due_date,
            status: BillStatus::Pending,
            stage: BillStage::Generated,
            payments: Vec::new(),
        }
    }

    /// Builds the bill for the statutory's current due date.
    pub fn from_statutory(statutory: &Statutory) -> Self {
        let mut bill = Bill::new(
            statutory.name.clone(),
            statutory.payee.clone(),
            statutory.amount,
            statutory.next_due_date,
        );
        bill.statutory_id = Some(statutory.id);
        bill
    }

    pub fn paid(&self) -> f64 {
        round_money(self.payments.iter().map(|p| p.amount).sum())
    }

    pub fn balance(&self) -> f64 {
        round_money(self.amount - self.paid())
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    pub fn refresh_payment_status(&mut self, today: NaiveDate) {
        if !self.is_open() {
            return;
        }
        self.status = if is_settled(self.balance()) {
            BillStatus::Paid
        } else if today > self.due_date {
            BillStatus::Overdue
        } else if self.paid() > 0.0 {
            BillStatus::PartiallyPaid
        } else {
            BillStatus::Pending
        };
    }
}

impl Identifiable for Bill {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Bill {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bill_from_statutory_copies_due_date() {
        let due = NaiveDate::from_ymd_opt(2025, 4, 30).unwrap();
        let statutory = Statutory::new("VAT return", "Tax office", 1200.0, Cycle::Quarterly, due);
        let bill = Bill::from_statutory(&statutory);
        assert_eq!(bill.statutory_id, Some(statutory.id));
        assert_eq!(bill.due_date, due);
        assert_eq!(bill.stage, BillStage::Generated);
        assert!(bill.is_open());
    }

    #[test]
    fn bill_status_follows_payments() {
        let due = NaiveDate::from_ymd_opt(2025, 4, 30).unwrap();
        let mut bill = Bill::new("Rent", "Landlord", 1000.0, due);
        bill.payments.push(PaymentOut::new(400.0, due, PaymentMethod::BankTransfer));
        bill.refresh_payment_status(due);
        assert_eq!(bill.status, BillStatus::PartiallyPaid);
        bill.payments.push(PaymentOut::new(600.0, due, PaymentMethod::BankTransfer));
        bill.refresh_payment_status(due);
        assert_eq!(bill.status, BillStatus::Paid);
        assert!(!bill.is_open());
    }
}
