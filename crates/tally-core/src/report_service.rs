//! Receivables and payables reporting over a tenant book.

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use tally_domain::{round_money, Book, OverdueStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AgingBucket {
    Current,
    Days1To30,
    Days31To60,
    Days61To90,
    Over90,
}

impl AgingBucket {
    pub const ALL: [AgingBucket; 5] = [
        AgingBucket::Current,
        AgingBucket::Days1To30,
        AgingBucket::Days31To60,
        AgingBucket::Days61To90,
        AgingBucket::Over90,
    ];

    pub fn for_days(days_overdue: i64) -> Self {
        match days_overdue {
            i64::MIN..=0 => AgingBucket::Current,
            1..=30 => AgingBucket::Days1To30,
            31..=60 => AgingBucket::Days31To60,
            61..=90 => AgingBucket::Days61To90,
            _ => AgingBucket::Over90,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgingBucket::Current => "Current",
            AgingBucket::Days1To30 => "1-30",
            AgingBucket::Days31To60 => "31-60",
            AgingBucket::Days61To90 => "61-90",
            AgingBucket::Over90 => "90+",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientAging {
    pub client_id: Uuid,
    pub name: String,
    pub buckets: [f64; 5],
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgingReport {
    pub as_of: NaiveDate,
    pub currency: String,
    pub buckets: [f64; 5],
    pub total: f64,
    pub per_client: Vec<ClientAging>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayableRow {
    pub bill_id: Uuid,
    pub name: String,
    pub payee: String,
    pub due_date: NaiveDate,
    pub balance: f64,
    pub overdue: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PayablesSummary {
    pub as_of: NaiveDate,
    pub horizon_days: u32,
    pub open_total: f64,
    pub due_soon_total: f64,
    pub overdue_total: f64,
    pub rows: Vec<PayableRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverdueRow {
    pub document_id: Uuid,
    pub number: String,
    pub client: String,
    pub due_date: NaiveDate,
    pub days_overdue: i64,
    pub stage: OverdueStage,
    pub late_fee: f64,
    pub balance: f64,
}

pub struct ReportService;

impl ReportService {
    /// Outstanding receivables split into aging buckets, overall and per client.
    pub fn aging(book: &Book, as_of: NaiveDate) -> AgingReport {
        let mut buckets = [0.0; 5];
        let mut per_client: Vec<ClientAging> = Vec::new();

        for doc in book.documents.iter().filter(|d| d.is_collectable()) {
            let days = doc.days_overdue(as_of).unwrap_or(0);
            let slot = AgingBucket::for_days(days).index();
            let balance = doc.balance();
            buckets[slot] += balance;

            let existing = per_client.iter().position(|c| c.client_id == doc.client_id);
            let entry = match existing {
                Some(index) => &mut per_client[index],
                None => {
                    let name = book
                        .client(doc.client_id)
                        .map(|c| c.name.clone())
                        .unwrap_or_else(|| "(unknown client)".into());
                    per_client.push(ClientAging {
                        client_id: doc.client_id,
                        name,
                        buckets: [0.0; 5],
                        total: 0.0,
                    });
                    let last = per_client.len() - 1;
                    &mut per_client[last]
                }
            };
            entry.buckets[slot] += balance;
            entry.total += balance;
        }

        for client in &mut per_client {
            client.buckets = client.buckets.map(round_money);
            client.total = round_money(client.total);
        }
        per_client.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        });
        let buckets = buckets.map(round_money);
        AgingReport {
            as_of,
            currency: book.tenant.currency.clone(),
            total: round_money(buckets.iter().sum()),
            buckets,
            per_client,
        }
    }

    /// Open bills, with the share due within `horizon_days` and the share already overdue.
    pub fn payables(book: &Book, as_of: NaiveDate, horizon_days: u32) -> PayablesSummary {
        let horizon = as_of + Duration::days(i64::from(horizon_days));
        let mut rows: Vec<PayableRow> = book
            .bills
            .iter()
            .filter(|b| b.is_open())
            .map(|b| PayableRow {
                bill_id: b.id,
                name: b.name.clone(),
                payee: b.payee.clone(),
                due_date: b.due_date,
                balance: b.balance(),
                overdue: as_of > b.due_date,
            })
            .collect();
        rows.sort_by_key(|row| row.due_date);

        let open_total = round_money(rows.iter().map(|r| r.balance).sum());
        let overdue_total = round_money(
            rows.iter()
                .filter(|r| r.overdue)
                .map(|r| r.balance)
                .sum(),
        );
        let due_soon_total = round_money(
            rows.iter()
                .filter(|r| !r.overdue && r.due_date <= horizon)
                .map(|r| r.balance)
                .sum(),
        );
        PayablesSummary {
            as_of,
            horizon_days,
            open_total,
            due_soon_total,
            overdue_total,
            rows,
        }
    }

    /// Collectable invoices past their due date, most overdue first.
    pub fn overdue_register(book: &Book, as_of: NaiveDate) -> Vec<OverdueRow> {
        let mut rows: Vec<OverdueRow> = book
            .documents
            .iter()
            .filter(|d| d.is_collectable())
            .filter_map(|doc| {
                let days = doc.days_overdue(as_of)?;
                Some(OverdueRow {
                    document_id: doc.id,
                    number: doc.label(),
                    client: book
                        .client(doc.client_id)
                        .map(|c| c.name.clone())
                        .unwrap_or_default(),
                    due_date: doc.due_date?,
                    days_overdue: days,
                    stage: doc.overdue_stage,
                    late_fee: doc.late_fee,
                    balance: doc.balance(),
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            b.days_overdue
                .cmp(&a.days_overdue)
                .then_with(|| a.number.cmp(&b.number))
        });
        rows
    }
}
