//! Scheduled lifecycle jobs: subscriptions, overdue invoices, recurring bills and promises.
//!
//! Every job only mutates the book it is handed and queues notifications into
//! the book's outbox. Jobs check the current stage before acting, so running a
//! job twice on the same day leaves the book unchanged the second time.

mod bills;
mod notices;
mod overdue;
mod promises;
mod subscriptions;

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use uuid::Uuid;

use tally_domain::{Book, LifecyclePolicy};

use crate::CoreError;

pub use bills::{BillOverdueJob, BillReminderJob, RecurringBillJob};
pub use overdue::OverdueDocumentJob;
pub use promises::PromiseCheckJob;
pub use subscriptions::SubscriptionJob;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Subscriptions,
    OverdueDocuments,
    RecurringBills,
    BillReminders,
    BillOverdue,
    PromiseChecks,
}

impl JobKind {
    /// Execution order used by the runner.
    pub const ALL: [JobKind; 6] = [
        JobKind::Subscriptions,
        JobKind::OverdueDocuments,
        JobKind::RecurringBills,
        JobKind::BillReminders,
        JobKind::BillOverdue,
        JobKind::PromiseChecks,
    ];

    pub fn name(self) -> &'static str {
        match self {
            JobKind::Subscriptions => "subscriptions",
            JobKind::OverdueDocuments => "overdue-documents",
            JobKind::RecurringBills => "recurring-bills",
            JobKind::BillReminders => "bill-reminders",
            JobKind::BillOverdue => "bill-overdue",
            JobKind::PromiseChecks => "promise-checks",
        }
    }

    pub fn job(self) -> Box<dyn LifecycleJob> {
        match self {
            JobKind::Subscriptions => Box::new(SubscriptionJob),
            JobKind::OverdueDocuments => Box::new(OverdueDocumentJob),
            JobKind::RecurringBills => Box::new(RecurringBillJob),
            JobKind::BillReminders => Box::new(BillReminderJob),
            JobKind::BillOverdue => Box::new(BillOverdueJob),
            JobKind::PromiseChecks => Box::new(PromiseCheckJob),
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JobKind {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        JobKind::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| CoreError::Validation(format!("unknown job `{value}`")))
    }
}

/// Inputs shared by all jobs for one tenant run.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub today: NaiveDate,
    pub policy: LifecyclePolicy,
}

impl JobContext {
    pub fn new(today: NaiveDate, policy: LifecyclePolicy) -> Self {
        Self { today, policy }
    }
}

/// A single state change applied by a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub entity_id: Uuid,
    pub label: String,
    pub from: String,
    pub to: String,
}

impl Transition {
    pub fn new(
        entity_id: Uuid,
        label: impl Into<String>,
        from: impl fmt::Display,
        to: impl fmt::Display,
    ) -> Self {
        Self {
            entity_id,
            label: label.into(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.label, self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub job: JobKind,
    pub transitions: Vec<Transition>,
}

impl JobOutcome {
    pub fn new(job: JobKind) -> Self {
        Self {
            job,
            transitions: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

/// A batch step applied to one tenant book.
pub trait LifecycleJob {
    fn kind(&self) -> JobKind;
    fn run(&self, book: &mut Book, ctx: &JobContext) -> Result<JobOutcome, CoreError>;
}
