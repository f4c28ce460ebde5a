use uuid::Uuid;

use tally_domain::{Bill, BillStage, BillStatus, Book, NotificationKind};

use super::{notices, JobContext, JobKind, JobOutcome, LifecycleJob, Transition};
use crate::CoreError;

/// Spawns a bill for each active statutory whose due date has arrived and that has no open bill.
pub struct RecurringBillJob;

impl LifecycleJob for RecurringBillJob {
    fn kind(&self) -> JobKind {
        JobKind::RecurringBills
    }

    fn run(&self, book: &mut Book, ctx: &JobContext) -> Result<JobOutcome, CoreError> {
        let mut outcome = JobOutcome::new(self.kind());
        let due: Vec<Uuid> = book
            .statutories
            .iter()
            .filter(|s| s.active && s.next_due_date <= ctx.today)
            .map(|s| s.id)
            .collect();

        for id in due {
            if book.has_open_bill_for(id) {
                tracing::debug!(statutory = %id, "open bill exists, generation deferred");
                continue;
            }
            let statutory = book
                .statutory(id)
                .cloned()
                .ok_or(CoreError::StatutoryNotFound(id))?;
            let period_billed = book.bills.iter().any(|b| {
                b.statutory_id == Some(id) && b.due_date == statutory.next_due_date
            });

            let bill_id = if period_billed {
                tracing::warn!(
                    statutory = %statutory.name,
                    due = %statutory.next_due_date,
                    "period already billed, advancing schedule only"
                );
                None
            } else {
                let bill = Bill::from_statutory(&statutory);
                let bill_id = bill.id;
                book.bills.push(bill);
                Some(bill_id)
            };

            if let Some(entry) = book.statutory_mut(id) {
                match statutory.cycle.advance(statutory.next_due_date) {
                    Some(next) => entry.next_due_date = next,
                    None => entry.active = false,
                }
            }

            let Some(bill_id) = bill_id else {
                continue;
            };
            if let Some(bill) = book.bill(bill_id) {
                let notice =
                    notices::bill_notice(book, bill, NotificationKind::BillGenerated, ctx.today);
                book.outbox.push(notice);
            }
            tracing::info!(
                tenant = %book.tenant.slug,
                statutory = %statutory.name,
                due = %statutory.next_due_date,
                "bill generated"
            );
            outcome.transitions.push(Transition::new(
                bill_id,
                statutory.name.clone(),
                "statutory",
                format!("bill due {}", statutory.next_due_date),
            ));
        }

        if !outcome.is_empty() {
            book.touch();
        }
        Ok(outcome)
    }
}

/// Reminds the tenant about open bills entering the reminder window.
pub struct BillReminderJob;

impl LifecycleJob for BillReminderJob {
    fn kind(&self) -> JobKind {
        JobKind::BillReminders
    }

    fn run(&self, book: &mut Book, ctx: &JobContext) -> Result<JobOutcome, CoreError> {
        let window = i64::from(ctx.policy.bill_reminder_days_before);
        let candidates: Vec<Uuid> = book
            .bills
            .iter()
            .filter(|b| b.is_open() && b.stage == BillStage::Generated)
            .filter(|b| {
                let days_left = (b.due_date - ctx.today).num_days();
                (0..=window).contains(&days_left)
            })
            .map(|b| b.id)
            .collect();

        advance_bills(
            book,
            ctx,
            JobOutcome::new(self.kind()),
            candidates,
            BillStage::ReminderSent,
            NotificationKind::BillReminder,
        )
    }
}

/// Flags open bills past their due date as overdue.
pub struct BillOverdueJob;

impl LifecycleJob for BillOverdueJob {
    fn kind(&self) -> JobKind {
        JobKind::BillOverdue
    }

    fn run(&self, book: &mut Book, ctx: &JobContext) -> Result<JobOutcome, CoreError> {
        let candidates: Vec<Uuid> = book
            .bills
            .iter()
            .filter(|b| b.is_open() && b.stage != BillStage::Overdue && ctx.today > b.due_date)
            .map(|b| b.id)
            .collect();

        advance_bills(
            book,
            ctx,
            JobOutcome::new(self.kind()),
            candidates,
            BillStage::Overdue,
            NotificationKind::BillOverdue,
        )
    }
}

fn advance_bills(
    book: &mut Book,
    ctx: &JobContext,
    mut outcome: JobOutcome,
    candidates: Vec<Uuid>,
    stage: BillStage,
    kind: NotificationKind,
) -> Result<JobOutcome, CoreError> {
    for id in candidates {
        let bill = book.bill_mut(id).ok_or(CoreError::BillNotFound(id))?;
        let from = bill.stage;
        bill.stage = stage;
        if stage == BillStage::Overdue {
            bill.status = BillStatus::Overdue;
        }
        let name = bill.name.clone();

        if let Some(bill) = book.bill(id) {
            let notice = notices::bill_notice(book, bill, kind, ctx.today);
            book.outbox.push(notice);
        }
        tracing::info!(
            tenant = %book.tenant.slug,
            bill = %name,
            from = %from,
            to = %stage,
            "bill stage advanced"
        );
        outcome
            .transitions
            .push(Transition::new(id, name, from, stage));
    }
    if !outcome.is_empty() {
        book.touch();
    }
    Ok(outcome)
}
