use uuid::Uuid;

use tally_domain::{
    round_money, Book, DocumentStatus, LifecyclePolicy, NotificationKind, OverdueStage,
};

use super::{notices, JobContext, JobKind, JobOutcome, LifecycleJob, Transition};
use crate::CoreError;

/// Walks overdue invoices up the ladder `none -> late_fee_applied -> reminder_7d -> termination_warning`.
///
/// A document advances at most one stage per day.
pub struct OverdueDocumentJob;

impl LifecycleJob for OverdueDocumentJob {
    fn kind(&self) -> JobKind {
        JobKind::OverdueDocuments
    }

    fn run(&self, book: &mut Book, ctx: &JobContext) -> Result<JobOutcome, CoreError> {
        let mut outcome = JobOutcome::new(self.kind());
        let candidates: Vec<Uuid> = book
            .documents
            .iter()
            .filter(|d| d.is_collectable())
            .map(|d| d.id)
            .collect();

        for id in candidates {
            let Some(doc) = book.document(id) else {
                continue;
            };
            if doc.stage_changed_on == Some(ctx.today) {
                continue;
            }
            let Some(days) = doc.days_overdue(ctx.today) else {
                continue;
            };
            let from = doc.overdue_stage;
            let Some(next) = next_stage(from, days, &ctx.policy) else {
                tracing::debug!(document = %doc.label(), stage = %from, days, "no stage change");
                continue;
            };
            let label = doc.label();

            let doc = book
                .document_mut(id)
                .ok_or_else(|| CoreError::DocumentNotFound(id.to_string()))?;
            if next == OverdueStage::LateFeeApplied {
                let fee = ctx.policy.late_fee.amount_for(doc.balance());
                doc.late_fee = round_money(doc.late_fee + fee);
            }
            doc.status = DocumentStatus::Overdue;
            doc.overdue_stage = next;
            doc.stage_changed_on = Some(ctx.today);

            let kind = match next {
                OverdueStage::LateFeeApplied => NotificationKind::LateFeeApplied,
                OverdueStage::Reminder7d => NotificationKind::PaymentReminder,
                _ => NotificationKind::TerminationWarning,
            };
            let notice = match book.document(id) {
                Some(doc) => notices::overdue_notice(book, doc, kind, days),
                None => continue,
            };
            book.outbox.push(notice);

            tracing::info!(
                tenant = %book.tenant.slug,
                document = %label,
                from = %from,
                to = %next,
                days_overdue = days,
                "overdue stage advanced"
            );
            outcome
                .transitions
                .push(Transition::new(id, label, from, next));
        }

        if !outcome.is_empty() {
            book.touch();
        }
        Ok(outcome)
    }
}

/// The stage to move to, if the elapsed days reach its threshold.
fn next_stage(current: OverdueStage, days: i64, policy: &LifecyclePolicy) -> Option<OverdueStage> {
    let next = current.next()?;
    let threshold = match next {
        OverdueStage::LateFeeApplied => policy.late_fee_after_days,
        OverdueStage::Reminder7d => policy.reminder_after_days,
        OverdueStage::TerminationWarning => policy.termination_after_days,
        OverdueStage::None => return None,
    };
    (days >= i64::from(threshold)).then_some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_stage_respects_thresholds() {
        let policy = LifecyclePolicy::default();
        assert_eq!(
            next_stage(OverdueStage::None, 1, &policy),
            Some(OverdueStage::LateFeeApplied)
        );
        assert_eq!(next_stage(OverdueStage::LateFeeApplied, 6, &policy), None);
        assert_eq!(
            next_stage(OverdueStage::LateFeeApplied, 7, &policy),
            Some(OverdueStage::Reminder7d)
        );
        assert_eq!(next_stage(OverdueStage::Reminder7d, 13, &policy), None);
        assert_eq!(
            next_stage(OverdueStage::Reminder7d, 14, &policy),
            Some(OverdueStage::TerminationWarning)
        );
        assert_eq!(next_stage(OverdueStage::TerminationWarning, 90, &policy), None);
    }
}
