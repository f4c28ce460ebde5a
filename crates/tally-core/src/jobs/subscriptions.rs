use chrono::Duration;

use tally_domain::{Book, NotificationKind, SubscriptionStatus};

use super::{notices, JobContext, JobKind, JobOutcome, LifecycleJob, Transition};
use crate::CoreError;

/// Moves lapsed trials and subscriptions to past due, then to suspended after the grace period.
///
/// At most one status change per day.
pub struct SubscriptionJob;

impl LifecycleJob for SubscriptionJob {
    fn kind(&self) -> JobKind {
        JobKind::Subscriptions
    }

    fn run(&self, book: &mut Book, ctx: &JobContext) -> Result<JobOutcome, CoreError> {
        let mut outcome = JobOutcome::new(self.kind());
        let subscription = &book.tenant.subscription;
        if subscription.status_changed_on == Some(ctx.today) {
            return Ok(outcome);
        }
        let from = subscription.status;
        let lapsed_on = match from {
            SubscriptionStatus::Trial => subscription.trial_ends_on,
            SubscriptionStatus::Active => subscription.paid_through,
            _ => None,
        }
        .filter(|date| ctx.today > *date);
        let grace = Duration::days(i64::from(ctx.policy.subscription_grace_days));

        let (to, kind) = if let Some(lapsed_on) = lapsed_on {
            let subscription = &mut book.tenant.subscription;
            subscription.status = SubscriptionStatus::PastDue;
            subscription.past_due_since = Some(lapsed_on + Duration::days(1));
            subscription.status_changed_on = Some(ctx.today);
            (
                SubscriptionStatus::PastDue,
                NotificationKind::SubscriptionPastDue,
            )
        } else if from == SubscriptionStatus::PastDue
            && subscription
                .past_due_since
                .map_or(true, |since| ctx.today > since + grace)
        {
            book.tenant.subscription.status = SubscriptionStatus::Suspended;
            book.tenant.subscription.status_changed_on = Some(ctx.today);
            (
                SubscriptionStatus::Suspended,
                NotificationKind::SubscriptionSuspended,
            )
        } else {
            return Ok(outcome);
        };

        let notice = notices::subscription_notice(book, kind);
        book.outbox.push(notice);
        tracing::info!(tenant = %book.tenant.slug, from = %from, to = %to, "subscription status changed");
        outcome.transitions.push(Transition::new(
            book.tenant.id,
            book.tenant.name.clone(),
            from,
            to,
        ));
        book.touch();
        Ok(outcome)
    }
}
