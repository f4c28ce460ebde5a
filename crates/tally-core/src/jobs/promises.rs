use uuid::Uuid;

use tally_domain::{Book, DocumentStatus, FollowupState};

use super::{notices, JobContext, JobKind, JobOutcome, LifecycleJob, Transition};
use crate::CoreError;

/// Resolves payment promises whose date has passed: kept when the invoice is paid, broken otherwise.
pub struct PromiseCheckJob;

impl LifecycleJob for PromiseCheckJob {
    fn kind(&self) -> JobKind {
        JobKind::PromiseChecks
    }

    fn run(&self, book: &mut Book, ctx: &JobContext) -> Result<JobOutcome, CoreError> {
        let mut outcome = JobOutcome::new(self.kind());
        let lapsed: Vec<Uuid> = book
            .followups
            .iter()
            .filter(|f| f.promise_lapsed(ctx.today))
            .map(|f| f.id)
            .collect();

        for id in lapsed {
            let Some(document_id) = book
                .followups
                .iter()
                .find(|f| f.id == id)
                .map(|f| f.document_id)
            else {
                continue;
            };
            let (paid, label) = match book.document(document_id) {
                Some(doc) => (doc.status == DocumentStatus::Paid, doc.label()),
                None => (false, document_id.to_string()),
            };
            let state = if paid {
                FollowupState::Kept
            } else {
                FollowupState::Broken
            };
            let followup = book
                .followup_mut(id)
                .ok_or(CoreError::FollowupNotFound(id))?;
            let from = followup.state;
            followup.state = state;

            if state == FollowupState::Broken {
                if let Some(followup) = book.followups.iter().find(|f| f.id == id) {
                    let notice = notices::broken_promise_notice(book, followup);
                    book.outbox.push(notice);
                }
            }
            tracing::info!(tenant = %book.tenant.slug, document = %label, %state, "payment promise resolved");
            outcome
                .transitions
                .push(Transition::new(id, format!("promise on {label}"), from, state));
        }

        if !outcome.is_empty() {
            book.touch();
        }
        Ok(outcome)
    }
}
