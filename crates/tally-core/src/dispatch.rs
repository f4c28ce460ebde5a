//! Hands pending outbox notifications to a [`Notifier`].

use tally_domain::{AuditEntry, AuditLevel, Book, DeliveryState};

use crate::notify::Notifier;

pub const DISPATCH_JOB: &str = "dispatch";

#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub delivered: usize,
    pub retrying: usize,
    pub failed: usize,
    /// Delivery problems worth recording in the audit log.
    pub problems: Vec<AuditEntry>,
}

/// Delivers every pending notification once.
///
/// A failure increments the attempt counter; after `max_attempts` the
/// notification is marked failed and never retried.
pub fn dispatch_outbox(book: &mut Book, notifier: &dyn Notifier, max_attempts: u32) -> DispatchSummary {
    let mut summary = DispatchSummary::default();
    let slug = book.tenant.slug.clone();
    let max_attempts = max_attempts.max(1);

    for notification in book.outbox.iter_mut().filter(|n| n.is_pending()) {
        match notifier.deliver(notification) {
            Ok(()) => {
                notification.attempts += 1;
                notification.state = DeliveryState::Delivered;
                notification.last_error = None;
                summary.delivered += 1;
            }
            Err(err) => {
                notification.attempts += 1;
                notification.last_error = Some(err.to_string());
                let exhausted = notification.attempts >= max_attempts;
                if exhausted {
                    notification.state = DeliveryState::Failed;
                    summary.failed += 1;
                } else {
                    summary.retrying += 1;
                }
                tracing::warn!(
                    tenant = %slug,
                    kind = %notification.kind,
                    recipient = %notification.recipient,
                    attempts = notification.attempts,
                    error = %err,
                    "notification delivery failed"
                );
                let level = if exhausted {
                    AuditLevel::Error
                } else {
                    AuditLevel::Warning
                };
                summary.problems.push(
                    AuditEntry::new(
                        DISPATCH_JOB,
                        level,
                        format!(
                            "{} to {} failed (attempt {}): {err}",
                            notification.kind, notification.recipient, notification.attempts
                        ),
                    )
                    .for_tenant(slug.clone())
                    .about(notification.id),
                );
            }
        }
    }
    if summary.delivered + summary.retrying + summary.failed > 0 {
        book.touch();
    }
    summary
}
