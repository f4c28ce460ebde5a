//! Delivery seam for outbox notifications.

use std::sync::Mutex;

use tally_domain::Notification;

use crate::CoreError;

/// Sends a queued notification to its recipient (mail relay, spool file, log, ...).
pub trait Notifier: Send + Sync {
    fn deliver(&self, notification: &Notification) -> Result<(), CoreError>;
}

/// In-memory notifier that records deliveries and can be told to fail.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    delivered: Mutex<Vec<Notification>>,
    failure: Mutex<Option<String>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent delivery fails with `reason` until cleared.
    pub fn fail_with(&self, reason: Option<&str>) {
        if let Ok(mut guard) = self.failure.lock() {
            *guard = reason.map(str::to_string);
        }
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn deliver(&self, notification: &Notification) -> Result<(), CoreError> {
        let failure = self
            .failure
            .lock()
            .map_err(|_| CoreError::Delivery("notifier lock poisoned".into()))?
            .clone();
        if let Some(reason) = failure {
            return Err(CoreError::Delivery(reason));
        }
        self.delivered
            .lock()
            .map_err(|_| CoreError::Delivery("notifier lock poisoned".into()))?
            .push(notification.clone());
        Ok(())
    }
}
