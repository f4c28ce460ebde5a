//! File-spool delivery: each tenant gets an append-only `<slug>.jsonl` mailbox.

use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tally_core::{CoreError, Notifier};
use tally_domain::{canonical_slug, Notification, NotificationKind};

/// One delivered message as written to the spool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpooledMessage {
    pub id: Uuid,
    pub tenant: String,
    pub kind: NotificationKind,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub delivered_at: DateTime<Utc>,
}

/// Hands notifications to a mail relay by appending them to spool files.
#[derive(Debug, Clone)]
pub struct SpoolNotifier {
    dir: PathBuf,
    sender: String,
}

impl SpoolNotifier {
    pub fn new(dir: PathBuf, sender: impl Into<String>) -> Self {
        Self {
            dir,
            sender: sender.into(),
        }
    }

    pub fn spool_path(&self, tenant: &str) -> PathBuf {
        self.dir.join(format!("{}.jsonl", canonical_slug(tenant)))
    }
}

impl Notifier for SpoolNotifier {
    fn deliver(&self, notification: &Notification) -> Result<(), CoreError> {
        if notification.recipient.trim().is_empty() {
            return Err(CoreError::Delivery("notification has no recipient".into()));
        }
        fs::create_dir_all(&self.dir)?;
        let message = SpooledMessage {
            id: notification.id,
            tenant: notification.tenant.clone(),
            kind: notification.kind,
            from: self.sender.clone(),
            to: notification.recipient.clone(),
            subject: notification.subject.clone(),
            body: notification.body.clone(),
            delivered_at: Utc::now(),
        };
        let line =
            serde_json::to_string(&message).map_err(|err| CoreError::Serde(err.to_string()))?;
        let path = self.spool_path(&notification.tenant);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| CoreError::Delivery(format!("{}: {err}", path.display())))?;
        writeln!(file, "{line}")?;
        tracing::info!(
            tenant = %notification.tenant,
            kind = %notification.kind,
            to = %notification.recipient,
            "notification spooled"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn spool_appends_one_line_per_delivery() {
        let dir = tempdir().unwrap();
        let notifier = SpoolNotifier::new(dir.path().join("outbox"), "billing@acme.test");
        let notification = Notification::new(
            "acme",
            NotificationKind::PaymentReminder,
            "ap@globex.test",
            "Reminder",
            "Please pay",
        );

        notifier.deliver(&notification).unwrap();
        notifier.deliver(&notification).unwrap();

        let raw = fs::read_to_string(notifier.spool_path("acme")).unwrap();
        let lines: Vec<_> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        let message: SpooledMessage = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(message.from, "billing@acme.test");
        assert_eq!(message.to, "ap@globex.test");
    }

    #[test]
    fn spool_rejects_missing_recipient() {
        let dir = tempdir().unwrap();
        let notifier = SpoolNotifier::new(dir.path().to_path_buf(), "billing@acme.test");
        let notification =
            Notification::new("acme", NotificationKind::BillReminder, " ", "Bill", "Due");
        assert!(matches!(
            notifier.deliver(&notification),
            Err(CoreError::Delivery(_))
        ));
    }
}
