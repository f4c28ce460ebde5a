use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationKind {
    LateFeeApplied,
    PaymentReminder,
    TerminationWarning,
    BillGenerated,
    BillReminder,
    BillOverdue,
    PromiseBroken,
    SubscriptionPastDue,
    SubscriptionSuspended,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotificationKind::LateFeeApplied => "late_fee_applied",
            NotificationKind::PaymentReminder => "payment_reminder",
            NotificationKind::TerminationWarning => "termination_warning",
            NotificationKind::BillGenerated => "bill_generated",
            NotificationKind::BillReminder => "bill_reminder",
            NotificationKind::BillOverdue => "bill_overdue",
            NotificationKind::PromiseBroken => "promise_broken",
            NotificationKind::SubscriptionPastDue => "subscription_past_due",
            NotificationKind::SubscriptionSuspended => "subscription_suspended",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DeliveryState {
    #[default]
    Pending,
    Delivered,
    Failed,
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DeliveryState::Pending => "Pending",
            DeliveryState::Delivered => "Delivered",
            DeliveryState::Failed => "Failed",
        };
        f.write_str(label)
    }
}

/// Outbox message queued by a lifecycle transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub tenant: String,
    pub kind: NotificationKind,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub state: DeliveryState,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl Notification {
    pub fn new(
        tenant: impl Into<String>,
        kind: NotificationKind,
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant: tenant.into(),
            kind,
            recipient: recipient.into(),
            subject: subject.into(),
            body: body.into(),
            entity_id: None,
            created_at: Utc::now(),
            state: DeliveryState::Pending,
            attempts: 0,
            last_error: None,
        }
    }

    pub fn about(mut self, entity_id: Uuid) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    pub fn is_pending(&self) -> bool {
        self.state == DeliveryState::Pending
    }
}

impl Identifiable for Notification {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Displayable for Notification {
    fn display_label(&self) -> String {
        format!("{} -> {} [{}]", self.kind, self.recipient, self.state)
    }
}
