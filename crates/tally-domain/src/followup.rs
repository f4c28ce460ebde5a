use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FollowupChannel {
    Call,
    Email,
    Visit,
    Message,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FollowupOutcome {
    NoAnswer,
    PromiseToPay,
    Disputed,
    Paid,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum FollowupState {
    #[default]
    Open,
    Kept,
    Broken,
    Closed,
}

impl fmt::Display for FollowupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FollowupState::Open => "Open",
            FollowupState::Kept => "Kept",
            FollowupState::Broken => "Broken",
            FollowupState::Closed => "Closed",
        };
        f.write_str(label)
    }
}

/// Logged collection contact about an overdue invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Followup {
    pub id: Uuid,
    pub document_id: Uuid,
    pub contact_date: NaiveDate,
    pub channel: FollowupChannel,
    pub outcome: FollowupOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promise_date: Option<NaiveDate>,
    #[serde(default)]
    pub state: FollowupState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Followup {
    pub fn new(
        document_id: Uuid,
        contact_date: NaiveDate,
        channel: FollowupChannel,
        outcome: FollowupOutcome,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_id,
            contact_date,
            channel,
            outcome,
            promise_date: None,
            state: FollowupState::Open,
            notes: None,
        }
    }

    pub fn with_promise(mut self, promise_date: NaiveDate) -> Self {
        self.promise_date = Some(promise_date);
        self
    }

    /// An open promise whose date has passed and needs resolving.
    pub fn promise_lapsed(&self, today: NaiveDate) -> bool {
        self.state == FollowupState::Open
            && self.outcome == FollowupOutcome::PromiseToPay
            && self.promise_date.is_some_and(|date| date < today)
    }
}

impl Identifiable for Followup {
    fn id(&self) -> Uuid {
        self.id
    }
}
