//! Tenant accounts, subscriptions, and the collection policy applied to their books.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub currency: String,
    pub contact_email: String,
    pub subscription: Subscription,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<LifecyclePolicy>,
    pub created_at: DateTime<Utc>,
}

impl Tenant {
    pub fn new(
        name: impl Into<String>,
        currency: impl Into<String>,
        contact_email: impl Into<String>,
        subscription: Subscription,
    ) -> Self {
        let name = name.into();
        Self {
            id: Uuid::new_v4(),
            slug: canonical_slug(&name),
            name,
            currency: currency.into().trim().to_uppercase(),
            contact_email: contact_email.into(),
            subscription,
            policy: None,
            created_at: Utc::now(),
        }
    }

    /// Suspended and cancelled tenants are left untouched by the lifecycle jobs.
    pub fn is_serviceable(&self) -> bool {
        !matches!(
            self.subscription.status,
            SubscriptionStatus::Suspended | SubscriptionStatus::Cancelled
        )
    }
}

impl Identifiable for Tenant {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for Tenant {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscription {
    pub plan: String,
    pub status: SubscriptionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trial_ends_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_through: Option<NaiveDate>,
    /// Date the subscription fell into `PastDue`; grace is counted from here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub past_due_since: Option<NaiveDate>,
    /// Run date of the last automatic status change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_changed_on: Option<NaiveDate>,
}

impl Subscription {
    pub fn trial(plan: impl Into<String>, ends_on: NaiveDate) -> Self {
        Self {
            plan: plan.into(),
            status: SubscriptionStatus::Trial,
            trial_ends_on: Some(ends_on),
            paid_through: None,
            past_due_since: None,
            status_changed_on: None,
        }
    }

    pub fn active(plan: impl Into<String>, paid_through: NaiveDate) -> Self {
        Self {
            plan: plan.into(),
            status: SubscriptionStatus::Active,
            trial_ends_on: None,
            paid_through: Some(paid_through),
            past_due_since: None,
            status_changed_on: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Trial,
    Active,
    PastDue,
    Suspended,
    Cancelled,
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubscriptionStatus::Trial => "Trial",
            SubscriptionStatus::Active => "Active",
            SubscriptionStatus::PastDue => "Past due",
            SubscriptionStatus::Suspended => "Suspended",
            SubscriptionStatus::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
/// Penalty added to an invoice when it first becomes overdue.
pub enum LateFee {
    #[default]
    None,
    Flat(f64),
    /// Percentage of the outstanding balance, e.g. `5.0` for 5%.
    Percent(f64),
}

impl LateFee {
    pub fn amount_for(&self, outstanding: f64) -> f64 {
        match *self {
            LateFee::None => 0.0,
            LateFee::Flat(amount) => round_money(amount),
            LateFee::Percent(rate) => round_money(outstanding * rate / 100.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Day thresholds and fees driving the overdue and bill ladders.
pub struct LifecyclePolicy {
    #[serde(default)]
    pub late_fee: LateFee,
    #[serde(default)]
    pub late_fee_after_days: u32,
    #[serde(default = "LifecyclePolicy::default_reminder_after_days")]
    pub reminder_after_days: u32,
    #[serde(default = "LifecyclePolicy::default_termination_after_days")]
    pub termination_after_days: u32,
    #[serde(default = "LifecyclePolicy::default_bill_reminder_days_before")]
    pub bill_reminder_days_before: u32,
    #[serde(default = "LifecyclePolicy::default_subscription_grace_days")]
    pub subscription_grace_days: u32,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            late_fee: LateFee::None,
            late_fee_after_days: 0,
            reminder_after_days: Self::default_reminder_after_days(),
            termination_after_days: Self::default_termination_after_days(),
            bill_reminder_days_before: Self::default_bill_reminder_days_before(),
            subscription_grace_days: Self::default_subscription_grace_days(),
        }
    }
}

impl LifecyclePolicy {
    pub fn default_reminder_after_days() -> u32 {
        7
    }

    pub fn default_termination_after_days() -> u32 {
        14
    }

    pub fn default_bill_reminder_days_before() -> u32 {
        3
    }

    pub fn default_subscription_grace_days() -> u32 {
        7
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        match self.late_fee {
            LateFee::Flat(amount) if amount < 0.0 || !amount.is_finite() => {
                return Err(PolicyError::NegativeFee)
            }
            LateFee::Percent(rate) if !(0.0..=100.0).contains(&rate) => {
                return Err(PolicyError::PercentOutOfRange)
            }
            _ => {}
        }
        if self.late_fee_after_days >= self.reminder_after_days
            || self.reminder_after_days >= self.termination_after_days
        {
            return Err(PolicyError::ThresholdsNotIncreasing);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Errors raised by [`LifecyclePolicy::validate`].
pub enum PolicyError {
    NegativeFee,
    PercentOutOfRange,
    ThresholdsNotIncreasing,
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::NegativeFee => f.write_str("late fee must not be negative"),
            PolicyError::PercentOutOfRange => {
                f.write_str("late fee percentage must be between 0 and 100")
            }
            PolicyError::ThresholdsNotIncreasing => f.write_str(
                "late fee, reminder and termination thresholds must be strictly increasing",
            ),
        }
    }
}

impl std::error::Error for PolicyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_uses_zero_seven_fourteen() {
        let policy = LifecyclePolicy::default();
        assert_eq!(policy.late_fee_after_days, 0);
        assert_eq!(policy.reminder_after_days, 7);
        assert_eq!(policy.termination_after_days, 14);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unordered_thresholds() {
        let policy = LifecyclePolicy {
            reminder_after_days: 20,
            ..LifecyclePolicy::default()
        };
        assert_eq!(policy.validate(), Err(PolicyError::ThresholdsNotIncreasing));
    }

    #[test]
    fn percent_late_fee_is_rounded() {
        assert_eq!(LateFee::Percent(5.0).amount_for(250.0), 12.5);
        assert_eq!(LateFee::Flat(25.0).amount_for(10.0), 25.0);
        assert_eq!(LateFee::None.amount_for(10.0), 0.0);
    }

    #[test]
    fn policy_deserializes_with_defaults() {
        let policy: LifecyclePolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, LifecyclePolicy::default());
    }
}
