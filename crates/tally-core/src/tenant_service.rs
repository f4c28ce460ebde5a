//! Tenant onboarding and subscription administration.

use chrono::NaiveDate;

use tally_domain::{Book, LifecyclePolicy, Subscription, SubscriptionStatus, Tenant};

use crate::{client_service::validate_email, CoreError};

/// Provides constructor and mutation helpers for tenant [`Book`]s.
pub struct TenantService;

impl TenantService {
    /// Creates an empty book for a new tenant.
    pub fn create(
        name: &str,
        currency: &str,
        contact_email: &str,
        subscription: Subscription,
    ) -> Result<Book, CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("tenant name must not be empty".into()));
        }
        validate_currency(currency)?;
        validate_email(contact_email)?;
        Ok(Book::new(Tenant::new(
            name.trim(),
            currency,
            contact_email.trim(),
            subscription,
        )))
    }

    /// Renames the tenant. The slug is the storage key and stays unchanged.
    pub fn rename(book: &mut Book, name: &str) -> Result<(), CoreError> {
        if name.trim().is_empty() {
            return Err(CoreError::Validation("tenant name must not be empty".into()));
        }
        book.tenant.name = name.trim().to_string();
        book.touch();
        Ok(())
    }

    /// Changes the billing currency; refused once documents have been issued.
    pub fn set_currency(book: &mut Book, currency: &str) -> Result<(), CoreError> {
        validate_currency(currency)?;
        if book.documents.iter().any(|d| d.number.is_some()) {
            return Err(CoreError::InvalidOperation(
                "currency cannot change after documents were issued".into(),
            ));
        }
        let code = currency.trim().to_uppercase();
        for doc in &mut book.documents {
            doc.currency = code.clone();
        }
        book.tenant.currency = code;
        book.touch();
        Ok(())
    }

    pub fn set_subscription(book: &mut Book, subscription: Subscription) {
        book.tenant.subscription = subscription;
        book.touch();
    }

    /// Records a subscription payment, reactivating past-due or suspended tenants.
    pub fn record_subscription_payment(
        book: &mut Book,
        paid_through: NaiveDate,
    ) -> Result<(), CoreError> {
        let subscription = &mut book.tenant.subscription;
        if subscription.status == SubscriptionStatus::Cancelled {
            return Err(CoreError::InvalidOperation(
                "cancelled subscriptions cannot be renewed".into(),
            ));
        }
        subscription.status = SubscriptionStatus::Active;
        subscription.paid_through = Some(paid_through);
        subscription.trial_ends_on = None;
        subscription.past_due_since = None;
        subscription.status_changed_on = None;
        book.touch();
        Ok(())
    }

    pub fn cancel(book: &mut Book) {
        book.tenant.subscription.status = SubscriptionStatus::Cancelled;
        book.touch();
    }

    /// Sets or clears the tenant-specific lifecycle policy.
    pub fn set_policy(book: &mut Book, policy: Option<LifecyclePolicy>) -> Result<(), CoreError> {
        if let Some(policy) = policy.as_ref() {
            policy.validate()?;
        }
        book.tenant.policy = policy;
        book.touch();
        Ok(())
    }

    /// Tenant override when present, otherwise the installation default.
    pub fn effective_policy(book: &Book, default: &LifecyclePolicy) -> LifecyclePolicy {
        book.tenant
            .policy
            .clone()
            .unwrap_or_else(|| default.clone())
    }
}

pub(crate) fn validate_currency(code: &str) -> Result<(), CoreError> {
    let code = code.trim();
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "`{code}` is not a three-letter currency code"
        )))
    }
}
