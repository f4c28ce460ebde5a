//! Billing Core runs the daily lifecycle batch for a multi-tenant invoicing
//! service: overdue invoices, recurring payables, payment promises and
//! tenant subscriptions, plus the CLI used to operate it.

pub mod cli;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing once; `directive` overrides the default filter.
pub fn init(directive: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directive);
        tracing::debug!("Billing Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init(None);
        super::init(Some("billing_core=debug"));
    }
}
