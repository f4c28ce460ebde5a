//! Drives the lifecycle jobs across every tenant in storage.

use chrono::NaiveDate;

use tally_domain::{AuditEntry, AuditLevel, Book, LifecyclePolicy};

use crate::{
    dispatch::dispatch_outbox,
    jobs::{JobContext, JobKind, JobOutcome},
    notify::Notifier,
    storage::BookStorage,
    tenant_service::TenantService,
    CoreError,
};

const RUNNER_JOB: &str = "runner";

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub today: NaiveDate,
    /// Restricts the run to one tenant slug.
    pub tenant: Option<String>,
    /// Jobs to run; empty means all, always in [`JobKind::ALL`] order.
    pub jobs: Vec<JobKind>,
    /// Runs on a copy: nothing is saved, dispatched or audited.
    pub dry_run: bool,
}

impl RunOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            tenant: None,
            jobs: Vec::new(),
            dry_run: false,
        }
    }

    fn selected_jobs(&self) -> Vec<JobKind> {
        JobKind::ALL
            .into_iter()
            .filter(|kind| self.jobs.is_empty() || self.jobs.contains(kind))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TenantReport {
    pub tenant: String,
    pub outcomes: Vec<JobOutcome>,
    pub delivered: usize,
    pub failed_deliveries: usize,
    pub skipped: Option<String>,
    pub error: Option<String>,
}

impl TenantReport {
    fn new(tenant: &str) -> Self {
        Self {
            tenant: tenant.to_string(),
            ..Self::default()
        }
    }

    pub fn transition_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.transitions.len()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub today: NaiveDate,
    pub dry_run: bool,
    pub tenants: Vec<TenantReport>,
}

impl RunReport {
    pub fn transition_count(&self) -> usize {
        self.tenants.iter().map(TenantReport::transition_count).sum()
    }

    pub fn failures(&self) -> usize {
        self.tenants.iter().filter(|t| t.error.is_some()).count()
    }
}

/// Runs the selected jobs tenant by tenant, isolating failures per tenant.
pub struct JobRunner<'a> {
    storage: &'a dyn BookStorage,
    notifier: &'a dyn Notifier,
    default_policy: LifecyclePolicy,
    max_delivery_attempts: u32,
}

impl<'a> JobRunner<'a> {
    pub fn new(
        storage: &'a dyn BookStorage,
        notifier: &'a dyn Notifier,
        default_policy: LifecyclePolicy,
        max_delivery_attempts: u32,
    ) -> Self {
        Self {
            storage,
            notifier,
            default_policy,
            max_delivery_attempts,
        }
    }

    /// Fails only when the tenant list cannot be read or the requested tenant does not exist.
    pub fn run(&self, options: &RunOptions) -> Result<RunReport, CoreError> {
        let tenants = match options.tenant.as_deref() {
            Some(slug) => {
                if !self.storage.tenant_exists(slug)? {
                    return Err(CoreError::TenantNotFound(slug.to_string()));
                }
                vec![slug.to_string()]
            }
            None => self.storage.list_tenants()?,
        };
        tracing::info!(
            date = %options.today,
            tenants = tenants.len(),
            dry_run = options.dry_run,
            "lifecycle run started"
        );

        let mut report = RunReport {
            today: options.today,
            dry_run: options.dry_run,
            tenants: Vec::with_capacity(tenants.len()),
        };
        for slug in tenants {
            let span = tracing::info_span!("tenant", tenant = %slug);
            let _guard = span.enter();
            let mut tenant_report = TenantReport::new(&slug);
            if let Err(err) = self.run_tenant(&slug, options, &mut tenant_report) {
                tracing::error!(error = %err, "tenant run failed");
                self.audit(
                    options,
                    AuditEntry::new(RUNNER_JOB, AuditLevel::Error, err.to_string())
                        .for_tenant(slug.clone()),
                );
                tenant_report.error = Some(err.to_string());
            }
            report.tenants.push(tenant_report);
        }

        tracing::info!(
            transitions = report.transition_count(),
            failures = report.failures(),
            "lifecycle run finished"
        );
        Ok(report)
    }

    fn run_tenant(
        &self,
        slug: &str,
        options: &RunOptions,
        report: &mut TenantReport,
    ) -> Result<(), CoreError> {
        let mut book = self.storage.load_book(slug)?;
        let ctx = JobContext::new(
            options.today,
            TenantService::effective_policy(&book, &self.default_policy),
        );

        for kind in options.selected_jobs() {
            if kind != JobKind::Subscriptions && !book.tenant.is_serviceable() {
                let reason = format!("subscription {}", book.tenant.subscription.status);
                tracing::warn!(%reason, "tenant skipped");
                self.audit(
                    options,
                    AuditEntry::new(RUNNER_JOB, AuditLevel::Warning, format!("skipped: {reason}"))
                        .for_tenant(slug),
                );
                report.skipped = Some(reason);
                break;
            }
            let outcome = kind.job().run(&mut book, &ctx)?;
            for transition in &outcome.transitions {
                self.audit(
                    options,
                    AuditEntry::new(kind.name(), AuditLevel::Info, transition.to_string())
                        .for_tenant(slug)
                        .about(transition.entity_id),
                );
            }
            report.outcomes.push(outcome);
        }

        if options.dry_run {
            return Ok(());
        }
        self.storage.save_book(&book)?;
        self.dispatch(&mut book, options, report)
    }

    /// Delivers the outbox after the transitions are persisted, then saves delivery state.
    fn dispatch(
        &self,
        book: &mut Book,
        options: &RunOptions,
        report: &mut TenantReport,
    ) -> Result<(), CoreError> {
        if book.pending_notifications() == 0 {
            return Ok(());
        }
        let summary = dispatch_outbox(book, self.notifier, self.max_delivery_attempts);
        for problem in &summary.problems {
            self.audit(options, problem.clone());
        }
        report.delivered = summary.delivered;
        report.failed_deliveries = summary.failed;
        self.storage.save_book(book)
    }

    fn audit(&self, options: &RunOptions, entry: AuditEntry) {
        if options.dry_run {
            return;
        }
        if let Err(err) = self.storage.append_audit(&entry) {
            tracing::error!(error = %err, message = %entry.message, "audit write failed");
        }
    }
}
