use std::str::FromStr;

use tally_core::{jobs::JobKind, JobRunner, RunOptions, RunReport};

use crate::cli::{
    args::RunArgs,
    context::{suggest, AppContext},
    error::CliError,
    ui::{Table, TableColumn, UiStyle},
};

pub(super) fn cmd_run(ctx: &AppContext, style: &UiStyle, args: RunArgs) -> Result<(), CliError> {
    let jobs = parse_jobs(&args.jobs)?;
    let tenant = args
        .tenant
        .as_deref()
        .map(|slug| ctx.resolve_tenant(slug))
        .transpose()?;
    let options = RunOptions {
        today: ctx.today(args.date),
        tenant,
        jobs,
        dry_run: args.dry_run,
    };

    let runner = JobRunner::new(
        &ctx.storage,
        &ctx.notifier,
        ctx.config.default_policy.clone(),
        ctx.config.max_delivery_attempts,
    );
    let report = runner.run(&options)?;
    print_report(&report, style);

    match report.failures() {
        0 => Ok(()),
        failed => Err(CliError::RunFailures(failed)),
    }
}

fn parse_jobs(names: &[String]) -> Result<Vec<JobKind>, CliError> {
    let known: Vec<String> = JobKind::ALL.iter().map(|k| k.name().to_string()).collect();
    names
        .iter()
        .map(|name| {
            JobKind::from_str(name).map_err(|_| {
                let hint = suggest(&name.to_lowercase(), &known)
                    .map(|s| format!(" (did you mean `{s}`?)"))
                    .unwrap_or_default();
                CliError::InvalidArguments(format!(
                    "unknown job `{name}`{hint}; expected one of: {}",
                    known.join(", ")
                ))
            })
        })
        .collect()
}

fn print_report(report: &RunReport, style: &UiStyle) {
    let title = if report.dry_run {
        format!("Lifecycle run for {} (dry run, nothing saved)", report.today)
    } else {
        format!("Lifecycle run for {}", report.today)
    };
    let mut table = Table::new(
        Some(&title),
        vec![
            TableColumn::new("Tenant"),
            TableColumn::numeric("Changes"),
            TableColumn::numeric("Delivered"),
            TableColumn::numeric("Failed"),
            TableColumn::new("Status"),
        ],
    );
    for tenant in &report.tenants {
        let status = match (&tenant.error, &tenant.skipped) {
            (Some(err), _) => format!("error: {err}"),
            (None, Some(reason)) => format!("skipped: {reason}"),
            (None, None) => "ok".to_string(),
        };
        table.add_row(vec![
            tenant.tenant.clone(),
            tenant.transition_count().to_string(),
            tenant.delivered.to_string(),
            tenant.failed_deliveries.to_string(),
            status,
        ]);
    }
    table.print(style);

    for tenant in &report.tenants {
        for outcome in tenant.outcomes.iter().filter(|o| !o.is_empty()) {
            for transition in &outcome.transitions {
                println!("  {} [{}] {}", tenant.tenant, outcome.job, transition);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_jobs_suggests_close_names() {
        let err = parse_jobs(&["overdue-document".to_string()]).unwrap_err();
        assert!(err.to_string().contains("did you mean `overdue-documents`"));
        assert_eq!(
            parse_jobs(&["recurring_bills".to_string()]).unwrap(),
            vec![JobKind::RecurringBills]
        );
    }
}
