use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Operate the billing lifecycle batch and inspect tenant books.
#[derive(Parser, Debug)]
#[command(name = "billing_core_cli")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `config/config.json` and, unless configured otherwise, the data root.
    #[arg(long, global = true, env = "BILLING_CORE_HOME", value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Disable coloured output.
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the lifecycle jobs for every tenant (or one).
    Run(RunArgs),

    /// Manage tenant books.
    #[command(subcommand)]
    Tenant(TenantCommand),

    /// Print receivable and payable reports for a tenant.
    Report(ReportArgs),

    /// List queued and delivered notifications of a tenant.
    Outbox {
        #[arg(long)]
        tenant: String,
    },

    /// Show the most recent batch audit entries.
    Audit {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Inspect or initialise the configuration file.
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Show build metadata.
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Business date to run for (YYYY-MM-DD). Defaults to today (UTC).
    #[arg(long, env = "BILLING_CORE_DATE", value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Only process this tenant slug.
    #[arg(long)]
    pub tenant: Option<String>,

    /// Only run these jobs; repeatable. Defaults to all jobs.
    #[arg(long = "job", value_name = "JOB")]
    pub jobs: Vec<String>,

    /// Report what would change without saving, delivering or auditing.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum TenantCommand {
    /// List stored tenants.
    List,

    /// Create a tenant with an empty book.
    Add {
        name: String,
        /// ISO currency code; defaults to the configured currency.
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        email: String,
        /// Length of the trial period in days.
        #[arg(long, default_value_t = 14)]
        trial_days: u32,
    },

    /// Import a book from a JSON export.
    Import {
        path: PathBuf,
        /// Replace an existing tenant with the same slug.
        #[arg(long)]
        force: bool,
    },

    /// Export a tenant book to a JSON file.
    Export { slug: String, path: PathBuf },

    /// Write a timestamped backup of a tenant book.
    Backup {
        slug: String,
        #[arg(long)]
        note: Option<String>,
    },

    /// List backups of a tenant book, newest first.
    Backups { slug: String },

    /// Restore a tenant book from one of its backups.
    Restore { slug: String, backup: String },

    /// Check a tenant book for dangling references.
    Check { slug: String },
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[arg(value_enum)]
    pub kind: ReportKind,

    #[arg(long)]
    pub tenant: String,

    /// Reference date (YYYY-MM-DD). Defaults to today (UTC).
    #[arg(long, env = "BILLING_CORE_DATE", value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Window in days for payables falling due soon.
    #[arg(long, default_value_t = 30)]
    pub horizon: u32,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Aging,
    Payables,
    Overdue,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration.
    Show,
    /// Write the default configuration file if none exists.
    Init {
        /// Overwrite an existing file (a backup is written first).
        #[arg(long)]
        force: bool,
    },
    /// List configuration backups, newest first.
    Backups,
    /// Replace the configuration with a backup.
    Restore {
        /// Backup file name as shown by `config backups`.
        name: String,
    },
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("`{value}` is not a date in YYYY-MM-DD form"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_repeated_jobs() {
        let cli = Cli::parse_from([
            "billing_core_cli",
            "run",
            "--date",
            "2025-02-01",
            "--job",
            "overdue-documents",
            "--job",
            "promise-checks",
            "--dry-run",
        ]);
        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2025, 2, 1));
        assert_eq!(args.jobs, vec!["overdue-documents", "promise-checks"]);
        assert!(args.dry_run);
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date("01/02/2025").is_err());
    }
}
