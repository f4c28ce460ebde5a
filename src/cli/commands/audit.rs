use tally_core::storage::BookStorage;
use tally_domain::AuditLevel;

use crate::cli::{
    context::AppContext,
    error::CliError,
    ui::{format, UiStyle},
};

pub(super) fn cmd_audit(ctx: &AppContext, style: &UiStyle, limit: usize) -> Result<(), CliError> {
    let entries = ctx.storage.read_audit(limit)?;
    if entries.is_empty() {
        println!("Audit log is empty.");
        return Ok(());
    }
    for entry in entries {
        let level = format!("{:<5}", entry.level.to_string());
        let level = match entry.level {
            AuditLevel::Info => level,
            AuditLevel::Warning => style.warning(&level),
            AuditLevel::Error => style.error(&level),
        };
        println!(
            "{} {} {:<12} {:<18} {}",
            format::timestamp(&entry.at),
            level,
            entry.tenant.as_deref().unwrap_or("-"),
            entry.job,
            entry.message
        );
    }
    Ok(())
}
