use chrono::Duration;

use tally_core::{storage::book_warnings, storage::BookStorage, CoreError, TenantService};
use tally_domain::{canonical_slug, Subscription};
use tally_storage_json::{load_book_from_path, save_book_to_path};

use crate::cli::{
    args::TenantCommand,
    context::AppContext,
    error::CliError,
    ui::{format, Table, TableColumn, UiStyle},
};

const TRIAL_PLAN: &str = "standard";

pub(super) fn cmd_tenant(
    ctx: &AppContext,
    style: &UiStyle,
    command: TenantCommand,
) -> Result<(), CliError> {
    match command {
        TenantCommand::List => list(ctx, style),
        TenantCommand::Add {
            name,
            currency,
            email,
            trial_days,
        } => {
            let currency = currency.unwrap_or_else(|| ctx.config.default_currency.clone());
            let trial_end = ctx.today(None) + Duration::days(i64::from(trial_days));
            let book = TenantService::create(
                &name,
                &currency,
                &email,
                Subscription::trial(TRIAL_PLAN, trial_end),
            )?;
            if ctx.storage.tenant_exists(book.slug())? {
                return Err(CoreError::TenantExists(book.slug().to_string()).into());
            }
            ctx.storage.save_book(&book)?;
            tracing::info!(tenant = %book.slug(), "tenant created");
            println!(
                "Created tenant `{}` ({}), trial until {}",
                book.slug(),
                book.tenant.currency,
                trial_end
            );
            Ok(())
        }
        TenantCommand::Import { path, force } => {
            let book = load_book_from_path(&path)?;
            let slug = book.slug().to_string();
            let canonical = canonical_slug(&slug);
            if slug.is_empty() || canonical != slug {
                return Err(CliError::InvalidArguments(format!(
                    "book slug `{slug}` is not canonical (expected `{canonical}`)"
                )));
            }
            if ctx.storage.tenant_exists(&slug)? {
                if !force {
                    return Err(CoreError::TenantExists(slug).into());
                }
                let existing = ctx.storage.load_book(&slug)?;
                ctx.storage.backup_book(&existing, Some("before import"))?;
            }
            for warning in book_warnings(&book) {
                println!("{}", style.warning(&format!("warning: {warning}")));
            }
            ctx.storage.save_book(&book)?;
            tracing::info!(tenant = %slug, path = %path.display(), "book imported");
            println!("Imported tenant `{slug}` from {}", path.display());
            Ok(())
        }
        TenantCommand::Export { slug, path } => {
            let slug = ctx.resolve_tenant(&slug)?;
            let book = ctx.storage.load_book(&slug)?;
            save_book_to_path(&book, &path)?;
            println!("Exported `{slug}` to {}", path.display());
            Ok(())
        }
        TenantCommand::Backup { slug, note } => {
            let slug = ctx.resolve_tenant(&slug)?;
            let book = ctx.storage.load_book(&slug)?;
            let info = ctx.storage.backup_book(&book, note.as_deref())?;
            println!("Backup written to {}", info.path.display());
            Ok(())
        }
        TenantCommand::Backups { slug } => {
            let slug = ctx.resolve_tenant(&slug)?;
            let mut table = Table::new(
                Some(&format!("Backups of {slug}")),
                vec![
                    TableColumn::new("Backup"),
                    TableColumn::new("Created"),
                    TableColumn::numeric("Size"),
                ],
            );
            for entry in ctx.storage.list_backup_metadata(&slug)? {
                table.add_row(vec![
                    entry.name,
                    entry
                        .created_at
                        .map(|at| format::timestamp(&at))
                        .unwrap_or_else(|| "-".into()),
                    format!("{} B", entry.size_bytes),
                ]);
            }
            print_or_empty(&table, style, "No backups yet.");
            Ok(())
        }
        TenantCommand::Restore { slug, backup } => {
            let slug = ctx.resolve_tenant(&slug)?;
            let info = ctx
                .storage
                .list_backups(&slug)?
                .into_iter()
                .find(|info| info.id == backup)
                .ok_or_else(|| {
                    CliError::InvalidArguments(format!("backup `{backup}` not found for `{slug}`"))
                })?;
            ctx.storage.restore_backup(&info)?;
            tracing::info!(tenant = %slug, backup = %info.id, "book restored");
            println!("Restored `{slug}` from {}", info.id);
            Ok(())
        }
        TenantCommand::Check { slug } => {
            let slug = ctx.resolve_tenant(&slug)?;
            let book = ctx.storage.load_book(&slug)?;
            let warnings = book_warnings(&book);
            if warnings.is_empty() {
                println!("No problems found in `{slug}`.");
            }
            for warning in warnings {
                println!("{}", style.warning(&format!("warning: {warning}")));
            }
            Ok(())
        }
    }
}

fn list(ctx: &AppContext, style: &UiStyle) -> Result<(), CliError> {
    let mut table = Table::new(
        Some("Tenants"),
        vec![
            TableColumn::new("Slug"),
            TableColumn::new("Name"),
            TableColumn::new("Status"),
            TableColumn::numeric("Clients"),
            TableColumn::numeric("Documents"),
            TableColumn::numeric("Open balance"),
            TableColumn::numeric("Pending"),
        ],
    );
    for meta in ctx.storage.list_tenant_metadata()? {
        table.add_row(vec![
            meta.slug,
            meta.name,
            meta.status.to_string(),
            meta.client_count.to_string(),
            meta.document_count.to_string(),
            format::money(meta.open_balance, &meta.currency),
            meta.pending_notifications.to_string(),
        ]);
    }
    print_or_empty(&table, style, "No tenants yet. Use `tenant add` to create one.");
    Ok(())
}

pub(super) fn print_or_empty(table: &Table, style: &UiStyle, empty: &str) {
    if table.is_empty() {
        println!("{empty}");
    } else {
        table.print(style);
    }
}
