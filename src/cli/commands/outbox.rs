use tally_core::storage::BookStorage;

use crate::cli::{
    context::AppContext,
    error::CliError,
    ui::{format, Table, TableColumn, UiStyle},
};

use super::tenant::print_or_empty;

pub(super) fn cmd_outbox(ctx: &AppContext, style: &UiStyle, tenant: &str) -> Result<(), CliError> {
    let slug = ctx.resolve_tenant(tenant)?;
    let book = ctx.storage.load_book(&slug)?;
    let mut table = Table::new(
        Some(&format!("Outbox of {slug}")),
        vec![
            TableColumn::new("Created"),
            TableColumn::new("Kind"),
            TableColumn::new("Recipient"),
            TableColumn::new("State"),
            TableColumn::numeric("Tries"),
            TableColumn::new("Subject"),
        ],
    );
    for notification in book.outbox.iter().rev() {
        table.add_row(vec![
            format::timestamp(&notification.created_at),
            notification.kind.to_string(),
            notification.recipient.clone(),
            notification.state.to_string(),
            notification.attempts.to_string(),
            format::truncate(&notification.subject, 48),
        ]);
    }
    print_or_empty(&table, style, "Outbox is empty.");
    Ok(())
}
