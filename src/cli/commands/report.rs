use tally_core::{storage::BookStorage, AgingBucket, ReportService};
use tally_domain::Book;

use crate::cli::{
    args::{ReportArgs, ReportKind},
    context::AppContext,
    error::CliError,
    ui::{format, Table, TableColumn, UiStyle},
};

use super::tenant::print_or_empty;

pub(super) fn cmd_report(ctx: &AppContext, style: &UiStyle, args: ReportArgs) -> Result<(), CliError> {
    let slug = ctx.resolve_tenant(&args.tenant)?;
    let book = ctx.storage.load_book(&slug)?;
    let as_of = ctx.today(args.date);
    match args.kind {
        ReportKind::Aging => aging(&book, as_of, style),
        ReportKind::Payables => payables(&book, as_of, args.horizon, style),
        ReportKind::Overdue => overdue(&book, as_of, style),
    }
    Ok(())
}

fn aging(book: &Book, as_of: chrono::NaiveDate, style: &UiStyle) {
    let report = ReportService::aging(book, as_of);
    let mut columns = vec![TableColumn::new("Client")];
    columns.extend(AgingBucket::ALL.iter().map(|b| TableColumn::numeric(b.label())));
    columns.push(TableColumn::numeric("Total"));
    let mut table = Table::new(
        Some(&format!("Receivables aging as of {as_of} ({})", report.currency)),
        columns,
    );
    for client in &report.per_client {
        let mut row = vec![client.name.clone()];
        row.extend(client.buckets.iter().map(|v| format::amount(*v)));
        row.push(format::amount(client.total));
        table.add_row(row);
    }
    if table.is_empty() {
        println!("No outstanding receivables.");
        return;
    }
    let mut totals = vec!["All clients".to_string()];
    totals.extend(report.buckets.iter().map(|v| format::amount(*v)));
    totals.push(format::amount(report.total));
    table.add_row(totals);
    table.print(style);
}

fn payables(book: &Book, as_of: chrono::NaiveDate, horizon: u32, style: &UiStyle) {
    let summary = ReportService::payables(book, as_of, horizon);
    let currency = &book.tenant.currency;
    let mut table = Table::new(
        Some(&format!("Open payables as of {as_of}")),
        vec![
            TableColumn::new("Bill"),
            TableColumn::new("Payee"),
            TableColumn::new("Due"),
            TableColumn::numeric("Balance"),
            TableColumn::new("State"),
        ],
    );
    for row in &summary.rows {
        table.add_row(vec![
            row.name.clone(),
            row.payee.clone(),
            row.due_date.to_string(),
            format::amount(row.balance),
            if row.overdue { "overdue" } else { "open" }.to_string(),
        ]);
    }
    print_or_empty(&table, style, "No open bills.");
    println!(
        "Open: {}  Due within {} days: {}  Overdue: {}",
        format::money(summary.open_total, currency),
        summary.horizon_days,
        format::money(summary.due_soon_total, currency),
        format::money(summary.overdue_total, currency),
    );
}

fn overdue(book: &Book, as_of: chrono::NaiveDate, style: &UiStyle) {
    let rows = ReportService::overdue_register(book, as_of);
    let mut table = Table::new(
        Some(&format!("Overdue invoices as of {as_of} ({})", book.tenant.currency)),
        vec![
            TableColumn::new("Invoice"),
            TableColumn::new("Client"),
            TableColumn::new("Due"),
            TableColumn::numeric("Days"),
            TableColumn::new("Stage"),
            TableColumn::numeric("Late fee"),
            TableColumn::numeric("Balance"),
        ],
    );
    for row in rows {
        table.add_row(vec![
            row.number,
            row.client,
            row.due_date.to_string(),
            row.days_overdue.to_string(),
            row.stage.to_string(),
            format::amount(row.late_fee),
            format::amount(row.balance),
        ]);
    }
    print_or_empty(&table, style, "No overdue invoices.");
}
