#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use chrono::NaiveDate;
use tally_core::{ClientService, DocumentService, TenantService};
use tally_domain::{Book, Client, DocumentKind, LineItem, Subscription};
use tally_storage_json::save_book_to_path;
use tempfile::TempDir;

pub const BIN_NAME: &str = "billing_core_cli";

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// CLI command bound to an isolated home directory with colour and ambient env cleared.
pub fn cli(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env("BILLING_CORE_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("BILLING_CORE_DATE")
        .env_remove("RUST_LOG");
    cmd
}

/// Book for `Acme` with client `Globex` and invoice INV-0001 of 100.00 due 2025-01-31.
pub fn acme_with_invoice() -> Book {
    let mut book = TenantService::create(
        "Acme",
        "EUR",
        "billing@acme.test",
        Subscription::active("pro", date(2030, 1, 1)),
    )
    .expect("create tenant");
    let client_id =
        ClientService::add(&mut book, Client::new("Globex", "ap@globex.test")).expect("client");
    let doc_id =
        DocumentService::create_draft(&mut book, DocumentKind::Invoice, client_id).expect("draft");
    DocumentService::add_line(&mut book, doc_id, LineItem::new("Consulting", 1.0, 100.0))
        .expect("line");
    DocumentService::issue(&mut book, doc_id, date(2025, 1, 1), 30).expect("issue");
    book
}

/// Writes `book` as an export file inside `dir` and returns its path.
pub fn write_export(dir: &Path, book: &Book) -> PathBuf {
    let path = dir.join(format!("{}-export.json", book.slug()));
    save_book_to_path(book, &path).expect("write export");
    path
}

pub fn temp_home() -> TempDir {
    TempDir::new().expect("create temp dir")
}
