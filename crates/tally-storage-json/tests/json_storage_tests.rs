use std::fs;

use chrono::NaiveDate;
use tally_core::{storage::BookStorage, CoreError, TenantService};
use tally_domain::{AuditEntry, AuditLevel, Book, Subscription, CURRENT_SCHEMA_VERSION};
use tally_storage_json::{load_book_from_path, save_book_to_path, JsonBookStorage, StoragePaths};
use tempfile::tempdir;

fn paths(root: &std::path::Path) -> StoragePaths {
    StoragePaths {
        data_root: root.join("data"),
        backup_root: root.join("backups"),
    }
}

fn book(name: &str) -> Book {
    let paid_through = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
    TenantService::create(name, "EUR", "ops@example.test", Subscription::active("pro", paid_through))
        .expect("create tenant")
}

#[test]
fn json_storage_can_save_and_load_book() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBookStorage::new(paths(dir.path())).expect("create storage");

    let book = book("Storage Test");
    storage.save_book(&book).expect("save book");
    let loaded = storage.load_book("storage_test").expect("load book");

    assert_eq!(loaded.tenant.name, "Storage Test");
    assert_eq!(loaded.tenant.currency, "EUR");
    let path = storage.book_path("storage_test");
    assert_eq!(path, dir.path().join("data/books/storage_test.json"));
    assert!(path.exists());
    assert_eq!(storage.list_tenants().unwrap(), vec!["storage_test".to_string()]);
    assert!(storage.tenant_exists("storage_test").unwrap());
}

#[test]
fn json_storage_reports_missing_tenants() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBookStorage::new(paths(dir.path())).expect("create storage");

    assert!(matches!(
        storage.load_book("ghost"),
        Err(CoreError::TenantNotFound(slug)) if slug == "ghost"
    ));
    assert!(storage.delete_book("ghost").is_err());
    assert!(storage.list_tenants().unwrap().is_empty());
}

#[test]
fn json_storage_creates_and_restores_backups() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBookStorage::new(paths(dir.path())).expect("create storage");

    let mut book = book("Backup Test");
    storage.save_book(&book).expect("save book");
    let info = storage
        .backup_book(&book, Some("before rename"))
        .expect("create backup");
    assert!(info.id.starts_with("backup_test_"));
    assert!(info.id.ends_with("_before-rename.json"));
    assert_eq!(
        info.path.parent().map(|p| p.to_path_buf()).unwrap_or_default(),
        dir.path().join("backups/backup_test")
    );

    TenantService::rename(&mut book, "Renamed").unwrap();
    storage.save_book(&book).expect("save renamed");

    let backups = storage.list_backups("backup_test").expect("list backups");
    assert!(backups.iter().any(|entry| entry.id == info.id));

    let restored = storage.restore_backup(&info).expect("restore backup");
    assert_eq!(restored.tenant.name, "Backup Test");
    let reloaded = storage.load_book("backup_test").unwrap();
    assert_eq!(reloaded.tenant.name, "Backup Test");
}

#[test]
fn json_storage_keeps_every_prior_version_across_quick_saves() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBookStorage::new(paths(dir.path())).expect("create storage");

    let mut book = book("Acme");
    storage.save_book(&book).expect("initial save");
    TenantService::rename(&mut book, "V2").unwrap();
    storage.save_book(&book).expect("second save");
    TenantService::rename(&mut book, "V3").unwrap();
    storage.save_book(&book).expect("third save");

    let backups = storage.list_backups("acme").expect("list backups");
    assert_eq!(backups.len(), 2);
    let names: Vec<String> = backups
        .iter()
        .map(|entry| load_book_from_path(&entry.path).unwrap().tenant.name)
        .collect();
    assert_eq!(names, vec!["V2".to_string(), "Acme".to_string()]);

    let oldest = backups.last().unwrap();
    let restored = storage.restore_backup(oldest).expect("restore original");
    assert_eq!(restored.tenant.name, "Acme");
    assert_eq!(storage.load_book("acme").unwrap().tenant.name, "Acme");
}

#[test]
fn json_storage_prunes_backups_beyond_retention() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBookStorage::with_retention(paths(dir.path()), 2).expect("create storage");
    let book = book("Pruned");

    for note in ["one", "two", "three", "four"] {
        storage.backup_book(&book, Some(note)).expect("backup");
    }
    assert_eq!(storage.list_backups("pruned").unwrap().len(), 2);
}

#[test]
fn json_storage_appends_and_reads_audit_tail() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBookStorage::new(paths(dir.path())).expect("create storage");

    for idx in 0..5 {
        let entry = AuditEntry::new("overdue-documents", AuditLevel::Info, format!("entry {idx}"))
            .for_tenant("acme");
        storage.append_audit(&entry).expect("append");
    }
    let tail = storage.read_audit(2).expect("read audit");
    let messages: Vec<_> = tail.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["entry 3", "entry 4"]);

    let raw = fs::read_to_string(dir.path().join("data/audit.jsonl")).unwrap();
    assert_eq!(raw.lines().count(), 5);
}

#[test]
fn json_storage_refuses_books_from_newer_schema() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("export.json");
    let mut book = book("Future");
    save_book_to_path(&book, &path).expect("export");
    assert_eq!(load_book_from_path(&path).unwrap().schema_version, CURRENT_SCHEMA_VERSION);

    book.schema_version = CURRENT_SCHEMA_VERSION + 1;
    save_book_to_path(&book, &path).expect("export");
    assert!(matches!(load_book_from_path(&path), Err(CoreError::Storage(_))));
}

#[test]
fn json_storage_lists_tenant_metadata_by_name() {
    let dir = tempdir().expect("tempdir");
    let storage = JsonBookStorage::new(paths(dir.path())).expect("create storage");
    storage.save_book(&book("Zeta")).unwrap();
    storage.save_book(&book("Alpha")).unwrap();

    let rows = storage.list_tenant_metadata().unwrap();
    let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Zeta"]);
    assert_eq!(rows[0].open_balance, 0.0);
}
