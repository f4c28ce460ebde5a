use std::{
    cmp::Reverse,
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use tally_core::{
    storage::{BookBackupInfo, BookStorage},
    CoreError,
};
use tally_domain::{
    canonical_slug, AuditEntry, Book, SubscriptionStatus, CURRENT_SCHEMA_VERSION,
};

const BOOK_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M";
const TMP_SUFFIX: &str = "tmp";
const AUDIT_FILE: &str = "audit.jsonl";
const BOOKS_DIR: &str = "books";
const DEFAULT_RETENTION: usize = 5;

/// Filesystem locations used by [`JsonBookStorage`].
#[derive(Debug, Clone)]
pub struct StoragePaths {
    /// Holds `books/<slug>.json` and the `audit.jsonl` trail.
    pub data_root: PathBuf,
    /// Holds `<slug>/<slug>_<timestamp>.json` backups.
    pub backup_root: PathBuf,
}

impl StoragePaths {
    pub fn books_dir(&self) -> PathBuf {
        self.data_root.join(BOOKS_DIR)
    }

    pub fn audit_path(&self) -> PathBuf {
        self.data_root.join(AUDIT_FILE)
    }
}

/// Filesystem-backed JSON persistence for tenant books, their backups and the audit trail.
#[derive(Debug, Clone)]
pub struct JsonBookStorage {
    paths: StoragePaths,
    retention: usize,
}

impl JsonBookStorage {
    pub fn new(paths: StoragePaths) -> Result<Self, CoreError> {
        Self::with_retention(paths, DEFAULT_RETENTION)
    }

    pub fn with_retention(paths: StoragePaths, retention: usize) -> Result<Self, CoreError> {
        fs::create_dir_all(paths.books_dir())?;
        fs::create_dir_all(&paths.backup_root)?;
        Ok(Self {
            paths,
            retention: retention.max(1),
        })
    }

    pub fn paths(&self) -> &StoragePaths {
        &self.paths
    }

    pub fn book_path(&self, slug: &str) -> PathBuf {
        self.paths
            .books_dir()
            .join(format!("{}.{}", canonical_slug(slug), BOOK_EXTENSION))
    }

    pub fn backup_path(&self, slug: &str, backup: &str) -> PathBuf {
        self.backup_dir(slug).join(backup)
    }

    /// Summaries of every stored book, sorted by tenant name.
    pub fn list_tenant_metadata(&self) -> Result<Vec<TenantMetadata>, CoreError> {
        let mut entries = Vec::new();
        for slug in self.list_tenants()? {
            let book = self.load_book(&slug)?;
            let open_balance = book
                .documents
                .iter()
                .filter(|doc| doc.is_collectable())
                .map(|doc| doc.balance())
                .sum::<f64>();
            entries.push(TenantMetadata {
                path: self.book_path(&slug),
                slug,
                name: book.tenant.name.clone(),
                currency: book.tenant.currency.clone(),
                status: book.tenant.subscription.status,
                updated_at: book.updated_at,
                client_count: book.clients.len(),
                document_count: book.documents.len(),
                open_balance: tally_domain::round_money(open_balance),
                pending_notifications: book.pending_notifications(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    pub fn list_backup_metadata(&self, slug: &str) -> Result<Vec<BackupMetadata>, CoreError> {
        let mut rows = Vec::new();
        for entry in self.list_backups(slug)? {
            let size_bytes = fs::metadata(&entry.path)
                .map(|meta| meta.len())
                .unwrap_or(0);
            rows.push(BackupMetadata {
                name: entry.id.clone(),
                created_at: parse_backup_timestamp(&entry.id),
                size_bytes,
                path: entry.path.clone(),
            });
        }
        rows.sort_by_key(|meta| Reverse(meta.created_at));
        Ok(rows)
    }

    fn backup_dir(&self, slug: &str) -> PathBuf {
        self.paths.backup_root.join(canonical_slug(slug))
    }

    fn write_backup_file(&self, book: &Book, note: Option<&str>) -> Result<BookBackupInfo, CoreError> {
        let slug = canonical_slug(book.slug());
        let (timestamp, file_name, path) = self.next_backup_path(&slug, note)?;
        write_atomic(&path, &serialize_book(book)?)?;
        self.prune_backups(&slug)?;
        Ok(BookBackupInfo {
            tenant: slug,
            id: file_name,
            created_at: timestamp,
            path,
        })
    }

    /// Copies the current book file aside before it is overwritten.
    fn backup_existing_file(&self, slug: &str, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        let (_, _, target) = self.next_backup_path(slug, None)?;
        fs::copy(path, target)?;
        self.prune_backups(slug)
    }

    /// Picks a backup file name that no earlier backup uses.
    ///
    /// Backups taken within the same minute get an increasing `_NNN` sequence
    /// after the timestamp.
    fn next_backup_path(
        &self,
        slug: &str,
        note: Option<&str>,
    ) -> Result<(String, String, PathBuf), CoreError> {
        let slug = canonical_slug(slug);
        let dir = self.backup_dir(&slug);
        fs::create_dir_all(&dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let prefix = format!("{slug}_{timestamp}");

        let mut taken: Option<u32> = None;
        for entry in fs::read_dir(&dir)? {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with(&prefix) {
                let sequence = backup_sort_key(name).1;
                taken = Some(taken.map_or(sequence, |max| max.max(sequence)));
            }
        }

        let mut stem = prefix;
        if let Some(max) = taken {
            stem.push_str(&format!("_{:03}", max + 1));
        }
        if let Some(label) = sanitize_backup_note(note) {
            stem.push('_');
            stem.push_str(&label);
        }
        let file_name = format!("{stem}.{BOOK_EXTENSION}");
        let path = dir.join(&file_name);
        Ok((timestamp, file_name, path))
    }

    fn prune_backups(&self, slug: &str) -> Result<(), CoreError> {
        let entries = self.list_backups(slug)?;
        for entry in entries.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&entry.path) {
                tracing::warn!(
                    tenant = %slug,
                    backup = %entry.id,
                    error = %err,
                    "failed to prune backup"
                );
            }
        }
        Ok(())
    }
}

impl BookStorage for JsonBookStorage {
    fn list_tenants(&self) -> Result<Vec<String>, CoreError> {
        let dir = self.paths.books_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut slugs = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(BOOK_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                slugs.push(stem.to_string());
            }
        }
        slugs.sort();
        Ok(slugs)
    }

    fn load_book(&self, slug: &str) -> Result<Book, CoreError> {
        let path = self.book_path(slug);
        if !path.exists() {
            return Err(CoreError::TenantNotFound(slug.to_string()));
        }
        load_book_from_path(&path)
    }

    fn save_book(&self, book: &Book) -> Result<(), CoreError> {
        let slug = book.slug();
        let path = self.book_path(slug);
        self.backup_existing_file(slug, &path)?;
        save_book_to_path(book, &path)
    }

    fn delete_book(&self, slug: &str) -> Result<(), CoreError> {
        let path = self.book_path(slug);
        if !path.exists() {
            return Err(CoreError::TenantNotFound(slug.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    fn backup_book(&self, book: &Book, note: Option<&str>) -> Result<BookBackupInfo, CoreError> {
        self.write_backup_file(book, note)
    }

    fn list_backups(&self, slug: &str) -> Result<Vec<BookBackupInfo>, CoreError> {
        let dir = self.backup_dir(slug);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let tenant = canonical_slug(slug);
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BOOK_EXTENSION) {
                continue;
            }
            if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
                entries.push(BookBackupInfo {
                    tenant: tenant.clone(),
                    id: file_name.to_string(),
                    created_at: file_name.to_string(),
                    path: path.clone(),
                });
            }
        }
        entries.sort_by(|a, b| {
            backup_sort_key(&b.id)
                .cmp(&backup_sort_key(&a.id))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(entries)
    }

    fn restore_backup(&self, backup: &BookBackupInfo) -> Result<Book, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!(
                "backup `{}` not found",
                backup.id
            )));
        }
        let book = load_book_from_path(&backup.path)?;
        let target = self.book_path(&backup.tenant);
        save_book_to_path(&book, &target)?;
        Ok(book)
    }

    fn append_audit(&self, entry: &AuditEntry) -> Result<(), CoreError> {
        let path = self.paths.audit_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(entry).map_err(|err| CoreError::Serde(err.to_string()))?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    fn read_audit(&self, limit: usize) -> Result<Vec<AuditEntry>, CoreError> {
        let path = self.paths.audit_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: AuditEntry =
                serde_json::from_str(&line).map_err(|err| CoreError::Serde(err.to_string()))?;
            entries.push(entry);
        }
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.split_off(skip))
    }

    fn tenant_exists(&self, slug: &str) -> Result<bool, CoreError> {
        Ok(self.book_path(slug).exists())
    }
}

/// Saves a book to an arbitrary path on disk, replacing it atomically.
pub fn save_book_to_path(book: &Book, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    write_atomic(&tmp, &serialize_book(book)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a book from the provided path, refusing files written by a newer schema.
pub fn load_book_from_path(path: &Path) -> Result<Book, CoreError> {
    let data = fs::read_to_string(path)?;
    let book: Book =
        serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))?;
    if book.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(CoreError::Storage(format!(
            "{} uses schema version {} but this build supports up to {}",
            path.display(),
            book.schema_version,
            CURRENT_SCHEMA_VERSION
        )));
    }
    Ok(book)
}

#[derive(Debug, Clone)]
pub struct TenantMetadata {
    pub slug: String,
    pub name: String,
    pub path: PathBuf,
    pub currency: String,
    pub status: SubscriptionStatus,
    pub updated_at: DateTime<Utc>,
    pub client_count: usize,
    pub document_count: usize,
    pub open_balance: f64,
    pub pending_notifications: usize,
}

#[derive(Debug, Clone)]
pub struct BackupMetadata {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub size_bytes: u64,
    pub path: PathBuf,
}

fn sanitize_backup_note(note: Option<&str>) -> Option<String> {
    let raw = note?.trim();
    let mut sanitized = String::new();
    let mut last_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !sanitized.is_empty() && !last_dash {
            sanitized.push('-');
            last_dash = true;
        }
    }
    let trimmed = sanitized.trim_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Extracts the `YYYYmmdd_HHMM` stamp that follows the slug in a backup file name.
fn parse_backup_timestamp(name: &str) -> Option<DateTime<Utc>> {
    backup_sort_key(name).0
}

/// Timestamp and same-minute sequence encoded in a backup file name.
fn backup_sort_key(name: &str) -> (Option<DateTime<Utc>>, u32) {
    let stem = name
        .strip_suffix(&format!(".{BOOK_EXTENSION}"))
        .unwrap_or(name);
    let segments: Vec<&str> = stem.split('_').collect();
    for index in (0..segments.len().saturating_sub(1)).rev() {
        let (date, time) = (segments[index], segments[index + 1]);
        if !is_digits(date, 8) || !is_digits(time, 4) {
            continue;
        }
        let Ok(naive) = NaiveDateTime::parse_from_str(&format!("{date}{time}"), "%Y%m%d%H%M")
        else {
            continue;
        };
        let sequence = segments
            .get(index + 2)
            .copied()
            .filter(|segment| is_digits(segment, 3))
            .and_then(|segment| segment.parse().ok())
            .unwrap_or(0);
        return (Some(DateTime::from_naive_utc_and_offset(naive, Utc)), sequence);
    }
    (None, 0)
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_digit())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

fn serialize_book(book: &Book) -> Result<String, CoreError> {
    serde_json::to_string_pretty(book).map_err(|err| CoreError::Serde(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_timestamp_is_found_after_note_suffix() {
        let stamp = parse_backup_timestamp("acme_corp_20250301_0930_before-import.json")
            .expect("timestamp");
        assert_eq!(stamp.format("%Y-%m-%d %H:%M").to_string(), "2025-03-01 09:30");
        assert!(parse_backup_timestamp("acme.json").is_none());
    }

    #[test]
    fn backup_notes_are_sanitized() {
        assert_eq!(
            sanitize_backup_note(Some("  Before Import!! ")).as_deref(),
            Some("before-import")
        );
        assert_eq!(sanitize_backup_note(Some("***")), None);
    }

    #[test]
    fn same_minute_backups_order_by_sequence() {
        let plain = backup_sort_key("acme_20250301_0930.json");
        let second = backup_sort_key("acme_20250301_0930_001.json");
        let noted = backup_sort_key("acme_20250301_0930_002_before-import.json");
        assert_eq!(plain.1, 0);
        assert_eq!(second.1, 1);
        assert_eq!(noted.1, 2);
        assert!(plain < second && second < noted);
        assert!(backup_sort_key("acme_20250301_0931.json") > noted);
    }
}
