use std::{collections::HashSet, path::PathBuf};

use tally_domain::{AuditEntry, Book};

use crate::CoreError;

/// Describes a persisted backup artifact for a tenant book.
#[derive(Debug, Clone)]
pub struct BookBackupInfo {
    pub tenant: String,
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Abstraction over persistence backends holding one book per tenant plus the audit trail.
pub trait BookStorage: Send + Sync {
    fn list_tenants(&self) -> Result<Vec<String>, CoreError>;
    fn load_book(&self, slug: &str) -> Result<Book, CoreError>;
    fn save_book(&self, book: &Book) -> Result<(), CoreError>;
    fn delete_book(&self, slug: &str) -> Result<(), CoreError>;
    fn backup_book(&self, book: &Book, note: Option<&str>) -> Result<BookBackupInfo, CoreError>;
    fn list_backups(&self, slug: &str) -> Result<Vec<BookBackupInfo>, CoreError>;
    fn restore_backup(&self, backup: &BookBackupInfo) -> Result<Book, CoreError>;
    fn append_audit(&self, entry: &AuditEntry) -> Result<(), CoreError>;
    /// Returns the newest `limit` audit entries, oldest first.
    fn read_audit(&self, limit: usize) -> Result<Vec<AuditEntry>, CoreError>;

    fn tenant_exists(&self, slug: &str) -> Result<bool, CoreError> {
        Ok(self.list_tenants()?.iter().any(|name| name == slug))
    }
}

/// Detects dangling references and other anomalies within a book snapshot.
pub fn book_warnings(book: &Book) -> Vec<String> {
    let client_ids: HashSet<_> = book.clients.iter().map(|c| c.id).collect();
    let document_ids: HashSet<_> = book.documents.iter().map(|d| d.id).collect();
    let statutory_ids: HashSet<_> = book.statutories.iter().map(|s| s.id).collect();
    let mut warnings = Vec::new();

    for doc in &book.documents {
        if !client_ids.contains(&doc.client_id) {
            warnings.push(format!(
                "document {} references unknown client {}",
                doc.label(),
                doc.client_id
            ));
        }
        if doc.currency != book.tenant.currency {
            warnings.push(format!(
                "document {} is in {} but the tenant bills in {}",
                doc.label(),
                doc.currency,
                book.tenant.currency
            ));
        }
    }
    for followup in &book.followups {
        if !document_ids.contains(&followup.document_id) {
            warnings.push(format!(
                "followup {} references missing document {}",
                followup.id, followup.document_id
            ));
        }
    }
    for bill in &book.bills {
        if let Some(statutory) = bill.statutory_id {
            if !statutory_ids.contains(&statutory) {
                warnings.push(format!(
                    "bill {} references missing statutory {}",
                    bill.id, statutory
                ));
            }
        }
    }
    warnings
}
