use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Tenant not found: {0}")]
    TenantNotFound(String),
    #[error("Tenant already exists: {0}")]
    TenantExists(String),
    #[error("Client not found: {0}")]
    ClientNotFound(Uuid),
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),
    #[error("Document not found: {0}")]
    DocumentNotFound(String),
    #[error("Statutory not found: {0}")]
    StatutoryNotFound(Uuid),
    #[error("Bill not found: {0}")]
    BillNotFound(Uuid),
    #[error("Followup not found: {0}")]
    FollowupNotFound(Uuid),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}

impl From<tally_domain::PolicyError> for CoreError {
    fn from(err: tally_domain::PolicyError) -> Self {
        CoreError::Validation(err.to_string())
    }
}
