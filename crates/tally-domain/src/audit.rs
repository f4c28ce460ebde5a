use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuditLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuditLevel::Info => "INFO",
            AuditLevel::Warning => "WARN",
            AuditLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// One row of the batch audit trail: transitions, delivery problems, and caught failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    pub job: String,
    pub level: AuditLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<Uuid>,
    pub message: String,
}

impl AuditEntry {
    pub fn new(job: impl Into<String>, level: AuditLevel, message: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            tenant: None,
            job: job.into(),
            level,
            entity_id: None,
            message: message.into(),
        }
    }

    pub fn for_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn about(mut self, entity_id: Uuid) -> Self {
        self.entity_id = Some(entity_id);
        self
    }
}
