use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tally_domain::LifecyclePolicy;

const APP_DIR: &str = "billing-core";

/// Installation settings shared by every tenant processed by this host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Root for tenant books, the audit trail and the outbox spool. Defaults to `<data dir>/billing-core`.
    pub data_root: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Root for book backups. Defaults to `<data root>/backups`.
    pub backup_root: Option<PathBuf>,

    #[serde(default = "Config::default_currency_value")]
    pub default_currency: String,
    #[serde(default = "Config::default_locale_value")]
    pub locale: String,
    /// Applied to tenants without their own policy.
    #[serde(default)]
    pub default_policy: LifecyclePolicy,
    #[serde(default = "Config::default_max_delivery_attempts")]
    pub max_delivery_attempts: u32,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
    #[serde(default = "Config::default_notification_sender")]
    pub notification_sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
    #[serde(default = "Config::default_color_enabled")]
    pub color_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_root: None,
            backup_root: None,
            default_currency: Self::default_currency_value(),
            locale: Self::default_locale_value(),
            default_policy: LifecyclePolicy::default(),
            max_delivery_attempts: Self::default_max_delivery_attempts(),
            backup_retention: Self::default_backup_retention(),
            notification_sender: Self::default_notification_sender(),
            log_filter: None,
            color_enabled: Self::default_color_enabled(),
        }
    }
}

impl Config {
    pub fn default_currency_value() -> String {
        "EUR".into()
    }

    pub fn default_locale_value() -> String {
        "en-US".into()
    }

    pub fn default_max_delivery_attempts() -> u32 {
        3
    }

    pub fn default_backup_retention() -> usize {
        5
    }

    pub fn default_notification_sender() -> String {
        "billing@localhost".into()
    }

    pub fn default_color_enabled() -> bool {
        true
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }
        dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    pub fn resolve_backup_root(&self) -> PathBuf {
        match &self.backup_root {
            Some(path) => path.clone(),
            None => self.resolve_data_root().join("backups"),
        }
    }

    /// Checks values serde cannot: currency shape, delivery attempts and policy ordering.
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        let currency = self.default_currency.trim();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(crate::ConfigError::Invalid(format!(
                "default_currency `{currency}` is not a three-letter code"
            )));
        }
        if self.max_delivery_attempts == 0 {
            return Err(crate::ConfigError::Invalid(
                "max_delivery_attempts must be at least 1".into(),
            ));
        }
        if self.backup_retention == 0 {
            return Err(crate::ConfigError::Invalid(
                "backup_retention must be at least 1".into(),
            ));
        }
        self.default_policy
            .validate()
            .map_err(|err| crate::ConfigError::Invalid(format!("default_policy: {err}")))
    }
}
