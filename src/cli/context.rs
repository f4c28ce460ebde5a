use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use strsim::levenshtein;

use tally_config::{Config, ConfigManager};
use tally_core::{storage::BookStorage, Clock};
use tally_storage_json::{JsonBookStorage, StoragePaths};

use crate::cli::{error::CliError, spool::SpoolNotifier, system_clock::SystemClock};

const APP_DIR: &str = "billing-core";
const OUTBOX_DIR: &str = "outbox";

/// Everything a command needs: configuration, storage, delivery and the clock.
pub struct AppContext {
    pub config: Config,
    pub config_manager: ConfigManager,
    pub storage: JsonBookStorage,
    pub notifier: SpoolNotifier,
    clock: Box<dyn Clock>,
}

impl AppContext {
    /// Loads the config under `home` (or the platform config dir) and opens storage.
    pub fn load(home: Option<&Path>) -> Result<Self, CliError> {
        let base = match home {
            Some(path) => path.to_path_buf(),
            None => default_home(),
        };
        let config_manager = ConfigManager::with_base_dir(base.clone())?;
        let config = config_manager.load()?;
        Self::from_parts(config, config_manager, home.map(|_| base))
    }

    fn from_parts(
        config: Config,
        config_manager: ConfigManager,
        home: Option<PathBuf>,
    ) -> Result<Self, CliError> {
        let data_root = match (&config.data_root, home) {
            (Some(root), _) => root.clone(),
            (None, Some(home)) => home.join("data"),
            (None, None) => config.resolve_data_root(),
        };
        let backup_root = config
            .backup_root
            .clone()
            .unwrap_or_else(|| data_root.join("backups"));
        let storage = JsonBookStorage::with_retention(
            StoragePaths {
                data_root: data_root.clone(),
                backup_root,
            },
            config.backup_retention,
        )?;
        let notifier = SpoolNotifier::new(
            data_root.join(OUTBOX_DIR),
            config.notification_sender.clone(),
        );
        tracing::debug!(data_root = %data_root.display(), "storage opened");
        Ok(Self {
            config,
            config_manager,
            storage,
            notifier,
            clock: Box::new(SystemClock),
        })
    }

    pub fn today(&self, date: Option<NaiveDate>) -> NaiveDate {
        date.unwrap_or_else(|| self.clock.today())
    }

    /// Returns the slug when the tenant exists, otherwise an error with the closest match.
    pub fn resolve_tenant(&self, slug: &str) -> Result<String, CliError> {
        let slug = slug.trim().to_lowercase();
        let tenants = self.storage.list_tenants()?;
        if tenants.contains(&slug) {
            return Ok(slug);
        }
        Err(CliError::UnknownTenant {
            suggestion: suggest(&slug, &tenants),
            slug,
        })
    }
}

fn default_home() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Closest known slug within an edit distance of 3.
pub fn suggest(input: &str, candidates: &[String]) -> Option<String> {
    candidates
        .iter()
        .map(|candidate| (levenshtein(candidate, input), candidate))
        .filter(|(distance, _)| *distance <= 3)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggest_picks_nearest_slug() {
        let tenants = vec!["acme".to_string(), "globex".to_string()];
        assert_eq!(suggest("acne", &tenants).as_deref(), Some("acme"));
        assert_eq!(suggest("initech", &tenants), None);
    }
}
