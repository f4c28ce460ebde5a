use std::fs;

use tally_config::{Config, ConfigError, ConfigManager};
use tally_domain::LifecyclePolicy;
use tempfile::tempdir;

#[test]
fn default_config_is_valid() {
    let cfg = Config::default();

    assert_eq!(cfg.default_currency, "EUR");
    assert_eq!(cfg.max_delivery_attempts, 3);
    assert_eq!(cfg.default_policy, LifecyclePolicy::default());
    assert!(cfg.validate().is_ok());
}

#[test]
fn config_manager_returns_defaults_when_missing() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    assert!(!manager.exists());
    assert_eq!(manager.load().expect("load"), Config::default());
    assert_eq!(manager.config_path(), dir.path().join("config/config.json"));
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    let cfg = Config {
        data_root: Some(dir.path().join("data")),
        default_currency: "USD".into(),
        max_delivery_attempts: 5,
        ..Config::default()
    };
    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded.default_currency, "USD");
    assert_eq!(loaded.max_delivery_attempts, 5);
    assert_eq!(loaded.resolve_data_root(), dir.path().join("data"));
    assert_eq!(loaded.resolve_backup_root(), dir.path().join("data/backups"));
}

#[test]
fn partial_config_files_fall_back_to_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "default_policy": { "termination_after_days": 30 } }"#).unwrap();
    let manager = ConfigManager::new(path, dir.path().join("backups"));

    let loaded = manager.load().expect("load config");
    assert_eq!(loaded.default_policy.reminder_after_days, 7);
    assert_eq!(loaded.default_policy.termination_after_days, 30);
    assert_eq!(loaded.backup_retention, 5);
}

#[test]
fn invalid_values_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    let cfg = Config {
        max_delivery_attempts: 0,
        ..Config::default()
    };
    assert!(matches!(manager.save(&cfg), Err(ConfigError::Invalid(_))));

    fs::write(manager.config_path(), r#"{ "default_currency": "euro" }"#).unwrap();
    assert!(matches!(manager.load(), Err(ConfigError::Invalid(_))));
}

#[test]
fn config_backups_can_be_restored() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    let cfg = Config {
        locale: "pt-PT".into(),
        ..Config::default()
    };

    let name = manager.backup(&cfg).expect("backup");
    assert_eq!(manager.list_backups().unwrap(), vec![name.clone()]);
    let restored = manager.restore(&name).expect("restore");
    assert_eq!(restored.locale, "pt-PT");
    assert_eq!(manager.load().unwrap().locale, "pt-PT");
}

#[test]
fn restore_refuses_paths_outside_the_backup_dir() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");
    manager.save(&Config::default()).expect("save");

    for name in ["../config.json", "..", "nested/config_20250101_0000.json"] {
        assert!(matches!(manager.restore(name), Err(ConfigError::Invalid(_))));
    }
}
