use super::*;
use serial_test::serial;
use std::fs;

fn clear_godwit_env() {
    for (key, _) in std::env::vars() {
        if key.starts_with("GODWIT_") {
            std::env::remove_var(key);
        }
    }
}

#[test]
#[serial]
fn test_load_from_yaml() {
    clear_godwit_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    fs::write(
        &path,
        "database: test.duckdb\nschema_version: \"42\"\nledger_table: applied\n",
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.database, "test.duckdb");
    assert_eq!(config.ledger_table, "applied");
    assert_eq!(config.lock_dir, "flags");
    assert!(!config.create_lock_dir);
    assert_eq!(config.lock_marker(), "migrate-42.lock");
}

#[test]
#[serial]
fn test_env_override_wins_over_file() {
    clear_godwit_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    fs::write(&path, "database: file.duckdb\n").unwrap();

    std::env::set_var("GODWIT_DATABASE", "env.duckdb");
    let config = Config::load(&path).unwrap();
    std::env::remove_var("GODWIT_DATABASE");

    assert_eq!(config.database, "env.duckdb");
}

#[test]
#[serial]
fn test_missing_database_is_config_error() {
    clear_godwit_env();
    let result = Config::from_env();
    assert!(matches!(
        result.unwrap_err(),
        CoreError::ConfigInvalid { .. }
    ));
}

#[test]
#[serial]
fn test_load_unvalidated_defers_usability_check() {
    clear_godwit_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    fs::write(&path, "ledger_table: applied\n").unwrap();

    // No database yet; the caller may still supply one before validating.
    let config = Config::load_unvalidated(&path).unwrap();
    assert!(config.database.is_empty());
    assert!(config.validate().is_err());
}

#[test]
#[serial]
fn test_load_from_dir_unvalidated_without_file() {
    clear_godwit_env();
    let dir = tempfile::tempdir().unwrap();

    let config = Config::load_from_dir_unvalidated(dir.path()).unwrap();
    assert!(config.database.is_empty());
    assert_eq!(config.ledger_table, "gw_applied_steps");
}

#[test]
#[serial]
fn test_from_env_only() {
    clear_godwit_env();
    std::env::set_var("GODWIT_DATABASE", ":memory:");
    std::env::set_var("GODWIT_CREATE_LOCK_DIR", "true");
    let config = Config::from_env().unwrap();
    clear_godwit_env();

    assert_eq!(config.database, ":memory:");
    assert!(config.create_lock_dir);
    assert_eq!(config.lock_marker(), "migrate.lock");
}

#[test]
#[serial]
fn test_load_from_dir_falls_back_to_env() {
    clear_godwit_env();
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var("GODWIT_DATABASE", ":memory:");
    let config = Config::load_from_dir(dir.path()).unwrap();
    clear_godwit_env();

    assert_eq!(config.database, ":memory:");
}

#[test]
#[serial]
fn test_load_missing_file() {
    clear_godwit_env();
    let result = Config::load(std::path::Path::new("/nonexistent/godwit.yml"));
    assert!(matches!(
        result.unwrap_err(),
        CoreError::ConfigNotFound { .. }
    ));
}

#[test]
#[serial]
fn test_unknown_field_rejected() {
    clear_godwit_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    fs::write(&path, "database: x\nnot_a_field: 1\n").unwrap();

    let result = Config::load(&path);
    assert!(matches!(result.unwrap_err(), CoreError::YamlParse(_)));
}
