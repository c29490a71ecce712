use super::*;
use std::fs;

fn args(dir: &Path, database: Option<&str>) -> GlobalArgs {
    GlobalArgs {
        verbose: false,
        project_dir: dir.to_string_lossy().into_owned(),
        config: None,
        database: database.map(String::from),
    }
}

#[test]
fn test_database_flag_supplies_missing_config_value() {
    // godwit.yml omits `database`; the flag alone must be enough.
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("godwit.yml"), "ledger_table: applied\n").unwrap();

    let ctx = RuntimeContext::new(&args(dir.path(), Some(":memory:"))).unwrap();
    assert_eq!(ctx.config.database, ":memory:");
    assert_eq!(ctx.config.ledger_table, "applied");
}

#[test]
fn test_database_flag_wins_over_config_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("godwit.yml"), "database: file.duckdb\n").unwrap();

    let ctx = RuntimeContext::new(&args(dir.path(), Some(":memory:"))).unwrap();
    assert_eq!(ctx.config.database, ":memory:");
}

#[test]
fn test_database_flag_without_config_file() {
    let dir = tempfile::tempdir().unwrap();

    let ctx = RuntimeContext::new(&args(dir.path(), Some(":memory:"))).unwrap();
    assert_eq!(ctx.config.database, ":memory:");
}

#[test]
fn test_missing_database_still_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("godwit.yml"), "ledger_table: applied\n").unwrap();

    let err = RuntimeContext::new(&args(dir.path(), None)).unwrap_err();
    assert!(err
        .chain()
        .any(|c| matches!(
            c.downcast_ref::<gw_core::CoreError>(),
            Some(gw_core::CoreError::ConfigInvalid { .. })
        )));
}

#[test]
fn test_relative_dirs_resolve_against_project() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("godwit.yml"),
        "database: \":memory:\"\nlock_dir: locks\nmigrations_dir: steps\n",
    )
    .unwrap();

    let ctx = RuntimeContext::new(&args(dir.path(), None)).unwrap();
    assert_eq!(ctx.lock_dir(), dir.path().join("locks"));
    assert_eq!(ctx.migrations_dir(), dir.path().join("steps"));
}
