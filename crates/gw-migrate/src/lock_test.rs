use super::*;

#[test]
fn test_acquire_creates_marker() {
    let dir = tempfile::tempdir().unwrap();
    let lock = RunLock::acquire(dir.path(), "migrate.lock", false).unwrap();
    assert!(dir.path().join("migrate.lock").is_file());
    assert_eq!(lock.marker_path(), dir.path().join("migrate.lock"));
}

#[test]
fn test_second_acquire_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let _held = RunLock::acquire(dir.path(), "migrate.lock", false).unwrap();

    let result = RunLock::acquire(dir.path(), "migrate.lock", false);
    assert!(matches!(
        result.unwrap_err(),
        MigrateError::AlreadyLocked { .. }
    ));
}

#[test]
fn test_stale_marker_blocks_acquisition() {
    // A crashed run left its marker behind; the operator must clear it.
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("migrate.lock"), b"").unwrap();

    let result = RunLock::acquire(dir.path(), "migrate.lock", false);
    assert!(matches!(
        result.unwrap_err(),
        MigrateError::AlreadyLocked { .. }
    ));
}

#[test]
fn test_release_removes_marker() {
    let dir = tempfile::tempdir().unwrap();
    let lock = RunLock::acquire(dir.path(), "migrate.lock", false).unwrap();
    lock.release().unwrap();
    assert!(!dir.path().join("migrate.lock").exists());

    // Lock can be taken again after release.
    RunLock::acquire(dir.path(), "migrate.lock", false).unwrap();
}

#[test]
fn test_drop_removes_marker() {
    let dir = tempfile::tempdir().unwrap();
    {
        let _lock = RunLock::acquire(dir.path(), "migrate.lock", false).unwrap();
    }
    assert!(!dir.path().join("migrate.lock").exists());
}

#[test]
fn test_drop_during_unwind_removes_marker() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().to_path_buf();
    let result = std::panic::catch_unwind(move || {
        let _lock = RunLock::acquire(&path, "migrate.lock", false).unwrap();
        panic!("migration blew up");
    });
    assert!(result.is_err());
    assert!(!dir.path().join("migrate.lock").exists());
}

#[test]
fn test_missing_dir_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("not_there");
    let result = RunLock::acquire(&missing, "migrate.lock", false);
    assert!(matches!(
        result.unwrap_err(),
        MigrateError::LockDirMissing { .. }
    ));
}

#[test]
fn test_create_dir_opt_in() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("flags/nested");
    let _lock = RunLock::acquire(&nested, "migrate.lock", true).unwrap();
    assert!(nested.join("migrate.lock").is_file());
}

#[test]
fn test_failed_acquire_leaves_holders_marker() {
    // A losing invocation must not disturb the winner's lock state.
    let dir = tempfile::tempdir().unwrap();
    let held = RunLock::acquire(dir.path(), "migrate.lock", false).unwrap();

    RunLock::acquire(dir.path(), "migrate.lock", false).unwrap_err();
    assert!(dir.path().join("migrate.lock").is_file());

    held.release().unwrap();
    assert!(!dir.path().join("migrate.lock").exists());
}

#[test]
fn test_versioned_marker_names_do_not_collide() {
    let dir = tempfile::tempdir().unwrap();
    let _v1 = RunLock::acquire(dir.path(), "migrate-1.lock", false).unwrap();
    // A different schema version uses a different marker.
    let _v2 = RunLock::acquire(dir.path(), "migrate-2.lock", false).unwrap();
}
