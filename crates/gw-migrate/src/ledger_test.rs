use super::*;
use gw_db::DuckDbBackend;

fn setup() -> (DuckDbBackend, Ledger) {
    let db = DuckDbBackend::in_memory().unwrap();
    let ledger = Ledger::new("gw_applied_steps");
    ledger.ensure_schema(&db).unwrap();
    (db, ledger)
}

#[test]
fn test_ensure_schema_is_idempotent() {
    let (db, ledger) = setup();
    // A prior partial run may have created the table already.
    ledger.ensure_schema(&db).unwrap();
    assert!(ledger.table_exists(&db).unwrap());
}

#[test]
fn test_table_exists_before_schema() {
    let db = DuckDbBackend::in_memory().unwrap();
    let ledger = Ledger::new("gw_applied_steps");
    assert!(!ledger.table_exists(&db).unwrap());
}

#[test]
fn test_mark_and_is_applied() {
    let (db, ledger) = setup();
    assert!(!ledger.is_applied(&db, "t1").unwrap());

    ledger.mark_applied(&db, "t1").unwrap();
    assert!(ledger.is_applied(&db, "t1").unwrap());
    assert!(!ledger.is_applied(&db, "t2").unwrap());
}

#[test]
fn test_failed_step_is_not_applied() {
    let (db, ledger) = setup();
    ledger.mark(&db, "t1", false).unwrap();
    assert!(!ledger.is_applied(&db, "t1").unwrap());

    // Row exists but installed = 'F'
    let entries = ledger.entries(&db).unwrap();
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].installed);
}

#[test]
fn test_mark_upserts() {
    let (db, ledger) = setup();
    ledger.mark(&db, "t1", false).unwrap();
    ledger.mark(&db, "t1", true).unwrap();

    assert!(ledger.is_applied(&db, "t1").unwrap());
    // Still a single row; the flag was updated in place.
    let entries = ledger.entries(&db).unwrap();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].installed);
}

#[test]
fn test_applied_set() {
    let (db, ledger) = setup();
    ledger.mark_applied(&db, "t1").unwrap();
    ledger.mark_applied(&db, "t3").unwrap();
    ledger.mark(&db, "t2", false).unwrap();

    let applied = ledger.applied_set(&db).unwrap();
    assert_eq!(applied.len(), 2);
    assert!(applied.contains("t1"));
    assert!(applied.contains("t3"));
}

#[test]
fn test_entries_ordered_by_name() {
    let (db, ledger) = setup();
    ledger.mark_applied(&db, "zeta").unwrap();
    ledger.mark_applied(&db, "alpha").unwrap();
    ledger.mark_applied(&db, "mid").unwrap();

    let names: Vec<String> = ledger.entries(&db).unwrap().into_iter().map(|e| e.name).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn test_custom_table_name() {
    let db = DuckDbBackend::in_memory().unwrap();
    let ledger = Ledger::new("custom_ledger");
    ledger.ensure_schema(&db).unwrap();
    ledger.mark_applied(&db, "t1").unwrap();

    assert!(db.relation_exists("custom_ledger").unwrap());
    assert!(ledger.is_applied(&db, "t1").unwrap());
}

#[test]
fn test_timestamp_round_trips() {
    let (db, ledger) = setup();
    let before = chrono::Utc::now().naive_utc();
    ledger.mark_applied(&db, "t1").unwrap();
    let after = chrono::Utc::now().naive_utc();

    let entry = &ledger.entries(&db).unwrap()[0];
    assert!(entry.last_update >= before - chrono::Duration::seconds(1));
    assert!(entry.last_update <= after + chrono::Duration::seconds(1));
}
