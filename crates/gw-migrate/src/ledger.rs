//! Persistent ledger of applied migration steps
//!
//! The ledger table is the source of truth for "already done": a step is
//! applied exactly when its row carries `installed = 'T'`. Rows are
//! inserted on first sight and updated afterwards, never deleted.

use crate::error::{MigrateError, MigrateResult};
use chrono::NaiveDateTime;
use gw_db::Database;

/// Timestamp layout used both for writing and for parsing ledger rows
const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// One row of the ledger table
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// Step name
    pub name: String,

    /// Whether the step completed successfully
    pub installed: bool,

    /// When the row was last touched
    pub last_update: NaiveDateTime,
}

/// Handle to the ledger table
#[derive(Debug, Clone)]
pub struct Ledger {
    table: String,
}

impl Ledger {
    /// Create a handle for the given table name
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
        }
    }

    /// The ledger table name
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Check whether the ledger table exists at all
    ///
    /// Absence means the database was never initialized; callers use this
    /// to decide whether to restore from a dump first.
    pub fn table_exists(&self, db: &dyn Database) -> MigrateResult<bool> {
        Ok(db.relation_exists(&self.table)?)
    }

    /// Idempotently create the ledger table
    ///
    /// Tolerates a prior partial run having created it already.
    pub fn ensure_schema(&self, db: &dyn Database) -> MigrateResult<()> {
        db.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (\
             name TEXT UNIQUE, \
             installed CHAR(1), \
             last_update TIMESTAMP)",
            self.table
        ))?;
        Ok(())
    }

    /// Whether `name` has been applied successfully
    pub fn is_applied(&self, db: &dyn Database, name: &str) -> MigrateResult<bool> {
        let rows = db.query_rows(
            &format!(
                "SELECT CAST(COUNT(*) AS VARCHAR) FROM {} \
                 WHERE name = ? AND installed = 'T'",
                self.table
            ),
            &[name],
        )?;
        let count = rows
            .first()
            .and_then(|r| r.first())
            .ok_or_else(|| MigrateError::LedgerFormat("empty count result".into()))?;
        Ok(count != "0")
    }

    /// Names of all successfully applied steps
    pub fn applied_set(&self, db: &dyn Database) -> MigrateResult<std::collections::HashSet<String>> {
        let rows = db.query_rows(
            &format!("SELECT name FROM {} WHERE installed = 'T'", self.table),
            &[],
        )?;
        Ok(rows.into_iter().filter_map(|mut r| r.pop()).collect())
    }

    /// Record the outcome of a step: insert if absent, else update the
    /// flag and refresh the timestamp
    pub fn mark(&self, db: &dyn Database, name: &str, installed: bool) -> MigrateResult<()> {
        let flag = if installed { "T" } else { "F" };
        let now = chrono::Utc::now().naive_utc().format(TS_FORMAT).to_string();
        db.execute(
            &format!(
                "INSERT INTO {} (name, installed, last_update) VALUES (?, ?, ?) \
                 ON CONFLICT (name) DO UPDATE SET \
                 installed = excluded.installed, last_update = excluded.last_update",
                self.table
            ),
            &[name, flag, &now],
        )?;
        Ok(())
    }

    /// Shorthand for recording a success
    pub fn mark_applied(&self, db: &dyn Database, name: &str) -> MigrateResult<()> {
        self.mark(db, name, true)
    }

    /// All ledger rows, ordered by name for reproducible listing
    pub fn entries(&self, db: &dyn Database) -> MigrateResult<Vec<LedgerEntry>> {
        let rows = db.query_rows(
            &format!(
                "SELECT name, installed, CAST(last_update AS VARCHAR) \
                 FROM {} ORDER BY name",
                self.table
            ),
            &[],
        )?;

        rows.into_iter()
            .map(|row| match row.as_slice() {
                [name, installed, last_update] => Ok(LedgerEntry {
                    name: name.clone(),
                    installed: installed == "T",
                    last_update: NaiveDateTime::parse_from_str(last_update, TS_FORMAT)
                        .map_err(|e| {
                            MigrateError::LedgerFormat(format!(
                                "bad timestamp '{}': {}",
                                last_update, e
                            ))
                        })?,
                }),
                other => Err(MigrateError::LedgerFormat(format!(
                    "expected 3 columns, got {}",
                    other.len()
                ))),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
