//! Database trait definition

use crate::error::DbResult;

/// Database abstraction trait for Godwit
///
/// A migration run is single-threaded, synchronous, and exclusively owns
/// its connection, so the surface is deliberately small: execute, query,
/// and explicit transaction control. Statement parameters are passed as
/// text; the engine casts them to the column types.
pub trait Database: Send + Sync {
    /// Execute SQL that modifies data, returns affected rows
    fn execute(&self, sql: &str, params: &[&str]) -> DbResult<usize>;

    /// Execute multiple SQL statements
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query and return all rows, every column rendered as text
    fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Vec<String>>>;

    /// Open an explicit transaction
    fn begin(&self) -> DbResult<()>;

    /// Commit the current transaction
    fn commit(&self) -> DbResult<()>;

    /// Roll back the current transaction
    fn rollback(&self) -> DbResult<()>;

    /// Check if a table or view exists
    fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
