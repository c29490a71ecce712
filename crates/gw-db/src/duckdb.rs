//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use duckdb::Connection;
use std::path::Path;
use std::sync::Mutex;

/// DuckDB database backend
#[derive(Debug)]
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }
}

impl Database for DuckDbBackend {
    fn execute(&self, sql: &str, params: &[&str]) -> DbResult<usize> {
        let conn = self.lock()?;
        conn.execute(sql, duckdb::params_from_iter(params.iter().copied()))
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    fn query_rows(&self, sql: &str, params: &[&str]) -> DbResult<Vec<Vec<String>>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query(duckdb::params_from_iter(params.iter().copied()))?;

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let columns = row.as_ref().column_count();
            let mut record = Vec::with_capacity(columns);
            for i in 0..columns {
                let value: Option<String> = row.get(i)?;
                record.push(value.unwrap_or_default());
            }
            result.push(record);
        }
        Ok(result)
    }

    fn begin(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {}", e)))
    }

    fn commit(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch("COMMIT")
            .map_err(|e| DbError::TransactionError(format!("COMMIT failed: {}", e)))
    }

    fn rollback(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch("ROLLBACK")
            .map_err(|e| DbError::TransactionError(format!("ROLLBACK failed: {}", e)))
    }

    fn relation_exists(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;

        // Handle schema-qualified names
        let (schema, table) = if let Some(pos) = name.rfind('.') {
            (&name[..pos], &name[pos + 1..])
        } else {
            ("main", name)
        };

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = ? AND table_name = ?",
                duckdb::params![schema, table],
                |row| row.get(0),
            )
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;

        Ok(count > 0)
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
