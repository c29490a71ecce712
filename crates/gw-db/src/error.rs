//! Error types for gw-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table or view not found: {0}")]
    TableNotFound(String),

    /// Transaction management error (D004)
    #[error("[D004] Transaction failed: {0}")]
    TransactionError(String),

    /// Dump restore error (D005)
    #[error("[D005] Database restore failed: {0}")]
    RestoreError(String),

    /// Dump file format not supported (D006)
    #[error("[D006] Unsupported dump format: {path} (expected .sql or .gz)")]
    UnsupportedDump { path: String },

    /// Cache flush error (D007)
    #[error("[D007] Cache flush failed: {0}")]
    CacheError(String),

    /// Mutex poisoned (D008)
    #[error("[D008] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        // Classify DuckDB errors by inspecting the error message.
        // duckdb::Error does not expose structured variants, so string
        // matching is the only reliable approach. We use narrow patterns
        // to avoid misclassifying function/type/schema errors.
        let msg = err.to_string();
        if msg.contains("Table with name")
            || msg.contains("View with name")
            || msg.contains("Table or view with name")
            || (msg.contains("Catalog Error") && msg.contains("Table") && msg.contains("not found"))
        {
            DbError::TableNotFound(msg)
        } else {
            DbError::ExecutionError(msg)
        }
    }
}
