//! gw-db - Database abstraction layer for Godwit
//!
//! This crate provides the `Database` trait, the DuckDB implementation,
//! and the two external collaborators of a migration run: restoring a SQL
//! dump into an empty database and flushing a cache store afterwards.

pub mod cache;
pub mod duckdb;
pub mod error;
pub mod restore;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
