//! Error types for gw-migrate

use gw_core::CoreError;
use gw_db::DbError;
use thiserror::Error;

/// Migration run errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Duplicate step name at registration (M001)
    #[error("[M001] Duplicate migration step: {name}")]
    DuplicateStep { name: String },

    /// A prerequisite is neither applied nor registered (M002)
    #[error("[M002] Step '{step}' requires '{missing}', which is neither applied nor registered")]
    UnknownDependency { step: String, missing: String },

    /// Another run holds the lock (M003)
    #[error("[M003] Migration lock already held at {path}; if no other run is active, remove the marker and retry")]
    AlreadyLocked { path: String },

    /// Lock directory absent and auto-creation not enabled (M004)
    #[error("[M004] Lock directory {path} does not exist; create it or enable create_lock_dir")]
    LockDirMissing { path: String },

    /// Lock marker could not be created or removed (M005)
    #[error("[M005] Lock file error at {path}: {source}")]
    LockIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A step's action raised or was rejected; the run stopped (M006)
    #[error("[M006] Migration step '{step}' failed: {source}")]
    MigrationFailed {
        step: String,
        #[source]
        source: Box<MigrateError>,
    },

    /// A step's action reported failure without raising (M007)
    #[error("[M007] Migration step '{step}' reported failure")]
    StepRejected { step: String },

    /// Duplicate view name at registration (M008)
    #[error("[M008] Duplicate view: {name}")]
    DuplicateView { name: String },

    /// A view name is not registered (M009)
    #[error("[M009] Unknown view: {name}")]
    UnknownView { name: String },

    /// A view's down or up call failed (M010)
    #[error("[M010] Rebuild of view '{view}' failed: {source}")]
    ViewRebuild {
        view: String,
        #[source]
        source: Box<MigrateError>,
    },

    /// The scoped body failed and the rebuild pass failed too; the body
    /// error is the source, the rebuild error is carried alongside (M011)
    #[error("[M011] View rebuild failed while handling a scoped body error: {rebuild}")]
    ViewRebuildAfterFailure {
        rebuild: Box<MigrateError>,
        #[source]
        source: Box<MigrateError>,
    },

    /// A ledger row could not be decoded (M012)
    #[error("[M012] Malformed ledger row: {0}")]
    LedgerFormat(String),

    /// Core error passthrough (cycle detection, config)
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database error passthrough
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
