//! gw-migrate - Migration execution core for Godwit
//!
//! This crate drives a migration run end to end: steps registered with
//! prerequisite edges, a persistent ledger of what has been applied, a
//! fail-fast filesystem run lock, the per-step transactional executor,
//! and a scoped drop/recreate manager for dependent views.

pub mod error;
pub mod executor;
pub mod ledger;
pub mod lock;
pub mod registry;
pub mod views;

pub use error::{MigrateError, MigrateResult};
pub use executor::{Executor, LockOptions, RunReport};
pub use ledger::{Ledger, LedgerEntry};
pub use lock::RunLock;
pub use registry::{MigrationCtx, MigrationStep, Registry, StepAction};
pub use views::{ViewManager, ViewNode};
