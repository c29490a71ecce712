//! Migration run executor
//!
//! Drives pending steps through apply → record → commit, each step inside
//! its own transaction. A failure rolls back the current step only;
//! earlier, already-committed steps stay recorded, so a re-run after the
//! operator fixes the root cause picks up exactly where this one stopped.

use crate::error::{MigrateError, MigrateResult};
use crate::ledger::Ledger;
use crate::lock::RunLock;
use crate::registry::{MigrationCtx, Registry};
use gw_db::Database;
use std::path::PathBuf;

/// Where and how the run lock is taken
#[derive(Debug, Clone)]
pub struct LockOptions {
    /// Directory holding the marker file
    pub dir: PathBuf,

    /// Marker file name
    pub marker: String,

    /// Create the directory when absent
    pub create_dir: bool,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Steps applied by this run, in execution order
    pub applied: Vec<String>,

    /// Registered steps that were already recorded as applied
    pub skipped: usize,
}

/// Drives a migration run: lock, resolve, apply, record, release
pub struct Executor {
    registry: Registry,
    ledger: Ledger,
}

impl Executor {
    /// Create an executor over a registry and a ledger
    pub fn new(registry: Registry, ledger: Ledger) -> Self {
        Self { registry, ledger }
    }

    /// Run all pending migrations
    ///
    /// Takes the run lock first; `AlreadyLocked` propagates and nothing
    /// else happens. The lock is released on every exit path — the guard
    /// drops on success, error, and panic unwind alike.
    pub fn run(&self, db: &dyn Database, lock: &LockOptions) -> MigrateResult<RunReport> {
        let guard = RunLock::acquire(&lock.dir, &lock.marker, lock.create_dir)?;
        self.run_with_lock(db, guard)
    }

    /// Run all pending migrations under an already-acquired lock guard
    ///
    /// For callers that take the lock themselves, e.g. to wire the
    /// marker path into a signal handler only once acquisition has
    /// succeeded.
    pub fn run_with_lock(&self, db: &dyn Database, guard: RunLock) -> MigrateResult<RunReport> {
        let report = self.run_locked(db)?;
        guard.release()?;
        Ok(report)
    }

    /// The locked portion of the run: schema, resolve, apply loop
    fn run_locked(&self, db: &dyn Database) -> MigrateResult<RunReport> {
        self.ledger.ensure_schema(db)?;

        let applied = self.ledger.applied_set(db)?;
        let pending = self.registry.resolve_order(&applied)?;
        let skipped = self.registry.len() - pending.len();
        log::info!(
            "{} steps pending, {} already applied",
            pending.len(),
            skipped
        );

        let mut applied_now = Vec::with_capacity(pending.len());
        for step in pending {
            log::info!("run: {}", step.name);
            db.begin()?;

            let ctx = MigrationCtx {
                db,
                ledger: &self.ledger,
                step: &step.name,
            };
            let outcome = step.invoke(&ctx);

            match outcome {
                Ok(true) => {
                    // Record inside the step's own transaction so the
                    // ledger row and the step's changes commit together.
                    let recorded = self
                        .ledger
                        .mark_applied(db, &step.name)
                        .and_then(|()| db.commit().map_err(MigrateError::from));
                    if let Err(e) = recorded {
                        Self::rollback_quietly(db, &step.name);
                        return Err(MigrateError::MigrationFailed {
                            step: step.name.clone(),
                            source: Box::new(e),
                        });
                    }
                    log::info!("ran: {} successfully", step.name);
                    applied_now.push(step.name.clone());
                }
                Ok(false) => {
                    // A falsy return is a failure, same as a raised error.
                    Self::rollback_quietly(db, &step.name);
                    return Err(MigrateError::MigrationFailed {
                        step: step.name.clone(),
                        source: Box::new(MigrateError::StepRejected {
                            step: step.name.clone(),
                        }),
                    });
                }
                Err(e) => {
                    Self::rollback_quietly(db, &step.name);
                    return Err(MigrateError::MigrationFailed {
                        step: step.name.clone(),
                        source: Box::new(e),
                    });
                }
            }
        }

        Ok(RunReport {
            applied: applied_now,
            skipped,
        })
    }

    /// Roll back the current transaction, logging instead of masking the
    /// step error that got us here
    fn rollback_quietly(db: &dyn Database, step: &str) {
        if let Err(e) = db.rollback() {
            log::error!("rollback after failed step '{}' also failed: {}", step, e);
        }
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
