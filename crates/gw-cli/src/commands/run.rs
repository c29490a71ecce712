//! Run command implementation

use anyhow::{Context, Result};
use gw_core::Config;
use gw_db::{cache, restore, Database};
use gw_migrate::{Executor, Ledger, RunLock};
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;
use crate::context::RuntimeContext;
use crate::loader;

/// Execute the run command
pub fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let ledger = Ledger::new(&ctx.config.ledger_table);

    if let Some(used) =
        restore_if_uninitialized(&ctx.db, &ledger, &ctx.config, &ctx.project_dir)?
    {
        println!("Restored database from {}", used.display());
    }

    let migrations = loader::discover(&ctx.migrations_dir())?;
    ctx.verbose(&format!("{} migration files discovered", migrations.len()));
    let registry = loader::build_registry(migrations)?;

    let guard = RunLock::acquire(
        &ctx.lock_dir(),
        &ctx.config.lock_marker(),
        ctx.config.create_lock_dir,
    )?;

    // Installed only once this invocation holds the lock; an earlier
    // handler would unlink another run's live marker on Ctrl-C.
    let marker = guard.marker_path().to_path_buf();
    ctrlc::set_handler(move || {
        let _ = std::fs::remove_file(&marker);
        std::process::exit(130);
    })
    .context("Failed to install interrupt handler")?;

    let executor = Executor::new(registry, ledger);
    let report = executor.run_with_lock(&ctx.db, guard)?;

    for name in &report.applied {
        println!("applied: {}", name);
    }
    println!(
        "{} applied, {} already up to date",
        report.applied.len(),
        report.skipped
    );
    Ok(())
}

/// Restore the configured dump when the database was never initialized
///
/// A database without a ledger table was never migrated; anything else
/// is left untouched. The cache flush belongs to the restore: entries
/// derived from the old database are stale only when the database
/// itself was replaced. Flushing is best-effort; a dead cache server
/// must not fail the run.
fn restore_if_uninitialized(
    db: &dyn Database,
    ledger: &Ledger,
    config: &Config,
    project_dir: &Path,
) -> Result<Option<PathBuf>> {
    let Some(base) = &config.restore_path else {
        return Ok(None);
    };
    if ledger.table_exists(db)? {
        return Ok(None);
    }

    let base_path = project_dir.join(base);
    let used =
        restore::restore_from_dump(db, &base_path).context("Database restore failed")?;

    if let Some(url) = &config.redis_url {
        match cache::flush_redis(url) {
            Ok(count) => log::info!("flushed {} cached keys after restore", count),
            Err(e) => log::warn!("cache flush failed: {}", e),
        }
    }
    Ok(Some(used))
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
