//! Mark command implementation

use anyhow::{bail, Result};
use gw_migrate::Ledger;

use crate::cli::{GlobalArgs, MarkArgs};
use crate::context::RuntimeContext;
use crate::loader;

/// Execute the mark command
///
/// Records a step's outcome in the ledger without running its SQL, for
/// databases migrated by hand or imported from another environment.
pub fn execute(args: &MarkArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;

    let migrations = loader::discover(&ctx.migrations_dir())?;
    if !migrations.iter().any(|m| m.name == args.step) {
        bail!(
            "unknown migration step '{}'; known steps: {}",
            args.step,
            migrations
                .iter()
                .map(|m| m.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let ledger = Ledger::new(&ctx.config.ledger_table);
    ledger.ensure_schema(&ctx.db)?;
    ledger.mark(&ctx.db, &args.step, !args.failed)?;

    let status = if args.failed { "failed" } else { "applied" };
    println!("marked '{}' as {}", args.step, status);
    Ok(())
}
