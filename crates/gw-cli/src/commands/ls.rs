//! List command implementation

use anyhow::{Context, Result};
use gw_migrate::{Ledger, LedgerEntry};
use std::collections::{HashMap, HashSet};

use crate::cli::{GlobalArgs, LsArgs, LsOutput};
use crate::context::RuntimeContext;
use crate::loader;

/// Execute the ls command
pub fn execute(args: &LsArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let ledger = Ledger::new(&ctx.config.ledger_table);

    let migrations = loader::discover(&ctx.migrations_dir())?;

    // ls is read-only: a missing ledger table means nothing is applied,
    // not that we should create it.
    let entries = if ledger.table_exists(&ctx.db)? {
        ledger.entries(&ctx.db)?
    } else {
        Vec::new()
    };
    let by_name: HashMap<&str, &LedgerEntry> =
        entries.iter().map(|e| (e.name.as_str(), e)).collect();

    let mut steps: Vec<StepInfo> = Vec::new();
    for migration in &migrations {
        let (status, applied_at) = match by_name.get(migration.name.as_str()) {
            Some(entry) if entry.installed => ("applied", Some(entry.last_update.to_string())),
            Some(entry) => ("failed", Some(entry.last_update.to_string())),
            None => ("pending", None),
        };
        steps.push(StepInfo {
            name: migration.name.clone(),
            status: status.to_string(),
            applied_at,
            requires: migration.requires.clone(),
        });
    }

    // Ledger rows without a matching file, e.g. steps from an older
    // deployment whose files were since removed.
    let known: HashSet<&str> = migrations.iter().map(|m| m.name.as_str()).collect();
    for entry in &entries {
        if known.contains(entry.name.as_str()) {
            continue;
        }
        steps.push(StepInfo {
            name: entry.name.clone(),
            status: if entry.installed { "applied" } else { "failed" }.to_string(),
            applied_at: Some(entry.last_update.to_string()),
            requires: Vec::new(),
        });
    }

    match args.output {
        LsOutput::Table => print_table(&steps),
        LsOutput::Json => print_json(&steps)?,
    }

    Ok(())
}

/// Step information for display
#[derive(Debug, serde::Serialize)]
struct StepInfo {
    name: String,
    status: String,
    applied_at: Option<String>,
    requires: Vec<String>,
}

/// Print steps in table format
fn print_table(steps: &[StepInfo]) {
    let name_width = steps
        .iter()
        .map(|s| s.name.len())
        .max()
        .unwrap_or(4)
        .max(4);
    let status_width = 7;
    let at_width = 26;

    println!(
        "{:<name_width$}  {:<status_width$}  {:<at_width$}  REQUIRES",
        "NAME",
        "STATUS",
        "APPLIED_AT",
        name_width = name_width,
        status_width = status_width,
        at_width = at_width
    );
    println!(
        "{:-<name_width$}  {:-<status_width$}  {:-<at_width$}  {}",
        "",
        "",
        "",
        "-".repeat(20),
        name_width = name_width,
        status_width = status_width,
        at_width = at_width
    );

    for step in steps {
        let at = step.applied_at.as_deref().unwrap_or("-");
        let requires = if step.requires.is_empty() {
            "-".to_string()
        } else {
            step.requires.join(", ")
        };
        println!(
            "{:<name_width$}  {:<status_width$}  {:<at_width$}  {}",
            step.name,
            step.status,
            at,
            requires,
            name_width = name_width,
            status_width = status_width,
            at_width = at_width
        );
    }

    let applied = steps.iter().filter(|s| s.status == "applied").count();
    println!();
    println!("{} steps, {} applied", steps.len(), applied);
}

/// Print steps in JSON format
fn print_json(steps: &[StepInfo]) -> Result<()> {
    let json = serde_json::to_string_pretty(steps).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}
