//! Discovery of SQL migration files
//!
//! A migration is a `.sql` file in the migrations directory. The file
//! stem is the step name; prerequisites are declared in leading comment
//! lines of the form `-- requires: other_step, another_step`. Files are
//! registered in file-name order, so numbered prefixes give independent
//! steps a stable execution order.

use anyhow::{bail, Context, Result};
use gw_migrate::Registry;
use std::path::{Path, PathBuf};

/// Comment prefix declaring a step's prerequisites
const REQUIRES_PREFIX: &str = "requires:";

/// One discovered migration file
#[derive(Debug, Clone)]
pub struct SqlMigration {
    /// Step name, taken from the file stem
    pub name: String,

    /// Prerequisite step names from the `-- requires:` header
    pub requires: Vec<String>,

    /// Full file contents, executed as a batch
    pub sql: String,

    /// Where the file was found
    pub path: PathBuf,
}

/// Discover migration files in `dir`, sorted by file name
pub fn discover(dir: &Path) -> Result<Vec<SqlMigration>> {
    if !dir.is_dir() {
        bail!("migrations directory {} does not exist", dir.display());
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "sql"))
        .collect();
    paths.sort();

    let mut migrations = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Invalid migration file name: {}", path.display()))?
            .to_string();
        let sql = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let requires = parse_requires(&sql);

        log::debug!("discovered migration '{}' at {}", name, path.display());
        migrations.push(SqlMigration {
            name,
            requires,
            sql,
            path,
        });
    }
    Ok(migrations)
}

/// Extract prerequisite names from the leading comment block
///
/// Scanning stops at the first line that is neither blank nor a `--`
/// comment; a `requires:` marker further down is just SQL commentary.
fn parse_requires(sql: &str) -> Vec<String> {
    let mut requires = Vec::new();
    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Some(comment) = trimmed.strip_prefix("--") else {
            break;
        };
        let comment = comment.trim();
        if let Some(list) = comment.strip_prefix(REQUIRES_PREFIX) {
            requires.extend(
                list.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            );
        }
    }
    requires
}

/// Build a registry whose steps execute the discovered SQL files
pub fn build_registry(migrations: Vec<SqlMigration>) -> Result<Registry> {
    let mut registry = Registry::new();
    for migration in migrations {
        let requires: Vec<&str> = migration.requires.iter().map(String::as_str).collect();
        let sql = migration.sql;
        registry.register(
            &migration.name,
            &requires,
            Box::new(move |ctx| {
                ctx.db.execute_batch(&sql)?;
                Ok(true)
            }),
        )?;
    }
    Ok(registry)
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
