//! Restore a SQL dump into an empty database before migrations run.
//!
//! The dump path from the configuration is a base name; the actual file on
//! disk may carry a compression suffix. Probing order is `.sql`,
//! `.sql.gz`, `.gz`, matching what backup jobs typically produce.

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use flate2::read::GzDecoder;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Suffixes tried against the dump base name, in order
const DUMP_SUFFIXES: &[&str] = &[".sql", ".sql.gz", ".gz"];

/// Locate the dump file for `base`, trying the literal path first and then
/// the known suffixes against the stem.
fn locate_dump(base: &Path) -> Option<PathBuf> {
    if base.is_file() {
        return Some(base.to_path_buf());
    }

    let stem = base.with_extension("");
    let stem = stem.to_string_lossy();
    DUMP_SUFFIXES
        .iter()
        .map(|suffix| PathBuf::from(format!("{}{}", stem, suffix)))
        .find(|candidate| candidate.is_file())
}

/// Read the dump at `path`, decompressing based on the file name
fn read_dump(path: &Path) -> DbResult<String> {
    let name = path.to_string_lossy();
    if name.ends_with(".gz") {
        let file = std::fs::File::open(path)
            .map_err(|e| DbError::RestoreError(format!("{}: {}", path.display(), e)))?;
        let mut decoder = GzDecoder::new(file);
        let mut sql = String::new();
        decoder
            .read_to_string(&mut sql)
            .map_err(|e| DbError::RestoreError(format!("{}: {}", path.display(), e)))?;
        Ok(sql)
    } else if name.ends_with(".sql") {
        std::fs::read_to_string(path)
            .map_err(|e| DbError::RestoreError(format!("{}: {}", path.display(), e)))
    } else {
        Err(DbError::UnsupportedDump {
            path: path.display().to_string(),
        })
    }
}

/// Restore the dump at `base` into `db`, returning the path that was used.
///
/// Any failure here aborts the run before a single migration executes.
pub fn restore_from_dump(db: &dyn Database, base: &Path) -> DbResult<PathBuf> {
    let path = locate_dump(base).ok_or_else(|| {
        DbError::RestoreError(format!("no dump found at {}", base.display()))
    })?;

    log::info!("restoring database from {}", path.display());
    let sql = read_dump(&path)?;

    db.execute_batch(&sql)
        .map_err(|e| DbError::RestoreError(format!("failed to apply {}: {}", path.display(), e)))?;

    log::info!("restore from {} complete", path.display());
    Ok(path)
}

#[cfg(test)]
#[path = "restore_test.rs"]
mod tests;
