//! Filesystem run lock: one migration run at a time
//!
//! The marker file's existence is the lock state; its content is
//! irrelevant. Acquisition is fail-fast — a second run observes the
//! marker and exits with an actionable error instead of queuing. The
//! guard removes the marker on drop, so every exit path of the run
//! (normal return, error propagation, panic unwind) releases the lock.

use crate::error::{MigrateError, MigrateResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Guard holding the run lock; dropping it releases the lock
#[derive(Debug)]
pub struct RunLock {
    marker: PathBuf,
    released: bool,
}

impl RunLock {
    /// Acquire the lock by creating `marker` inside `dir`
    ///
    /// Fails with `AlreadyLocked` when the marker exists — either another
    /// run is active or a previous run crashed without cleanup; the two
    /// are treated identically. A missing directory is an error unless
    /// `create_dir` opts in to creating it.
    pub fn acquire(dir: &Path, marker: &str, create_dir: bool) -> MigrateResult<Self> {
        if !dir.is_dir() {
            if create_dir {
                fs::create_dir_all(dir).map_err(|e| MigrateError::LockIo {
                    path: dir.display().to_string(),
                    source: e,
                })?;
            } else {
                return Err(MigrateError::LockDirMissing {
                    path: dir.display().to_string(),
                });
            }
        }

        let marker_path = dir.join(marker);
        // create_new is the atomicity guarantee: exactly one of two
        // racing invocations gets the file.
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&marker_path)
        {
            Ok(_) => {
                log::debug!("acquired run lock at {}", marker_path.display());
                Ok(Self {
                    marker: marker_path,
                    released: false,
                })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(MigrateError::AlreadyLocked {
                path: marker_path.display().to_string(),
            }),
            Err(e) => Err(MigrateError::LockIo {
                path: marker_path.display().to_string(),
                source: e,
            }),
        }
    }

    /// Path of the marker file, for signal handlers that need to unlink
    /// it before the process exits
    pub fn marker_path(&self) -> &Path {
        &self.marker
    }

    /// Release the lock explicitly, surfacing removal errors
    pub fn release(mut self) -> MigrateResult<()> {
        self.remove_marker().map_err(|e| MigrateError::LockIo {
            path: self.marker.display().to_string(),
            source: e,
        })
    }

    fn remove_marker(&mut self) -> std::io::Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        match fs::remove_file(&self.marker) {
            Ok(()) => {
                log::debug!("released run lock at {}", self.marker.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = self.remove_marker() {
            log::error!(
                "failed to remove lock marker {}: {}",
                self.marker.display(),
                e
            );
        }
    }
}

#[cfg(test)]
#[path = "lock_test.rs"]
mod tests;
