//! Runtime context for CLI commands

use anyhow::{Context, Result};
use gw_core::Config;
use gw_db::DuckDbBackend;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Runtime context containing loaded configuration and database connection
#[derive(Debug)]
pub struct RuntimeContext {
    /// The loaded configuration
    pub config: Config,

    /// Project directory all relative paths resolve against
    pub project_dir: PathBuf,

    /// Database connection
    pub db: DuckDbBackend,

    /// Verbose output enabled
    pub verbose: bool,
}

impl RuntimeContext {
    /// Create a new runtime context from global arguments
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let project_dir = PathBuf::from(&args.project_dir);

        // Load config from custom path or project directory. Validation
        // waits until the CLI overrides are in, so `--database` can
        // supply a value the file omits.
        let mut config = if let Some(config_path) = &args.config {
            Config::load_unvalidated(Path::new(config_path))
                .context("Failed to load configuration file")?
        } else {
            Config::load_from_dir_unvalidated(&project_dir)
                .context("Failed to load project configuration")?
        };

        if let Some(database) = &args.database {
            config.database = database.clone();
        }
        config.validate().context("Invalid configuration")?;

        let db = DuckDbBackend::new(&config.database).context("Failed to open database")?;

        Ok(Self {
            config,
            project_dir,
            db,
            verbose: args.verbose,
        })
    }

    /// Print verbose output if enabled
    pub fn verbose(&self, msg: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", msg);
        }
    }

    /// Directory holding the run-lock marker, relative to the project
    pub fn lock_dir(&self) -> PathBuf {
        self.project_dir.join(&self.config.lock_dir)
    }

    /// Directory holding migration SQL files, relative to the project
    pub fn migrations_dir(&self) -> PathBuf {
        self.project_dir.join(&self.config.migrations_dir)
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
