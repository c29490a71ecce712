//! Configuration types and parsing for godwit.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Default config file name looked up in the project directory
pub const CONFIG_FILE: &str = "godwit.yml";

/// Main project configuration from godwit.yml
///
/// Every field can be overridden from the environment via `GODWIT_*`
/// variables, so a container deployment can run without a config file at
/// all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Database path (DuckDB file path or `:memory:`)
    #[serde(default)]
    pub database: String,

    /// Name of the ledger table tracking applied steps
    #[serde(default = "default_ledger_table")]
    pub ledger_table: String,

    /// Directory holding the run-lock marker file
    #[serde(default = "default_lock_dir")]
    pub lock_dir: String,

    /// Create the lock directory if it does not exist
    #[serde(default)]
    pub create_lock_dir: bool,

    /// Optional schema version; names the lock marker file
    #[serde(default)]
    pub schema_version: Option<String>,

    /// Directory containing migration SQL files
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: String,

    /// Base path of a SQL dump to restore when the ledger table is absent
    #[serde(default)]
    pub restore_path: Option<String>,

    /// Redis URL to flush once after a successful restore
    #[serde(default)]
    pub redis_url: Option<String>,
}

fn default_ledger_table() -> String {
    "gw_applied_steps".to_string()
}

fn default_lock_dir() -> String {
    "flags".to_string()
}

fn default_migrations_dir() -> String {
    "migrations".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: String::new(),
            ledger_table: default_ledger_table(),
            lock_dir: default_lock_dir(),
            create_lock_dir: false,
            schema_version: None,
            migrations_dir: default_migrations_dir(),
            restore_path: None,
            redis_url: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file, then apply env overrides
    pub fn load(path: &Path) -> CoreResult<Self> {
        let config = Self::load_unvalidated(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file without the final usability check, for callers
    /// that overlay their own overrides (e.g. CLI flags) before
    /// validating
    pub fn load_unvalidated(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load `godwit.yml` from a project directory, falling back to a pure
    /// environment-variable configuration when the file is absent
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let config = Self::load_from_dir_unvalidated(dir)?;
        config.validate()?;
        Ok(config)
    }

    /// `load_from_dir` without the usability check
    pub fn load_from_dir_unvalidated(dir: &Path) -> CoreResult<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load_unvalidated(&path)
        } else {
            log::debug!("no {} in {}, using environment", CONFIG_FILE, dir.display());
            let mut config = Config::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Build a configuration from `GODWIT_*` environment variables only
    pub fn from_env() -> CoreResult<Self> {
        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Overlay `GODWIT_*` environment variables onto the current values
    ///
    /// Env secrets win over file values, matching how deployments inject
    /// the database location.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("GODWIT_DATABASE") {
            self.database = v;
        }
        if let Ok(v) = env::var("GODWIT_LEDGER_TABLE") {
            self.ledger_table = v;
        }
        if let Ok(v) = env::var("GODWIT_LOCK_DIR") {
            self.lock_dir = v;
        }
        if let Ok(v) = env::var("GODWIT_CREATE_LOCK_DIR") {
            self.create_lock_dir = matches!(v.as_str(), "1" | "true" | "yes");
        }
        if let Ok(v) = env::var("GODWIT_SCHEMA_VERSION") {
            self.schema_version = Some(v);
        }
        if let Ok(v) = env::var("GODWIT_MIGRATIONS_DIR") {
            self.migrations_dir = v;
        }
        if let Ok(v) = env::var("GODWIT_RESTORE_PATH") {
            self.restore_path = Some(v);
        }
        if let Ok(v) = env::var("GODWIT_REDIS_URL") {
            self.redis_url = Some(v);
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> CoreResult<()> {
        if self.database.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database is required (set `database` in godwit.yml or $GODWIT_DATABASE)"
                    .into(),
            });
        }
        if self.ledger_table.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "ledger_table must not be empty".into(),
            });
        }
        Ok(())
    }

    /// File name of the run-lock marker for this schema version
    pub fn lock_marker(&self) -> String {
        match &self.schema_version {
            Some(version) => format!("migrate-{}.lock", version),
            None => "migrate.lock".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
