//! Error types for gw-core

use thiserror::Error;

/// Core error type for Godwit
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Empty name where an identifier was required
    #[error("[E003] Empty name: {context}")]
    EmptyName { context: String },

    /// E004: Circular dependency detected
    #[error("[E004] Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// E005: IO error
    #[error("[E005] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E006: Config parse error
    #[error("[E006] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
