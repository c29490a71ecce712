//! gw-core - Core library for Godwit
//!
//! This crate provides shared types, configuration parsing, and the
//! dependency DAG solver used across all Godwit components.

pub mod config;
pub mod dag;
pub mod error;

pub use config::Config;
pub use dag::StepDag;
pub use error::{CoreError, CoreResult};
