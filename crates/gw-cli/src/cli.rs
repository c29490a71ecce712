//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Godwit - schema migration runner for DuckDB projects
#[derive(Parser, Debug)]
#[command(name = "gw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override database path
    #[arg(short, long, global = true)]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply all pending migrations
    Run,

    /// List migration steps and their ledger status
    Ls(LsArgs),

    /// Record a step in the ledger without executing it
    Mark(MarkArgs),
}

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: LsOutput,
}

/// List output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
}

/// Arguments for the mark command
#[derive(Args, Debug)]
pub struct MarkArgs {
    /// Step name to record
    pub step: String,

    /// Record the step as failed instead of applied
    #[arg(long)]
    pub failed: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
