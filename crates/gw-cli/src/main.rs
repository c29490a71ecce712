//! Godwit CLI - schema migration runner for DuckDB projects

use clap::Parser;
use gw_core::CoreError;
use gw_migrate::MigrateError;
use std::process::ExitCode;

mod cli;
mod commands;
mod context;
mod loader;

use cli::{Cli, Commands};
use commands::{ls, mark, run};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // Bare `gw` runs the migrations, the most common invocation.
    let result = match &cli.command {
        None | Some(Commands::Run) => run::execute(&cli.global),
        Some(Commands::Ls(args)) => ls::execute(args, &cli.global),
        Some(Commands::Mark(args)) => mark::execute(args, &cli.global),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            exit_code_for(&e)
        }
    }
}

/// Map an error chain to the documented process exit codes: 1 for a
/// failed run, 2 for configuration problems, 3 when another run holds
/// the lock
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(migrate) = cause.downcast_ref::<MigrateError>() {
            if matches!(migrate, MigrateError::AlreadyLocked { .. }) {
                return ExitCode::from(3);
            }
        }
        if let Some(core) = cause.downcast_ref::<CoreError>() {
            if matches!(
                core,
                CoreError::ConfigNotFound { .. }
                    | CoreError::ConfigInvalid { .. }
                    | CoreError::YamlParse(_)
            ) {
                return ExitCode::from(2);
            }
        }
    }
    ExitCode::from(1)
}
