//! # piq
//!
//! **CLI Binary**
//!
//! Entry point for the `piq` command-line application. It loads settings,
//! reads report documents, and hands them to the extractor and reconciler.
//!
//! ## Responsibilities
//! * Parse command line arguments
//! * Initialize logging
//! * Load settings
//! * Dispatch commands to their handlers
//! * Format errors with remediation hints
//!
//! This crate should contain minimal business logic.

mod commands;
mod config;
mod error_hints;
mod io;

use anyhow::Result;
use clap::Parser;
use piq_config::{Cli, GlobalArgs};

/// Run the CLI with the process arguments.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.global);
    let resolved = config::resolve(&cli.global)?;
    commands::dispatch(cli.command, &resolved)
}

/// Render an error chain with hints for stderr.
pub fn format_error(err: &anyhow::Error) -> String {
    error_hints::format(err)
}

fn init_logging(global: &GlobalArgs) {
    let level = global.log_level();
    let env = env_logger::Env::default().filter_or("RUST_LOG", level.as_str());

    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(global.verbose >= 2)
        .init();
}
