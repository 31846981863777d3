//! # piq-config
//!
//! **Tier 4 (Configuration)**
//!
//! Clap definitions for the `piq` command line.
//!
//! ## What belongs here
//! * Clap `Parser`, `Args`, `Subcommand` structs
//! * Flag-to-setting helpers that need no I/O
//!
//! ## What does NOT belong here
//! * Settings file schemas (use piq-settings)
//! * Business logic or I/O

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// `piq`: normalize and compare quality-model assessment reports.
#[derive(Parser, Debug)]
#[command(name = "piq", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Settings file to load instead of `<config dir>/piq/piq.toml`.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity. Repeatable (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,
}

impl GlobalArgs {
    /// Log level selected by the `-v` count. `RUST_LOG` still wins.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Normalize a report document and print the normalized report.
    Extract(ExtractArgs),

    /// Compare two report documents.
    Diff(DiffArgs),

    /// Print the score summary of a report document.
    Summary(SummaryArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Report document (JSON). Use `-` for stdin.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct DiffArgs {
    /// Report treated as "here".
    #[arg(value_name = "LEFT")]
    pub left: PathBuf,

    /// Report treated as "there".
    #[arg(value_name = "RIGHT")]
    pub right: PathBuf,

    /// Print both directions as `{ forward, backward }`.
    #[arg(long)]
    pub symmetric: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    /// Report document (JSON). Use `-` for stdin.
    #[arg(value_name = "FILE")]
    pub input: PathBuf,
}
