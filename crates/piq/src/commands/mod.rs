pub(crate) mod diff;
pub(crate) mod extract;
pub(crate) mod summary;

use anyhow::Result;
use piq_config::Commands;

use crate::config::ResolvedConfig;

pub(crate) fn dispatch(command: Commands, resolved: &ResolvedConfig) -> Result<()> {
    match command {
        Commands::Extract(args) => extract::handle(args, resolved),
        Commands::Diff(args) => diff::handle(args, resolved),
        Commands::Summary(args) => summary::handle(args, resolved),
    }
}
