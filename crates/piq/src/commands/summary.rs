use anyhow::{Context, Result};
use piq_config::SummaryArgs;

use crate::config::ResolvedConfig;
use crate::io::{print_json, read_document};

pub(crate) fn handle(args: SummaryArgs, resolved: &ResolvedConfig) -> Result<()> {
    let document = read_document(&args.input)?;
    let summary = piq_extract::summarize_with(&document, &resolved.settings.extract)
        .with_context(|| format!("Failed to summarize report '{}'", args.input.display()))?;
    print_json(&summary, resolved.pretty)
}
