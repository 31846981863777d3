use anyhow::{Context, Result};
use piq_config::ExtractArgs;

use crate::config::ResolvedConfig;
use crate::io::{print_json, read_document};

pub(crate) fn handle(args: ExtractArgs, resolved: &ResolvedConfig) -> Result<()> {
    let document = read_document(&args.input)?;
    let report = piq_extract::extract_with(&document, &resolved.settings.extract)
        .with_context(|| format!("Failed to extract report '{}'", args.input.display()))?;
    print_json(&report, resolved.pretty)
}
