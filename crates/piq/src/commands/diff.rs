use std::path::Path;

use anyhow::{Context, Result, bail};
use piq_config::DiffArgs;
use piq_diff::{reconcile, reconcile_pair};
use piq_settings::ExtractSettings;

use crate::config::ResolvedConfig;
use crate::io::{print_json, read_document};

pub(crate) fn handle(args: DiffArgs, resolved: &ResolvedConfig) -> Result<()> {
    if args.left.as_os_str() == "-" && args.right.as_os_str() == "-" {
        bail!("Only one side of a diff can be read from stdin.");
    }

    let settings = &resolved.settings.extract;
    let left = load(&args.left, settings)?;
    let right = load(&args.right, settings)?;

    if args.symmetric {
        print_json(&reconcile_pair(&left, &right), resolved.pretty)
    } else {
        print_json(&reconcile(&left, &right), resolved.pretty)
    }
}

fn load(path: &Path, settings: &ExtractSettings) -> Result<piq_types::NormalizedReport> {
    let document = read_document(path)?;
    piq_extract::extract_with(&document, settings)
        .with_context(|| format!("Failed to load diff source '{}'", path.display()))
}
