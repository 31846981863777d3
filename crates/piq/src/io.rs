use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

/// Read and parse a JSON document. `-` reads stdin.
pub(crate) fn read_document(path: &Path) -> Result<Value> {
    let text = if path.as_os_str() == "-" {
        std::io::read_to_string(std::io::stdin()).context("Failed to read report from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read report '{}'", path.display()))?
    };
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse report '{}' as JSON", path.display()))
}

pub(crate) fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
