//! Vulnerability findings and their fix-state normalization.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tri-state fix status of a finding.
///
/// Report generators disagree on how they spell this (booleans, `"true"`,
/// `"Fixed"`, `"not fixed"`), so every spelling collapses into one of three
/// states before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FixedState {
    Fixed,
    NotFixed,
    #[default]
    Unknown,
}

impl FixedState {
    /// Parse a textual fix status. Case and surrounding whitespace are ignored.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "fixed" => FixedState::Fixed,
            "false" | "not fixed" | "notfixed" | "not_fixed" => FixedState::NotFixed,
            _ => FixedState::Unknown,
        }
    }

    /// Normalize an arbitrary JSON value. Anything that is neither a boolean
    /// nor a recognized string is [`FixedState::Unknown`].
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(true) => FixedState::Fixed,
            Value::Bool(false) => FixedState::NotFixed,
            Value::String(s) => FixedState::parse(s),
            _ => FixedState::Unknown,
        }
    }
}

impl std::fmt::Display for FixedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FixedState::Fixed => write!(f, "fixed"),
            FixedState::NotFixed => write!(f, "notfixed"),
            FixedState::Unknown => write!(f, "unknown"),
        }
    }
}

/// One tool's score for a finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolScore {
    pub tool: String,
    pub score: Option<f64>,
}

/// A specific vulnerability (CVE or GHSA) reachable from a diagnostic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Finding {
    pub id: String,
    /// Affected package name.
    pub vuln_source: Option<String>,
    pub vuln_source_version: Option<String>,
    pub fixed: FixedState,
    pub fixed_version: Option<String>,
    pub description: Option<String>,
    pub alias: Option<String>,
    /// First diagnostic the finding was discovered under.
    pub diagnostic_id: Option<String>,
    pub by_tool: Vec<ToolScore>,
}

impl Finding {
    /// Distinct tool names that scored this finding.
    ///
    /// Order and duplicates in `by_tool` do not matter.
    pub fn tool_names(&self) -> BTreeSet<&str> {
        self.by_tool.iter().map(|t| t.tool.as_str()).collect()
    }
}
