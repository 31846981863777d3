//! Document-wide discovery of vulnerability findings.
//!
//! Findings can sit at any depth: under a diagnostic, under a measure's
//! sub-measures, or in a side section the generator appended. The scan walks
//! the whole document once with an explicit work stack, so depth is bounded by
//! heap rather than by the call stack.

use std::collections::BTreeMap;

use piq_types::{Finding, FixedState, ToolScore};
use serde_json::{Map, Value};

use crate::node::{
    NodeKind, TOOL_FIELDS, classify, diagnostic_id, field, number, number_field, text,
    text_field,
};

const LOG_TARGET: &str = "scan";

const SOURCE_FIELDS: &[&str] = &["vulnSource", "vuln_source", "package", "packageName"];
const SOURCE_VERSION_FIELDS: &[&str] = &[
    "vulnSourceVersion",
    "vuln_source_version",
    "packageVersion",
    "version",
];
const FIXED_FIELDS: &[&str] = &["fixed", "isFixed"];
const FIXED_VERSION_FIELDS: &[&str] = &["fixedVersion", "fixed_version"];
const ALIAS_FIELDS: &[&str] = &["alias", "aliases"];
const BY_TOOL_FIELDS: &[&str] = &["byTool", "by_tool"];

/// Diagnostic enclosing the nodes below it.
#[derive(Debug)]
struct Enclosing {
    id: String,
    tool: Option<String>,
}

/// Collect every finding below `root`, keyed by vulnerability id.
pub(crate) fn scan_findings(root: &Map<String, Value>) -> BTreeMap<String, Finding> {
    let mut findings: BTreeMap<String, Finding> = BTreeMap::new();
    let mut enclosing: Vec<Enclosing> = Vec::new();
    let mut stack: Vec<(Option<&str>, &Value, Option<usize>)> = root
        .iter()
        .rev()
        .map(|(k, v)| (Some(k.as_str()), v, None))
        .collect();
    let mut visited = 0usize;

    while let Some((key, value, ctx)) = stack.pop() {
        visited += 1;
        let obj = match value {
            Value::Object(obj) => obj,
            Value::Array(items) => {
                stack.extend(items.iter().rev().map(|item| (None, item, ctx)));
                continue;
            }
            _ => continue,
        };

        let child_ctx = match classify(key, obj) {
            NodeKind::Finding(id) => {
                let finding = findings.entry(id.clone()).or_insert_with(|| Finding {
                    id,
                    ..Default::default()
                });
                merge_finding(finding, obj, ctx.map(|i| &enclosing[i]));
                ctx
            }
            NodeKind::Diagnostic => {
                enclosing.push(Enclosing {
                    id: diagnostic_id(key, obj),
                    tool: text_field(obj, TOOL_FIELDS),
                });
                Some(enclosing.len() - 1)
            }
            NodeKind::Measure | NodeKind::Container => ctx,
        };

        stack.extend(
            obj.iter()
                .rev()
                .map(|(k, v)| (Some(k.as_str()), v, child_ctx)),
        );
    }

    log::debug!(
        target: LOG_TARGET,
        "Scanned {} nodes: {} findings under {} diagnostics",
        visited,
        findings.len(),
        enclosing.len()
    );
    findings
}

/// Fold one occurrence of a finding into the accumulated record.
///
/// Fields already set are kept; empty ones are filled from this occurrence.
/// Tool scores accumulate across occurrences, skipping exact repeats.
fn merge_finding(finding: &mut Finding, obj: &Map<String, Value>, ctx: Option<&Enclosing>) {
    fill(&mut finding.vuln_source, text_field(obj, SOURCE_FIELDS));
    fill(
        &mut finding.vuln_source_version,
        text_field(obj, SOURCE_VERSION_FIELDS),
    );
    fill(&mut finding.fixed_version, text_field(obj, FIXED_VERSION_FIELDS));
    fill(&mut finding.description, text_field(obj, &["description"]));
    fill(&mut finding.alias, text_field(obj, ALIAS_FIELDS));

    if finding.fixed == FixedState::Unknown
        && let Some(raw) = field(obj, FIXED_FIELDS)
    {
        finding.fixed = FixedState::from_value(raw);
    }

    if finding.diagnostic_id.is_none() {
        finding.diagnostic_id = ctx.map(|c| c.id.clone());
    }

    for score in tool_scores(obj, ctx) {
        let repeat = finding
            .by_tool
            .iter()
            .any(|s| s.tool == score.tool && s.score == score.score);
        if !repeat {
            finding.by_tool.push(score);
        }
    }
}

fn fill(slot: &mut Option<String>, candidate: Option<String>) {
    if slot.is_none() {
        *slot = candidate;
    }
}

/// Tool scores carried by one occurrence: an explicit `byTool` list, or a
/// single entry naming the finding's own tool (else the enclosing
/// diagnostic's tool) with the node's value.
fn tool_scores(obj: &Map<String, Value>, ctx: Option<&Enclosing>) -> Vec<ToolScore> {
    if let Some(Value::Array(items)) = field(obj, BY_TOOL_FIELDS) {
        return items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|entry| {
                Some(ToolScore {
                    tool: text_field(entry, &["tool", "toolName", "tool_name"])?,
                    score: number_field(entry, &["score", "value"]),
                })
            })
            .collect();
    }

    let tool = text(field(obj, TOOL_FIELDS)).or_else(|| ctx.and_then(|c| c.tool.clone()));
    match tool {
        Some(tool) => vec![ToolScore {
            tool,
            score: number(field(obj, &["value", "score"])),
        }],
        None => Vec::new(),
    }
}
