//! Classification and coercion of untyped JSON nodes.
//!
//! Report generators are not consistent about field names or value types, so
//! every read goes through a small set of tolerant accessors: numbers may be
//! strings, names may be missing, and each field has a few accepted aliases.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

static VULN_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:CVE-\d{4}-\d+|GHSA-[0-9A-Za-z]{4}-[0-9A-Za-z]{4}-[0-9A-Za-z]{4})$")
        .expect("valid regex literal")
});

/// Whether `s` is a CVE or GHSA identifier.
pub fn is_vulnerability_id(s: &str) -> bool {
    VULN_ID.is_match(s.trim())
}

/// What an object node represents in a report tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeKind {
    /// A vulnerability finding with its identifier.
    Finding(String),
    Diagnostic,
    Measure,
    /// Anything else: section maps, weight maps, strategy blobs.
    Container,
}

const FINDING_ID_FIELDS: &[&str] = &["id", "name", "vulnerabilityId", "vulnerability_id", "cve"];
pub(crate) const TOOL_FIELDS: &[&str] = &["toolName", "tool_name", "tool"];

/// Classify an object reached under `key` (absent for array elements).
pub(crate) fn classify(key: Option<&str>, obj: &Map<String, Value>) -> NodeKind {
    if let Some(id) = finding_id(key, obj) {
        return NodeKind::Finding(id);
    }
    if is_diagnostic(key, obj) {
        return NodeKind::Diagnostic;
    }
    if obj.contains_key("value") || obj.contains_key("score") {
        return NodeKind::Measure;
    }
    NodeKind::Container
}

fn finding_id(key: Option<&str>, obj: &Map<String, Value>) -> Option<String> {
    if let Some(key) = key
        && is_vulnerability_id(key)
    {
        return Some(key.trim().to_string());
    }
    FINDING_ID_FIELDS
        .iter()
        .filter_map(|f| obj.get(*f).and_then(Value::as_str))
        .find(|s| is_vulnerability_id(s))
        .map(|s| s.trim().to_string())
}

fn is_diagnostic(key: Option<&str>, obj: &Map<String, Value>) -> bool {
    if TOOL_FIELDS[..2].iter().any(|f| obj.contains_key(*f)) {
        return true;
    }
    let mentions = |s: &str| s.to_ascii_lowercase().contains("diagnostic");
    key.is_some_and(mentions) || obj.get("name").and_then(Value::as_str).is_some_and(mentions)
}

/// Id of a diagnostic node: its `id` field, else the key it sits under,
/// else its `name`.
pub(crate) fn diagnostic_id(key: Option<&str>, obj: &Map<String, Value>) -> String {
    text_field(obj, &["id"])
        .or_else(|| key.map(str::to_string))
        .or_else(|| text_field(obj, &["name"]))
        .unwrap_or_default()
}

/// First present, non-null field among `names`.
pub(crate) fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|n| obj.get(*n))
        .find(|v| !v.is_null())
}

/// Coerce a value to a finite number. Numeric strings are accepted; every
/// other type is absent.
pub(crate) fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

pub(crate) fn number_field(obj: &Map<String, Value>, names: &[&str]) -> Option<f64> {
    number(field(obj, names))
}

/// Coerce a scalar to text. Arrays of strings are joined with `", "`.
pub(crate) fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

pub(crate) fn text_field(obj: &Map<String, Value>, names: &[&str]) -> Option<String> {
    text(field(obj, names))
}

/// Read a threshold list. Non-numeric entries become `0.0` so the list keeps
/// its length, which doubles as the benchmark size.
pub(crate) fn thresholds(value: Option<&Value>) -> Vec<f64> {
    match value {
        Some(Value::Array(items)) => items.iter().map(|v| number(Some(v)).unwrap_or(0.0)).collect(),
        _ => Vec::new(),
    }
}

/// An explicit, non-negative count field.
pub(crate) fn count_field(obj: &Map<String, Value>, names: &[&str]) -> Option<usize> {
    let n = number_field(obj, names)?;
    (n >= 0.0).then(|| n as usize)
}

/// Iterate the rows of a section that is either an object keyed by id or an
/// array of objects. Non-object rows are skipped.
pub(crate) fn rows(section: Option<&Value>) -> Vec<(Option<&str>, &Map<String, Value>)> {
    match section {
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(k, v)| v.as_object().map(|o| (Some(k.as_str()), o)))
            .collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_object().map(|o| (None, o)))
            .collect(),
        _ => Vec::new(),
    }
}

/// Short name of a JSON value's type, for error messages.
pub(crate) fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
