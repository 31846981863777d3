//! # piq-extract
//!
//! **Tier 1 (Normalization)**
//!
//! Turns one raw quality-model report document into a [`NormalizedReport`].
//!
//! Two document shapes are accepted and converge on the same model:
//! * nested: `{ "factors": { "tqi", "quality_aspects", "product_factors" } }`
//! * relational: `{ "measures", "productFactors", "edges" }`, as held by
//!   callers that load measures without their parent associations.
//!
//! ## What belongs here
//! * Document traversal and field coercion
//! * Shape detection
//! * The document fingerprint used to key cached summaries
//!
//! ## What does NOT belong here
//! * Report comparison (use piq-diff)
//! * File I/O or CLI parsing

mod builder;
mod error;
mod nested;
mod node;
mod relational;
mod scan;

use piq_settings::ExtractSettings;
use piq_types::{NormalizedReport, ScoreSummary};
use serde_json::{Map, Value};

pub use error::ExtractError;
pub use node::is_vulnerability_id;

const LOG_TARGET: &str = "extract";

/// Top-level sections that mark a relational document.
const RELATIONAL_SECTIONS: &[&str] = &["measures", "productFactors", "product_factors", "edges"];

/// Layout of a report document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    /// Everything hangs off a `factors` section.
    Nested,
    /// Flat entity sections joined by an `edges` section.
    Relational,
}

/// Detect the shape of a document.
///
/// A `factors` section means nested; any relational section means
/// relational, with its absent siblings treated as empty.
///
/// # Errors
///
/// [`ExtractError::NotAnObject`] for a non-object document and
/// [`ExtractError::UnrecognizedShape`] for an object with neither kind of
/// section.
pub fn detect_shape(document: &Value) -> Result<DocumentShape, ExtractError> {
    let root = as_root(document)?;
    if root.contains_key("factors") {
        Ok(DocumentShape::Nested)
    } else if RELATIONAL_SECTIONS.iter().any(|s| root.contains_key(*s)) {
        Ok(DocumentShape::Relational)
    } else {
        Err(ExtractError::UnrecognizedShape)
    }
}

/// Normalize a document with default settings.
pub fn extract(document: &Value) -> Result<NormalizedReport, ExtractError> {
    extract_with(document, &ExtractSettings::default())
}

/// Normalize a document.
///
/// # Errors
///
/// Fails as [`detect_shape`] does. Once the shape is known, missing or
/// malformed sections never fail; they come out empty.
pub fn extract_with(
    document: &Value,
    settings: &ExtractSettings,
) -> Result<NormalizedReport, ExtractError> {
    let root = as_root(document)?;
    let report = match detect_shape(document)? {
        DocumentShape::Nested => from_nested(root, settings),
        DocumentShape::Relational => from_relational(root),
    };
    Ok(report)
}

/// Build a report from a nested document's root object.
pub fn from_nested(root: &Map<String, Value>, settings: &ExtractSettings) -> NormalizedReport {
    log::debug!(target: LOG_TARGET, "Extracting nested document");
    let factors = root.get("factors").and_then(Value::as_object);
    let builder = nested::build(root, factors, settings);
    builder.finish(scan::scan_findings(root))
}

/// Build a report from a relational document's root object.
pub fn from_relational(root: &Map<String, Value>) -> NormalizedReport {
    log::debug!(target: LOG_TARGET, "Extracting relational document");
    let builder = relational::build(root);
    builder.finish(scan::scan_findings(root))
}

/// BLAKE3 hex digest of a document's JSON bytes.
///
/// Documents are serialized in their own key order, so two parses of the
/// same file fingerprint identically.
pub fn fingerprint(document: &Value) -> String {
    let bytes = serde_json::to_vec(document).unwrap_or_default();
    blake3::hash(&bytes).to_hex().to_string()
}

/// Extract a document and reduce it to its [`ScoreSummary`].
pub fn summarize(document: &Value) -> Result<ScoreSummary, ExtractError> {
    summarize_with(document, &ExtractSettings::default())
}

pub fn summarize_with(
    document: &Value,
    settings: &ExtractSettings,
) -> Result<ScoreSummary, ExtractError> {
    let report = extract_with(document, settings)?;
    Ok(report.summary(fingerprint(document)))
}

fn as_root(document: &Value) -> Result<&Map<String, Value>, ExtractError> {
    document.as_object().ok_or(ExtractError::NotAnObject {
        found: node::kind_name(document),
    })
}
