//! # piq-types
//!
//! **Tier 0 (Report Contract)**
//!
//! Pure data structures for normalized quality-model reports. No I/O or
//! extraction logic.
//!
//! A normalized report has two faces:
//! * convenience views (`aspect_scores`, `product_factors_by_aspect`) that
//!   mirror the nesting of the source document, and
//! * a relational model of flat entity tables plus edge tables, for callers
//!   that hold only partially inflated documents.
//!
//! ## What belongs here
//! * Entity, edge and view types
//! * Lookup helpers over an already built report
//! * The score summary persisted between sessions
//!
//! ## What does NOT belong here
//! * Document traversal (use piq-extract)
//! * Report comparison (use piq-diff)
//! * File I/O

pub mod finding;

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use finding::{Finding, FixedState, ToolScore};

/// Schema version for normalized reports.
pub const SCHEMA_VERSION: u32 = 1;

/// The top-level quality index (TQI) of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIndex {
    pub name: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityAspect {
    pub name: String,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductFactor {
    pub id: String,
    pub name: String,
    pub value: Option<f64>,
    pub description: Option<String>,
    pub benchmark_size: usize,
    /// First aspect that declares this factor, if any.
    pub aspect_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Measure {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub score: Option<f64>,
    /// Weight on the first edge this measure was seen on. Per-factor weights
    /// live on [`PfMeasureEdge`].
    pub weight: Option<f64>,
    pub thresholds: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Diagnostic {
    pub id: String,
    pub name: String,
    pub tool_name: Option<String>,
    pub value: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PfMeasureEdge {
    pub product_factor_id: String,
    pub measure_id: String,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureDiagnosticEdge {
    pub measure_id: String,
    pub diagnostic_id: String,
}

/// A measure as seen from one owning product factor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasureView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub score: Option<f64>,
    pub weight: Option<f64>,
    pub thresholds: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductFactorView {
    pub id: String,
    pub name: String,
    pub value: Option<f64>,
    pub description: Option<String>,
    pub benchmark_size: usize,
    /// `None` when the source only carried relational edges; use
    /// [`NormalizedReport::measures_for`] to resolve measures either way.
    pub measures: Option<Vec<MeasureView>>,
}

/// Flat entity tables keyed by id, plus the edge tables linking them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelationalModel {
    pub product_factors: BTreeMap<String, ProductFactor>,
    pub measures: BTreeMap<String, Measure>,
    pub diagnostics: BTreeMap<String, Diagnostic>,
    pub findings: BTreeMap<String, Finding>,
    pub pf_measure_edges: Vec<PfMeasureEdge>,
    pub measure_diagnostic_edges: Vec<MeasureDiagnosticEdge>,
}

impl RelationalModel {
    /// Sort and deduplicate both edge tables.
    ///
    /// PF-Measure edges are unique per `(factor, measure)` pair; the first
    /// weight seen for a pair is kept.
    pub fn normalize_edges(&mut self) {
        let mut seen = std::collections::BTreeSet::new();
        self.pf_measure_edges
            .retain(|e| seen.insert((e.product_factor_id.clone(), e.measure_id.clone())));
        self.pf_measure_edges.sort_by(|a, b| {
            (&a.product_factor_id, &a.measure_id).cmp(&(&b.product_factor_id, &b.measure_id))
        });

        self.measure_diagnostic_edges.sort();
        self.measure_diagnostic_edges.dedup();
    }
}

/// A report normalized out of one raw document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizedReport {
    pub schema_version: u32,
    pub tqi: Option<QualityIndex>,
    pub aspect_scores: Vec<QualityAspect>,
    pub product_factors_by_aspect: BTreeMap<String, Vec<ProductFactorView>>,
    /// Inflated measure lists keyed by product factor id, for every factor
    /// whose source nested its measures, declared by an aspect or not.
    pub measures_by_factor: BTreeMap<String, Vec<MeasureView>>,
    pub relational: RelationalModel,
}

impl NormalizedReport {
    /// Find a product factor by name. Names are the cross-report identity.
    pub fn factor_by_name(&self, name: &str) -> Option<&ProductFactor> {
        self.relational
            .product_factors
            .values()
            .find(|pf| pf.name == name)
    }

    /// Resolve the measures owned by a product factor, by name.
    pub fn measures_for(&self, factor_name: &str) -> Cow<'_, [MeasureView]> {
        match self.factor_by_name(factor_name) {
            Some(factor) => self.measures_of(factor),
            None => self
                .aspect_view_measures(factor_name)
                .map_or(Cow::Owned(Vec::new()), Cow::Borrowed),
        }
    }

    /// Resolve the measures owned by an already looked up product factor.
    ///
    /// An inflated list wins, first from [`Self::measures_by_factor`], then
    /// from the aspect views; otherwise the list is rebuilt from PF-Measure
    /// edges joined with the measure table, with per-edge weights.
    pub fn measures_of(&self, factor: &ProductFactor) -> Cow<'_, [MeasureView]> {
        if let Some(measures) = self.measures_by_factor.get(&factor.id) {
            return Cow::Borrowed(measures);
        }
        if let Some(measures) = self.aspect_view_measures(&factor.name) {
            return Cow::Borrowed(measures);
        }

        let rebuilt = self
            .relational
            .pf_measure_edges
            .iter()
            .filter(|edge| edge.product_factor_id == factor.id)
            .filter_map(|edge| {
                let measure = self.relational.measures.get(&edge.measure_id)?;
                Some(MeasureView {
                    id: measure.id.clone(),
                    name: measure.name.clone(),
                    description: measure.description.clone(),
                    score: measure.score,
                    weight: edge.weight,
                    thresholds: measure.thresholds.clone(),
                })
            })
            .collect();
        Cow::Owned(rebuilt)
    }

    fn aspect_view_measures(&self, factor_name: &str) -> Option<&[MeasureView]> {
        self.product_factors_by_aspect
            .values()
            .flatten()
            .filter(|view| view.name == factor_name)
            .find_map(|view| view.measures.as_deref())
    }

    /// Number of distinct diagnostics (the CWE count shown on summaries).
    pub fn diagnostic_count(&self) -> usize {
        self.relational.diagnostics.len()
    }

    pub fn finding_count(&self) -> usize {
        self.relational.findings.len()
    }

    /// Build the lightweight summary stored between sessions.
    pub fn summary(&self, fingerprint: impl Into<String>) -> ScoreSummary {
        ScoreSummary {
            fingerprint: fingerprint.into(),
            tqi: self.tqi.as_ref().and_then(|t| t.score),
            aspects: self.aspect_scores.clone(),
            product_factor_count: self.relational.product_factors.len(),
            measure_count: self.relational.measures.len(),
            cwe_count: self.diagnostic_count(),
            finding_count: self.finding_count(),
        }
    }
}

/// Scores and counts of one report, small enough to persist per session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    /// Content hash of the raw document the report was built from.
    pub fingerprint: String,
    pub tqi: Option<f64>,
    pub aspects: Vec<QualityAspect>,
    pub product_factor_count: usize,
    pub measure_count: usize,
    pub cwe_count: usize,
    pub finding_count: usize,
}
