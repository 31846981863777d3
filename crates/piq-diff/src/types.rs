//! Diff result and error types.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use piq_types::FixedState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Product factor fields compared across reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProductFactorField {
    Value,
    BenchmarkSize,
}

/// Measure fields compared across reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeasureField {
    Score,
    Weight,
}

/// Finding fields compared across reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FindingField {
    VulnSource,
    VulnSourceVersion,
    Fixed,
    FixedVersion,
    ByTool,
}

/// Right-side values of a matched product factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFactorPeer {
    pub value: Option<f64>,
    pub benchmark_size: usize,
}

/// Right-side values of a matched measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurePeer {
    pub score: Option<f64>,
    pub weight: Option<f64>,
}

/// Right-side values of a matched finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingPeer {
    pub vuln_source: Option<String>,
    pub vuln_source_version: Option<String>,
    pub fixed: FixedState,
    pub fixed_version: Option<String>,
    pub by_tool: BTreeSet<String>,
}

/// What changed going from one report ("here") to another ("there").
///
/// The result is directional: `missing*` sets hold entities present here and
/// absent there. Entities present only on the other side show up in the
/// `missing*` sets of the reverse diff. Measure keys are
/// `"<factor name>::<measure name>"` so equally named measures under
/// different factors stay distinct.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiffResult {
    pub differing_product_factors: BTreeSet<String>,
    pub missing_product_factors: BTreeSet<String>,
    pub product_factor_fields: BTreeMap<String, BTreeSet<ProductFactorField>>,
    pub product_factor_peers: BTreeMap<String, ProductFactorPeer>,

    pub differing_measures: BTreeSet<String>,
    pub missing_measures: BTreeSet<String>,
    pub measure_fields: BTreeMap<String, BTreeSet<MeasureField>>,
    pub measure_peers: BTreeMap<String, MeasurePeer>,

    pub differing_findings: BTreeSet<String>,
    pub missing_findings: BTreeSet<String>,
    pub finding_fields: BTreeMap<String, BTreeSet<FindingField>>,
    pub finding_peers: BTreeMap<String, FindingPeer>,

    pub differing_diagnostics: BTreeSet<String>,
    pub missing_diagnostics: BTreeSet<String>,
}

impl DiffResult {
    /// True when nothing differs and nothing is missing. Peers are ignored.
    pub fn is_empty(&self) -> bool {
        self.differing_product_factors.is_empty()
            && self.missing_product_factors.is_empty()
            && self.differing_measures.is_empty()
            && self.missing_measures.is_empty()
            && self.differing_findings.is_empty()
            && self.missing_findings.is_empty()
            && self.differing_diagnostics.is_empty()
            && self.missing_diagnostics.is_empty()
    }
}

/// Both directions of a comparison.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PairDiff {
    /// Left compared against right.
    pub forward: DiffResult,
    /// Right compared against left.
    pub backward: DiffResult,
}

impl PairDiff {
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty() && self.backward.is_empty()
    }
}

/// Which input of a comparison an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// Errors from comparing serialized reports.
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("No {side} report to compare")]
    MissingModel { side: Side },

    #[error("The {side} report is not a normalized report: {source}")]
    InvalidModel {
        side: Side,
        #[source]
        source: serde_json::Error,
    },
}
