//! Entity matching between two normalized reports.

use std::collections::{BTreeMap, BTreeSet};

use piq_types::{Diagnostic, Finding, MeasureView, NormalizedReport, ProductFactor};
use serde_json::Value;

use crate::tolerance::approx_eq;
use crate::types::{
    DiffError, DiffResult, FindingField, FindingPeer, MeasureField, MeasurePeer, PairDiff,
    ProductFactorField, ProductFactorPeer, Side,
};

const LOG_TARGET: &str = "reconcile";

/// Compare `here` against `there`.
///
/// Product factors match by name, measures by name under a matched factor,
/// findings and diagnostics by id. Missing sets list what `here` has and
/// `there` lacks; peers record `there`'s values for every matched entity.
pub fn reconcile(here: &NormalizedReport, there: &NormalizedReport) -> DiffResult {
    let mut diff = DiffResult::default();

    reconcile_product_factors(here, there, &mut diff);
    reconcile_findings(here, there, &mut diff);
    reconcile_diagnostics(here, there, &mut diff);

    log::debug!(
        target: LOG_TARGET,
        "Reconciled: {} differing / {} missing product factors, {} differing / {} missing measures, \
         {} differing / {} missing findings, {} differing / {} missing diagnostics",
        diff.differing_product_factors.len(),
        diff.missing_product_factors.len(),
        diff.differing_measures.len(),
        diff.missing_measures.len(),
        diff.differing_findings.len(),
        diff.missing_findings.len(),
        diff.differing_diagnostics.len(),
        diff.missing_diagnostics.len()
    );
    diff
}

/// Compare two reports in both directions.
pub fn reconcile_pair(left: &NormalizedReport, right: &NormalizedReport) -> PairDiff {
    PairDiff {
        forward: reconcile(left, right),
        backward: reconcile(right, left),
    }
}

/// Compare two serialized reports.
///
/// # Errors
///
/// [`DiffError::MissingModel`] when a side is `null`, and
/// [`DiffError::InvalidModel`] when it does not deserialize as a
/// [`NormalizedReport`].
pub fn reconcile_json(left: &Value, right: &Value) -> Result<DiffResult, DiffError> {
    let left = parse_side(left, Side::Left)?;
    let right = parse_side(right, Side::Right)?;
    Ok(reconcile(&left, &right))
}

fn parse_side(value: &Value, side: Side) -> Result<NormalizedReport, DiffError> {
    if value.is_null() {
        return Err(DiffError::MissingModel { side });
    }
    serde_json::from_value(value.clone()).map_err(|source| DiffError::InvalidModel { side, source })
}

/// Product factors keyed by name. With repeated names the lowest id wins,
/// matching [`NormalizedReport::factor_by_name`].
fn factors_by_name(report: &NormalizedReport) -> BTreeMap<&str, &ProductFactor> {
    let mut by_name = BTreeMap::new();
    for factor in report.relational.product_factors.values() {
        by_name.entry(factor.name.as_str()).or_insert(factor);
    }
    by_name
}

fn reconcile_product_factors(here: &NormalizedReport, there: &NormalizedReport, diff: &mut DiffResult) {
    let theirs = factors_by_name(there);
    for (name, factor) in factors_by_name(here) {
        let Some(&peer) = theirs.get(name) else {
            diff.missing_product_factors.insert(name.to_string());
            continue;
        };

        let mut fields = BTreeSet::new();
        if !approx_eq(factor.value, peer.value) {
            fields.insert(ProductFactorField::Value);
        }
        if factor.benchmark_size != peer.benchmark_size {
            fields.insert(ProductFactorField::BenchmarkSize);
        }
        if !fields.is_empty() {
            diff.differing_product_factors.insert(name.to_string());
            diff.product_factor_fields.insert(name.to_string(), fields);
        }
        diff.product_factor_peers.insert(
            name.to_string(),
            ProductFactorPeer {
                value: peer.value,
                benchmark_size: peer.benchmark_size,
            },
        );

        reconcile_measures(
            name,
            &here.measures_of(factor),
            &there.measures_of(peer),
            diff,
        );
    }
}

/// Compare the measures of one matched factor. A repeated measure name keeps
/// its first occurrence on either side.
fn reconcile_measures(
    factor_name: &str,
    ours: &[MeasureView],
    theirs: &[MeasureView],
    diff: &mut DiffResult,
) {
    let mut peers: BTreeMap<&str, &MeasureView> = BTreeMap::new();
    for measure in theirs {
        peers.entry(measure.name.as_str()).or_insert(measure);
    }

    let mut seen = BTreeSet::new();
    for measure in ours {
        if !seen.insert(measure.name.as_str()) {
            continue;
        }
        let key = format!("{factor_name}::{}", measure.name);
        let Some(peer) = peers.get(measure.name.as_str()) else {
            diff.missing_measures.insert(key);
            continue;
        };

        let mut fields = BTreeSet::new();
        if !approx_eq(measure.score, peer.score) {
            fields.insert(MeasureField::Score);
        }
        if !approx_eq(measure.weight, peer.weight) {
            fields.insert(MeasureField::Weight);
        }
        if !fields.is_empty() {
            diff.differing_measures.insert(key.clone());
            diff.measure_fields.insert(key.clone(), fields);
        }
        diff.measure_peers.insert(
            key,
            MeasurePeer {
                score: peer.score,
                weight: peer.weight,
            },
        );
    }
}

fn reconcile_findings(here: &NormalizedReport, there: &NormalizedReport, diff: &mut DiffResult) {
    for (id, finding) in &here.relational.findings {
        let Some(peer) = there.relational.findings.get(id) else {
            diff.missing_findings.insert(id.clone());
            continue;
        };

        let fields = finding_fields(finding, peer);
        if !fields.is_empty() {
            diff.differing_findings.insert(id.clone());
            diff.finding_fields.insert(id.clone(), fields);
        }
        diff.finding_peers.insert(
            id.clone(),
            FindingPeer {
                vuln_source: peer.vuln_source.clone(),
                vuln_source_version: peer.vuln_source_version.clone(),
                fixed: peer.fixed,
                fixed_version: peer.fixed_version.clone(),
                by_tool: peer.tool_names().into_iter().map(str::to_string).collect(),
            },
        );
    }
}

fn finding_fields(a: &Finding, b: &Finding) -> BTreeSet<FindingField> {
    let mut fields = BTreeSet::new();
    if a.vuln_source != b.vuln_source {
        fields.insert(FindingField::VulnSource);
    }
    if a.vuln_source_version != b.vuln_source_version {
        fields.insert(FindingField::VulnSourceVersion);
    }
    if a.fixed != b.fixed {
        fields.insert(FindingField::Fixed);
    }
    if a.fixed_version != b.fixed_version {
        fields.insert(FindingField::FixedVersion);
    }
    if a.tool_names() != b.tool_names() {
        fields.insert(FindingField::ByTool);
    }
    fields
}

fn reconcile_diagnostics(here: &NormalizedReport, there: &NormalizedReport, diff: &mut DiffResult) {
    for (id, diagnostic) in &here.relational.diagnostics {
        match there.relational.diagnostics.get(id) {
            None => {
                diff.missing_diagnostics.insert(id.clone());
            }
            Some(peer) if !same_diagnostic(diagnostic, peer) => {
                diff.differing_diagnostics.insert(id.clone());
            }
            Some(_) => {}
        }
    }
}

fn same_diagnostic(a: &Diagnostic, b: &Diagnostic) -> bool {
    a.name == b.name
        && a.tool_name == b.tool_name
        && a.description == b.description
        && approx_eq(a.value, b.value)
}
