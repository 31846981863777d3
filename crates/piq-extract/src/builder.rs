//! Accumulator shared by the nested and relational constructors.

use std::collections::BTreeMap;

use piq_types::{
    Diagnostic, Finding, Measure, MeasureDiagnosticEdge, MeasureView, NormalizedReport,
    PfMeasureEdge, ProductFactor, ProductFactorView, QualityAspect, QualityIndex,
    RelationalModel, SCHEMA_VERSION,
};
use serde_json::{Map, Value};

use crate::node::{TOOL_FIELDS, diagnostic_id, number_field, text_field};

const LOG_TARGET: &str = "extract";

pub(crate) const VALUE_FIELDS: &[&str] = &["value", "score"];
pub(crate) const DESCRIPTION_FIELDS: &[&str] = &["description"];

/// Both document shapes feed the same builder, so the emitted model does not
/// depend on which shape the caller handed in.
#[derive(Debug, Default)]
pub(crate) struct ReportBuilder {
    pub(crate) tqi: Option<QualityIndex>,
    pub(crate) aspects: Vec<QualityAspect>,
    pub(crate) by_aspect: BTreeMap<String, Vec<ProductFactorView>>,
    pub(crate) measures_by_factor: BTreeMap<String, Vec<MeasureView>>,
    pub(crate) model: RelationalModel,
}

impl ReportBuilder {
    /// Table a product factor. The first factor with a given id wins.
    pub(crate) fn add_factor(&mut self, factor: ProductFactor) {
        if self.model.product_factors.contains_key(&factor.id) {
            log::debug!(target: LOG_TARGET, "Duplicate product factor id '{}' ignored", factor.id);
            return;
        }
        self.model.product_factors.insert(factor.id.clone(), factor);
    }

    /// Keep a factor's inflated measure list. The first list for an id wins,
    /// as in the factor table.
    pub(crate) fn add_factor_measures(&mut self, view: &ProductFactorView) {
        if let Some(measures) = &view.measures {
            self.measures_by_factor
                .entry(view.id.clone())
                .or_insert_with(|| measures.clone());
        }
    }

    /// Record that `aspect` declares the factor behind `view`.
    ///
    /// The factor's `aspect_name` is set by the first declaring aspect only;
    /// the view is listed under every declaring aspect.
    pub(crate) fn assign_aspect(&mut self, aspect: &str, view: &ProductFactorView) {
        if let Some(factor) = self.model.product_factors.get_mut(&view.id)
            && factor.aspect_name.is_none()
        {
            factor.aspect_name = Some(aspect.to_string());
        }
        let views = self.by_aspect.entry(aspect.to_string()).or_default();
        if !views.iter().any(|v| v.id == view.id) {
            views.push(view.clone());
        }
    }

    /// Table a measure seen under some factor. The first occurrence of an id
    /// wins; a later one with a different description is only logged.
    pub(crate) fn add_measure(&mut self, view: &MeasureView) {
        if let Some(existing) = self.model.measures.get(&view.id) {
            if existing.description != view.description {
                log::debug!(
                    target: LOG_TARGET,
                    "Measure '{}' appears with differing descriptions; keeping the first",
                    view.id
                );
            }
            return;
        }
        self.model.measures.insert(
            view.id.clone(),
            Measure {
                id: view.id.clone(),
                name: view.name.clone(),
                description: view.description.clone(),
                score: view.score,
                weight: view.weight,
                thresholds: view.thresholds.clone(),
            },
        );
    }

    /// Table a diagnostic node and return its id.
    pub(crate) fn add_diagnostic(&mut self, key: Option<&str>, obj: &Map<String, Value>) -> String {
        let id = diagnostic_id(key, obj);

        self.model
            .diagnostics
            .entry(id.clone())
            .or_insert_with(|| Diagnostic {
                id: id.clone(),
                name: text_field(obj, &["name"]).unwrap_or_else(|| id.clone()),
                tool_name: text_field(obj, TOOL_FIELDS),
                value: number_field(obj, VALUE_FIELDS),
                description: text_field(obj, DESCRIPTION_FIELDS),
            });
        id
    }

    pub(crate) fn link_measure(&mut self, factor_id: &str, measure_id: &str, weight: Option<f64>) {
        self.model.pf_measure_edges.push(PfMeasureEdge {
            product_factor_id: factor_id.to_string(),
            measure_id: measure_id.to_string(),
            weight,
        });
    }

    pub(crate) fn link_diagnostic(&mut self, measure_id: &str, diagnostic_id: &str) {
        self.model
            .measure_diagnostic_edges
            .push(MeasureDiagnosticEdge {
                measure_id: measure_id.to_string(),
                diagnostic_id: diagnostic_id.to_string(),
            });
    }

    pub(crate) fn finish(mut self, findings: BTreeMap<String, Finding>) -> NormalizedReport {
        self.model.findings = findings;
        self.model.normalize_edges();

        log::debug!(
            target: LOG_TARGET,
            "Normalized report: {} aspects, {} product factors, {} measures, {} diagnostics, {} findings",
            self.aspects.len(),
            self.model.product_factors.len(),
            self.model.measures.len(),
            self.model.diagnostics.len(),
            self.model.findings.len()
        );

        NormalizedReport {
            schema_version: SCHEMA_VERSION,
            tqi: self.tqi,
            aspect_scores: self.aspects,
            product_factors_by_aspect: self.by_aspect,
            measures_by_factor: self.measures_by_factor,
            relational: self.model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn view(id: &str) -> ProductFactorView {
        ProductFactorView {
            id: id.into(),
            name: id.into(),
            ..Default::default()
        }
    }

    #[test]
    fn first_aspect_owns_factor_but_all_list_it() {
        let mut builder = ReportBuilder::default();
        builder.add_factor(ProductFactor {
            id: "pf".into(),
            name: "pf".into(),
            ..Default::default()
        });
        builder.assign_aspect("Security", &view("pf"));
        builder.assign_aspect("Reliability", &view("pf"));
        builder.assign_aspect("Security", &view("pf"));

        assert_eq!(
            builder.model.product_factors["pf"].aspect_name.as_deref(),
            Some("Security")
        );
        assert_eq!(builder.by_aspect["Security"].len(), 1);
        assert_eq!(builder.by_aspect["Reliability"].len(), 1);
    }

    #[test]
    fn first_measure_list_per_factor_wins() {
        let mut builder = ReportBuilder::default();
        let measure = |score| MeasureView {
            id: "m".into(),
            name: "m".into(),
            score: Some(score),
            ..Default::default()
        };
        let mut first = view("pf");
        first.measures = Some(vec![measure(0.1)]);
        let mut second = view("pf");
        second.measures = Some(vec![measure(0.9)]);

        builder.add_factor_measures(&view("lazy"));
        builder.add_factor_measures(&first);
        builder.add_factor_measures(&second);

        assert!(!builder.measures_by_factor.contains_key("lazy"));
        assert_eq!(builder.measures_by_factor["pf"][0].score, Some(0.1));
    }

    #[test]
    fn first_measure_occurrence_wins() {
        let mut builder = ReportBuilder::default();
        let first = MeasureView {
            id: "m".into(),
            name: "m".into(),
            description: Some("first".into()),
            score: Some(0.1),
            ..Default::default()
        };
        let second = MeasureView {
            description: Some("second".into()),
            score: Some(0.9),
            ..first.clone()
        };
        builder.add_measure(&first);
        builder.add_measure(&second);
        assert_eq!(
            builder.model.measures["m"].description.as_deref(),
            Some("first")
        );
        assert_eq!(builder.model.measures["m"].score, Some(0.1));
    }

    #[test]
    fn diagnostic_id_prefers_field_then_key() {
        let mut builder = ReportBuilder::default();
        let node = json!({"id": "d-1", "name": "CWE-79", "toolName": "semgrep", "value": "2"});
        let id = builder.add_diagnostic(Some("key"), node.as_object().unwrap());
        assert_eq!(id, "d-1");
        let diag = &builder.model.diagnostics["d-1"];
        assert_eq!(diag.name, "CWE-79");
        assert_eq!(diag.tool_name.as_deref(), Some("semgrep"));
        assert_eq!(diag.value, Some(2.0));

        let node = json!({"toolName": "grype"});
        let id = builder.add_diagnostic(Some("CWE-20 Diagnostic grype"), node.as_object().unwrap());
        assert_eq!(id, "CWE-20 Diagnostic grype");
        assert_eq!(builder.model.diagnostics[&id].name, id);
    }

    #[test]
    fn finish_normalizes_edges() {
        let mut builder = ReportBuilder::default();
        builder.link_measure("pf", "b", Some(0.5));
        builder.link_measure("pf", "a", Some(0.5));
        builder.link_measure("pf", "a", Some(0.1));
        builder.link_diagnostic("a", "d");
        builder.link_diagnostic("a", "d");
        let report = builder.finish(BTreeMap::new());
        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.relational.pf_measure_edges.len(), 2);
        assert_eq!(report.relational.pf_measure_edges[0].measure_id, "a");
        assert_eq!(report.relational.measure_diagnostic_edges.len(), 1);
    }
}
