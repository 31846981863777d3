//! Constructor for already separated `{ measures, productFactors, edges }`
//! documents, as handed in by callers that load measures lazily.

use piq_types::{MeasureView, ProductFactor, ProductFactorView, QualityAspect, QualityIndex};
use serde_json::{Map, Value};

use crate::builder::{DESCRIPTION_FIELDS, ReportBuilder, VALUE_FIELDS};
use crate::nested::BENCHMARK_FIELDS;
use crate::node::{count_field, field, number, number_field, rows, text_field, thresholds};

const LOG_TARGET: &str = "extract";

const FACTOR_SECTIONS: &[&str] = &["productFactors", "product_factors"];
const ASPECT_SECTIONS: &[&str] = &["qualityAspects", "quality_aspects", "aspects"];
const PF_MEASURE_EDGES: &[&str] = &["pfMeasure", "pf_measure", "productFactorMeasure", "product_factor_measure"];
const MEASURE_DIAGNOSTIC_EDGES: &[&str] = &["measureDiagnostic", "measure_diagnostic"];

pub(crate) fn build(root: &Map<String, Value>) -> ReportBuilder {
    let mut builder = ReportBuilder::default();

    builder.tqi = root.get("tqi").and_then(read_tqi);

    for (key, obj) in rows(root.get("diagnostics")) {
        builder.add_diagnostic(key, obj);
    }

    for (key, obj) in rows(root.get("measures")) {
        let name = text_field(obj, &["name"])
            .or_else(|| key.map(str::to_string))
            .unwrap_or_default();
        let view = MeasureView {
            id: text_field(obj, &["id"])
                .or_else(|| key.map(str::to_string))
                .unwrap_or_else(|| name.clone()),
            name,
            description: text_field(obj, DESCRIPTION_FIELDS),
            score: number_field(obj, &["score", "value"]),
            weight: number_field(obj, &["weight"]),
            thresholds: thresholds(obj.get("thresholds")),
        };
        builder.add_measure(&view);
    }

    let edges = root.get("edges").and_then(Value::as_object);

    for (_, row) in edge_rows(edges, PF_MEASURE_EDGES) {
        let factor_id = text_field(row, &["productFactorId", "product_factor_id", "pfId", "pf_id"]);
        let measure_id = text_field(row, &["measureId", "measure_id"]);
        let (Some(factor_id), Some(measure_id)) = (factor_id, measure_id) else {
            log::debug!(target: LOG_TARGET, "Skipping PF-Measure edge without both ends");
            continue;
        };
        let weight = number_field(row, &["weight"]);
        if let Some(measure) = builder.model.measures.get_mut(&measure_id)
            && measure.weight.is_none()
        {
            measure.weight = weight;
        }
        builder.link_measure(&factor_id, &measure_id, weight);
    }

    for (_, row) in edge_rows(edges, MEASURE_DIAGNOSTIC_EDGES) {
        let measure_id = text_field(row, &["measureId", "measure_id"]);
        let diagnostic_id = text_field(row, &["diagnosticId", "diagnostic_id"]);
        if let (Some(measure_id), Some(diagnostic_id)) = (measure_id, diagnostic_id) {
            builder.link_diagnostic(&measure_id, &diagnostic_id);
        }
    }

    let factors = field(root, FACTOR_SECTIONS);
    let mut views: Vec<(Option<String>, ProductFactorView)> = Vec::new();
    for (key, obj) in rows(factors) {
        let id = text_field(obj, &["id"])
            .or_else(|| key.map(str::to_string))
            .or_else(|| text_field(obj, &["name"]))
            .unwrap_or_default();
        let name = text_field(obj, &["name"]).unwrap_or_else(|| id.clone());
        let benchmark_size = count_field(obj, BENCHMARK_FIELDS)
            .unwrap_or_else(|| derived_benchmark_size(&builder, &id));
        let factor = ProductFactor {
            id: id.clone(),
            name: name.clone(),
            value: number_field(obj, VALUE_FIELDS),
            description: text_field(obj, DESCRIPTION_FIELDS),
            benchmark_size,
            aspect_name: None,
        };
        let view = ProductFactorView {
            id,
            name,
            value: factor.value,
            description: factor.description.clone(),
            benchmark_size,
            measures: None,
        };
        builder.add_factor(factor);
        views.push((text_field(obj, &["aspectName", "aspect_name", "aspect"]), view));
    }

    for (key, node) in rows(field(root, ASPECT_SECTIONS)) {
        let name = text_field(node, &["name"])
            .or_else(|| key.map(str::to_string))
            .unwrap_or_default();
        builder.by_aspect.entry(name.clone()).or_default();
        builder.aspects.push(QualityAspect {
            name,
            score: number_field(node, VALUE_FIELDS),
        });
    }

    for (aspect, view) in &views {
        let Some(aspect) = aspect else { continue };
        if !builder.aspects.iter().any(|a| &a.name == aspect) {
            // Aspect known only through its factors: score unknown.
            builder.aspects.push(QualityAspect {
                name: aspect.clone(),
                score: None,
            });
        }
        builder.assign_aspect(aspect, view);
    }

    builder
}

fn edge_rows<'a>(
    edges: Option<&'a Map<String, Value>>,
    names: &[&str],
) -> Vec<(Option<&'a str>, &'a Map<String, Value>)> {
    rows(edges.and_then(|e| field(e, names)))
}

/// Benchmark size from the first edge-linked measure with thresholds, in
/// edge order.
fn derived_benchmark_size(builder: &ReportBuilder, factor_id: &str) -> usize {
    builder
        .model
        .pf_measure_edges
        .iter()
        .filter(|edge| edge.product_factor_id == factor_id)
        .filter_map(|edge| builder.model.measures.get(&edge.measure_id))
        .find(|m| !m.thresholds.is_empty())
        .map_or(0, |m| m.thresholds.len())
}

fn read_tqi(section: &Value) -> Option<QualityIndex> {
    match section {
        Value::Object(obj) => Some(QualityIndex {
            name: text_field(obj, &["name"]).unwrap_or_else(|| "tqi".to_string()),
            score: number_field(obj, VALUE_FIELDS),
        }),
        scalar => number(Some(scalar)).map(|score| QualityIndex {
            name: "tqi".to_string(),
            score: Some(score),
        }),
    }
}
