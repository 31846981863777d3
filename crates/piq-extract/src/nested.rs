//! Constructor for nested `{ factors: { tqi, quality_aspects, product_factors } }`
//! documents.

use std::collections::{BTreeSet, HashMap};

use piq_settings::ExtractSettings;
use piq_types::{MeasureView, ProductFactor, ProductFactorView, QualityAspect, QualityIndex};
use serde_json::{Map, Value};

use crate::builder::{DESCRIPTION_FIELDS, ReportBuilder, VALUE_FIELDS};
use crate::node::{NodeKind, classify, count_field, number, number_field, rows, text_field, thresholds};

const LOG_TARGET: &str = "extract";

pub(crate) const BENCHMARK_FIELDS: &[&str] = &["benchmarkSize", "benchmark_size"];

pub(crate) fn build(
    root: &Map<String, Value>,
    factors: Option<&Map<String, Value>>,
    settings: &ExtractSettings,
) -> ReportBuilder {
    let mut builder = ReportBuilder::default();

    for (key, obj) in rows(root.get("diagnostics")) {
        builder.add_diagnostic(key, obj);
    }

    let Some(factors) = factors else {
        return builder;
    };

    builder.tqi = factors.get("tqi").and_then(read_tqi);

    let factor_section = factors.get("product_factors").and_then(Value::as_object);
    let mut built: Vec<(String, ProductFactorView)> = Vec::new();
    for (key, node) in factor_section.into_iter().flatten() {
        if let Some(obj) = node.as_object() {
            let view = build_factor(key, obj, settings, &mut builder);
            built.push((key.clone(), view));
        }
    }

    let mut by_key: HashMap<&str, usize> = HashMap::new();
    let mut by_name: HashMap<&str, usize> = HashMap::new();
    for (idx, (key, view)) in built.iter().enumerate() {
        by_key.entry(key.as_str()).or_insert(idx);
        by_name.entry(view.name.as_str()).or_insert(idx);
    }

    let mut inline: Vec<(String, ProductFactorView)> = Vec::new();
    for (key, node) in factors
        .get("quality_aspects")
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
    {
        let aspect = read_aspect(key, node);
        let declared = node.as_object().map(declared_children).unwrap_or_default();
        builder.by_aspect.entry(aspect.name.clone()).or_default();

        for (child, inline_node) in declared {
            let resolved = by_key
                .get(child.as_str())
                .or_else(|| by_name.get(child.as_str()))
                .map(|&idx| built[idx].1.clone());

            let view = match (resolved, inline_node) {
                (Some(view), _) => view,
                (None, Some(obj)) => {
                    // Aspects may carry their factors inline instead of
                    // referencing the product_factors section.
                    match inline.iter().find(|(k, _)| *k == child) {
                        Some((_, view)) => view.clone(),
                        None => {
                            let view = build_factor(&child, obj, settings, &mut builder);
                            inline.push((child.clone(), view.clone()));
                            view
                        }
                    }
                }
                (None, None) => {
                    log::debug!(
                        target: LOG_TARGET,
                        "Aspect '{}' declares unknown product factor '{}'",
                        aspect.name,
                        child
                    );
                    continue;
                }
            };
            builder.assign_aspect(&aspect.name, &view);
        }

        builder.aspects.push(aspect);
    }

    builder
}

/// The quality index is either a node with a `value`, or a map holding a
/// single named node.
fn read_tqi(section: &Value) -> Option<QualityIndex> {
    let obj = section.as_object()?;
    if VALUE_FIELDS.iter().any(|f| obj.contains_key(*f)) {
        return Some(QualityIndex {
            name: text_field(obj, &["name"]).unwrap_or_else(|| "tqi".to_string()),
            score: number_field(obj, VALUE_FIELDS),
        });
    }
    obj.iter().find_map(|(key, node)| {
        let inner = node.as_object()?;
        VALUE_FIELDS
            .iter()
            .any(|f| inner.contains_key(*f))
            .then(|| QualityIndex {
                name: text_field(inner, &["name"]).unwrap_or_else(|| key.clone()),
                score: number_field(inner, VALUE_FIELDS),
            })
    })
}

fn read_aspect(key: &str, node: &Value) -> QualityAspect {
    match node {
        Value::Object(obj) => QualityAspect {
            name: text_field(obj, &["name"]).unwrap_or_else(|| key.to_string()),
            score: number_field(obj, VALUE_FIELDS),
        },
        scalar => QualityAspect {
            name: key.to_string(),
            score: number(Some(scalar)),
        },
    }
}

/// Child factor references of an aspect, with the inline node when the
/// aspect embeds the factor itself.
fn declared_children(obj: &Map<String, Value>) -> Vec<(String, Option<&Map<String, Value>>)> {
    match obj.get("children") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some((s.clone(), None)),
                Value::Object(o) => {
                    let name = text_field(o, &["name", "id"])?;
                    let inline = o.contains_key("children").then_some(o);
                    Some((name, inline))
                }
                _ => None,
            })
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| (k.clone(), v.as_object()))
            .collect(),
        _ => obj
            .get("weights")
            .and_then(Value::as_object)
            .map(|w| w.keys().map(|k| (k.clone(), None)).collect())
            .unwrap_or_default(),
    }
}

fn build_factor(
    key: &str,
    obj: &Map<String, Value>,
    settings: &ExtractSettings,
    builder: &mut ReportBuilder,
) -> ProductFactorView {
    let id = text_field(obj, &["id"]).unwrap_or_else(|| key.to_string());
    let name = text_field(obj, &["name"]).unwrap_or_else(|| key.to_string());
    let deep = settings.is_pillar(&name) || settings.is_pillar(key);

    let measures = collect_measures(&id, obj, deep, builder);
    let benchmark_size = count_field(obj, BENCHMARK_FIELDS).unwrap_or_else(|| {
        measures
            .iter()
            .find(|m| !m.thresholds.is_empty())
            .map_or(0, |m| m.thresholds.len())
    });

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
        measures: Some(measures),
    };
    builder.add_factor(factor);
    builder.add_factor_measures(&view);
    view
}

struct Frame<'a> {
    key: Option<&'a str>,
    value: &'a Value,
    /// Nearest enclosing `weights` map.
    weights: Option<&'a Map<String, Value>>,
    /// Nearest enclosing measure id.
    measure: Option<String>,
    /// Direct entry of the factor's `children`.
    top: bool,
}

/// Walk a factor's `children`, tabling measures, diagnostics and their edges.
///
/// Pillar factors (`deep`) take measures from any depth; other factors only
/// from their immediate children. Diagnostics are collected at any depth in
/// both cases. Findings are left to the document-wide scan.
///
/// A measure name reached again through another branch keeps its first
/// occurrence; the later subtree is still walked for diagnostics.
fn collect_measures(
    factor_id: &str,
    factor: &Map<String, Value>,
    deep: bool,
    builder: &mut ReportBuilder,
) -> Vec<MeasureView> {
    let mut views = Vec::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let Some(children) = factor.get("children") else {
        return views;
    };

    let mut stack: Vec<Frame<'_>> = Vec::new();
    push_entries(
        &mut stack,
        children,
        factor.get("weights").and_then(Value::as_object),
        None,
        true,
    );

    while let Some(frame) = stack.pop() {
        let Value::Object(obj) = frame.value else {
            push_entries(&mut stack, frame.value, frame.weights, frame.measure, false);
            continue;
        };

        match classify(frame.key, obj) {
            NodeKind::Finding(_) => {}
            NodeKind::Diagnostic => {
                let diagnostic_id = builder.add_diagnostic(frame.key, obj);
                if let Some(measure_id) = &frame.measure {
                    builder.link_diagnostic(measure_id, &diagnostic_id);
                }
            }
            NodeKind::Measure if deep || frame.top => {
                let view = measure_view(frame.key, obj, frame.weights);
                push_entries(
                    &mut stack,
                    frame.value,
                    obj.get("weights").and_then(Value::as_object),
                    Some(view.id.clone()),
                    false,
                );
                if !seen.insert(view.name.clone()) {
                    log::debug!(
                        target: LOG_TARGET,
                        "Measure '{}' reached twice under factor '{}'; keeping the first",
                        view.name,
                        factor_id
                    );
                    continue;
                }
                builder.add_measure(&view);
                builder.link_measure(factor_id, &view.id, view.weight);
                views.push(view);
            }
            _ => push_entries(&mut stack, frame.value, frame.weights, frame.measure, false),
        }
    }

    views
}

/// Push the object/array entries of `value` so they pop in document order.
fn push_entries<'a>(
    stack: &mut Vec<Frame<'a>>,
    value: &'a Value,
    weights: Option<&'a Map<String, Value>>,
    measure: Option<String>,
    top: bool,
) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter().rev().filter(|(_, v)| is_nested(v)) {
                stack.push(Frame {
                    key: Some(key.as_str()),
                    value: child,
                    weights,
                    measure: measure.clone(),
                    top,
                });
            }
        }
        Value::Array(items) => {
            for child in items.iter().rev().filter(|v| is_nested(v)) {
                stack.push(Frame {
                    key: None,
                    value: child,
                    weights,
                    measure: measure.clone(),
                    top,
                });
            }
        }
        _ => {}
    }
}

fn is_nested(value: &Value) -> bool {
    value.is_object() || value.is_array()
}

fn measure_view(
    key: Option<&str>,
    obj: &Map<String, Value>,
    weights: Option<&Map<String, Value>>,
) -> MeasureView {
    let name = text_field(obj, &["name"])
        .or_else(|| key.map(str::to_string))
        .unwrap_or_default();
    let id = text_field(obj, &["id"]).unwrap_or_else(|| name.clone());

    let weight = weights
        .and_then(|w| {
            key.and_then(|k| number(w.get(k)))
                .or_else(|| number(w.get(name.as_str())))
        })
        .or_else(|| number_field(obj, &["weight"]));

    MeasureView {
        id,
        name,
        description: text_field(obj, DESCRIPTION_FIELDS),
        score: number_field(obj, VALUE_FIELDS),
        weight,
        thresholds: thresholds(obj.get("thresholds")),
    }
}
