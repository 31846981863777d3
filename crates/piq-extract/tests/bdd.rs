//! BDD-style scenario tests for piq-extract.
//!
//! Each test reads as a Given/When/Then scenario over a report document.

use piq_extract::{ExtractError, extract, extract_with, is_vulnerability_id};
use piq_settings::ExtractSettings;
use serde_json::{Value, json};

// ============================================================================
// Helpers
// ============================================================================

fn with_factor(name: &str, factor: Value) -> Value {
    json!({
        "factors": {
            "quality_aspects": {"Security": {"value": 0.5, "children": [name]}},
            "product_factors": {name: factor}
        }
    })
}

// ============================================================================
// Scenario: document shape
// ============================================================================

#[test]
fn given_array_document_when_extracting_then_not_an_object_error() {
    let result = extract(&json!([{"factors": {}}]));
    assert_eq!(result.unwrap_err(), ExtractError::NotAnObject { found: "array" });
}

#[test]
fn given_unrelated_object_when_extracting_then_shape_error() {
    // Given a JSON object that is not a quality report, e.g. a package manifest
    let doc = json!({"name": "my-package", "version": "1.0.0"});
    // When extracting, Then no partial report is produced
    assert_eq!(extract(&doc).unwrap_err(), ExtractError::UnrecognizedShape);
}

#[test]
fn given_relational_document_without_rows_when_extracting_then_report_is_empty() {
    let report = extract(&json!({"measures": {}, "name": "nothing here"})).unwrap();
    assert!(report.aspect_scores.is_empty());
    assert!(report.product_factors_by_aspect.is_empty());
    assert_eq!(report.finding_count(), 0);
}

// ============================================================================
// Scenario: measure depth
// ============================================================================

#[test]
fn given_pillar_factor_with_sub_measures_when_extracting_then_all_depths_are_measures() {
    // Given a CWE pillar whose measure has a sub-measure two levels down
    let doc = with_factor(
        "Product_Factor CWE-400",
        json!({
            "value": 0.3,
            "children": {
                "Resource Measure": {
                    "value": 0.3,
                    "children": {"Nested": {"children": {"Leaf Measure": {"value": 0.1}}}}
                }
            }
        }),
    );
    // When extracting
    let report = extract(&doc).unwrap();
    // Then both measures are tabled and linked to the factor
    let names: Vec<String> = report
        .measures_for("Product_Factor CWE-400")
        .iter()
        .map(|m| m.name.clone())
        .collect();
    assert_eq!(names, vec!["Resource Measure", "Leaf Measure"]);
    assert_eq!(report.relational.pf_measure_edges.len(), 2);
}

#[test]
fn given_plain_factor_with_sub_measures_when_extracting_then_only_direct_children_count() {
    let doc = with_factor(
        "Code Style",
        json!({
            "value": 0.3,
            "children": {
                "Naming": {"value": 0.3, "children": {"Inner": {"value": 0.1}}}
            }
        }),
    );
    let report = extract(&doc).unwrap();
    assert_eq!(report.relational.measures.len(), 1);
    assert!(report.relational.measures.contains_key("Naming"));
}

#[test]
fn given_custom_pillar_prefix_when_extracting_then_prefix_factor_descends() {
    let doc = with_factor(
        "Pillar: Memory",
        json!({
            "children": {"Outer": {"value": 1, "children": {"Inner": {"value": 0.1}}}}
        }),
    );
    let settings = ExtractSettings {
        pillar_prefixes: vec!["Pillar:".into()],
    };
    let report = extract_with(&doc, &settings).unwrap();
    assert_eq!(report.relational.measures.len(), 2);
}

// ============================================================================
// Scenario: weights
// ============================================================================

#[test]
fn given_weights_map_when_extracting_then_edge_carries_weight() {
    let doc = with_factor(
        "Product_Factor CWE-787",
        json!({
            "weights": {"Bounds": 0.25},
            "children": {"Bounds": {"value": 0.9}, "Unweighted": {"value": 0.2}}
        }),
    );
    let report = extract(&doc).unwrap();
    let measures = report.measures_for("Product_Factor CWE-787");
    assert_eq!(measures[0].weight, Some(0.25));
    assert_eq!(measures[1].weight, None);
}

// ============================================================================
// Scenario: findings
// ============================================================================

#[test]
fn given_finding_outside_any_diagnostic_when_extracting_then_it_has_no_diagnostic() {
    let doc = json!({
        "factors": {},
        "appendix": {"GHSA-4xq9-8g2w-9m2q": {"vulnSource": "left-pad", "fixed": "not fixed"}}
    });
    let report = extract(&doc).unwrap();
    let finding = &report.relational.findings["GHSA-4xq9-8g2w-9m2q"];
    assert_eq!(finding.diagnostic_id, None);
    assert_eq!(finding.vuln_source.as_deref(), Some("left-pad"));
}

#[test]
fn given_finding_listed_twice_when_extracting_then_counted_once() {
    let doc = with_factor(
        "Product_Factor CWE-20",
        json!({
            "children": {
                "M": {
                    "value": 1,
                    "children": {
                        "D1 Diagnostic": {"toolName": "grype", "children": {"CVE-2024-1": {"value": 1}}},
                        "D2 Diagnostic": {"toolName": "grype", "children": {"CVE-2024-1": {"value": 1}}}
                    }
                }
            }
        }),
    );
    let report = extract(&doc).unwrap();
    assert_eq!(report.finding_count(), 1);
    assert_eq!(report.diagnostic_count(), 2);
    assert_eq!(report.relational.findings["CVE-2024-1"].by_tool.len(), 1);
}

#[test]
fn given_identifier_like_strings_when_checking_then_only_cve_and_ghsa_match() {
    assert!(is_vulnerability_id("CVE-1999-0001"));
    assert!(is_vulnerability_id(" GHSA-xvch-5gv4-984h "));
    assert!(!is_vulnerability_id("CWE-20"));
    assert!(!is_vulnerability_id("cve-2024-1"));
}
