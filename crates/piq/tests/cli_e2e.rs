//! E2E tests for the `piq` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};

fn piq_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_piq"));
    // Keep any real user settings out of the way.
    cmd.env("XDG_CONFIG_HOME", home).env_remove("RUST_LOG");
    cmd
}

fn report(factor_value: f64) -> Value {
    json!({
        "factors": {
            "tqi": {"value": 0.6},
            "quality_aspects": {
                "Security": {"value": 0.7, "children": ["Product_Factor CWE-20"]}
            },
            "product_factors": {
                "Product_Factor CWE-20": {
                    "value": factor_value,
                    "children": {
                        "M1": {
                            "value": 0.5,
                            "thresholds": [1, 2, 3],
                            "children": {
                                "Sub": {"value": 0.25},
                                "CWE-20 Diagnostic grype": {
                                    "toolName": "grype",
                                    "children": {"CVE-2024-1": {"value": 1, "fixed": "true"}}
                                }
                            }
                        }
                    }
                }
            }
        }
    })
}

fn write(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string(value).unwrap()).unwrap();
    path
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("failed to execute piq");
    assert!(
        output.status.success(),
        "piq failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

// ---------------------------------------------------------------------------
// extract
// ---------------------------------------------------------------------------

#[test]
fn extract_prints_normalized_report() {
    let dir = tempdir().unwrap();
    let input = write(&dir, "report.json", &report(0.5));

    let out = stdout_json(piq_cmd(dir.path()).arg("extract").arg(&input));

    assert_eq!(out["schemaVersion"], 1);
    assert_eq!(out["aspectScores"][0]["name"], "Security");
    let measures = out["relational"]["measures"].as_object().unwrap();
    assert_eq!(measures.len(), 2);
    assert_eq!(
        out["relational"]["findings"]["CVE-2024-1"]["fixed"],
        "fixed"
    );
}

#[test]
fn extract_reads_stdin() {
    let dir = tempdir().unwrap();
    let out = stdout_json(
        piq_cmd(dir.path())
            .arg("extract")
            .arg("-")
            .write_stdin(serde_json::to_string(&report(0.5)).unwrap()),
    );
    assert_eq!(out["tqi"]["score"], 0.6);
}

#[test]
fn pretty_flag_indents_output() {
    let dir = tempdir().unwrap();
    let input = write(&dir, "report.json", &report(0.5));
    piq_cmd(dir.path())
        .args(["summary", "--pretty"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\n  \"fingerprint\""));
}

// ---------------------------------------------------------------------------
// diff
// ---------------------------------------------------------------------------

#[test]
fn diff_of_identical_reports_is_empty() {
    let dir = tempdir().unwrap();
    let a = write(&dir, "a.json", &report(0.5));

    let out = stdout_json(piq_cmd(dir.path()).arg("diff").arg(&a).arg(&a));
    assert_eq!(out["differingProductFactors"], json!([]));
    assert_eq!(out["missingFindings"], json!([]));
    assert_eq!(
        out["productFactorPeers"]["Product_Factor CWE-20"]["value"],
        0.5
    );
}

#[test]
fn diff_flags_changed_factor() {
    let dir = tempdir().unwrap();
    let a = write(&dir, "a.json", &report(0.81));
    let b = write(&dir, "b.json", &report(0.80));

    let out = stdout_json(piq_cmd(dir.path()).arg("diff").arg(&a).arg(&b));
    assert_eq!(out["differingProductFactors"], json!(["Product_Factor CWE-20"]));
    assert_eq!(
        out["productFactorFields"]["Product_Factor CWE-20"],
        json!(["value"])
    );
}

#[test]
fn symmetric_diff_has_both_directions() {
    let dir = tempdir().unwrap();
    let a = write(&dir, "a.json", &report(0.5));
    let b = write(&dir, "b.json", &json!({"factors": {}}));

    let out = stdout_json(
        piq_cmd(dir.path())
            .arg("diff")
            .arg(&a)
            .arg(&b)
            .arg("--symmetric"),
    );
    assert_eq!(
        out["forward"]["missingProductFactors"],
        json!(["Product_Factor CWE-20"])
    );
    assert_eq!(out["forward"]["missingFindings"], json!(["CVE-2024-1"]));
    assert_eq!(out["backward"]["missingProductFactors"], json!([]));
}

#[test]
fn diff_rejects_two_stdin_sides() {
    let dir = tempdir().unwrap();
    piq_cmd(dir.path())
        .args(["diff", "-", "-"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Only one side"));
}

// ---------------------------------------------------------------------------
// summary and settings
// ---------------------------------------------------------------------------

#[test]
fn summary_reports_counts_and_fingerprint() {
    let dir = tempdir().unwrap();
    let input = write(&dir, "report.json", &report(0.5));

    let out = stdout_json(piq_cmd(dir.path()).arg("summary").arg(&input));
    assert_eq!(out["productFactorCount"], 1);
    assert_eq!(out["measureCount"], 2);
    assert_eq!(out["cweCount"], 1);
    assert_eq!(out["findingCount"], 1);
    assert_eq!(out["fingerprint"].as_str().unwrap().len(), 64);
}

#[test]
fn config_file_changes_pillar_prefixes() {
    let dir = tempdir().unwrap();
    let input = write(&dir, "report.json", &report(0.5));
    let config = dir.path().join("custom.toml");
    fs::write(&config, "[extract]\npillar_prefixes = []\n").unwrap();

    let out = stdout_json(
        piq_cmd(dir.path())
            .arg("--config")
            .arg(&config)
            .arg("summary")
            .arg(&input),
    );
    // Without pillars only the direct child is a measure.
    assert_eq!(out["measureCount"], 1);
}

#[cfg(target_os = "linux")]
#[test]
fn default_config_location_is_used() {
    let dir = tempdir().unwrap();
    let input = write(&dir, "report.json", &report(0.5));
    fs::create_dir_all(dir.path().join("piq")).unwrap();
    fs::write(
        dir.path().join("piq").join("piq.toml"),
        "[output]\npretty = true\n",
    )
    .unwrap();

    piq_cmd(dir.path())
        .arg("summary")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\n  \"tqi\""));
}

// ---------------------------------------------------------------------------
// errors
// ---------------------------------------------------------------------------

#[test]
fn missing_file_fails_with_hint() {
    let dir = tempdir().unwrap();
    piq_cmd(dir.path())
        .arg("extract")
        .arg(dir.path().join("nope.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::starts_with("Error: Failed to read report"))
        .stderr(predicate::str::contains("Verify the input path exists"));
}

#[test]
fn invalid_json_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "{ not json").unwrap();
    piq_cmd(dir.path())
        .arg("summary")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("as JSON"));
}

#[test]
fn non_object_report_fails_with_shape_hint() {
    let dir = tempdir().unwrap();
    let path = write(&dir, "list.json", &json!([1, 2, 3]));
    piq_cmd(dir.path())
        .arg("extract")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be a JSON object, got array"))
        .stderr(predicate::str::contains("`factors` section"));
}

#[test]
fn unrelated_json_object_fails_with_shape_hint() {
    let dir = tempdir().unwrap();
    let path = write(
        &dir,
        "package.json",
        &json!({"name": "my-package", "version": "1.0.0"}),
    );
    piq_cmd(dir.path())
        .arg("summary")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("none of the sections"))
        .stderr(predicate::str::contains("`factors` section"));
}

#[test]
fn broken_settings_file_fails() {
    let dir = tempdir().unwrap();
    let input = write(&dir, "report.json", &report(0.5));
    let config = dir.path().join("broken.toml");
    fs::write(&config, "[extract\n").unwrap();
    piq_cmd(dir.path())
        .arg("--config")
        .arg(&config)
        .arg("extract")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load settings"))
        .stderr(predicate::str::contains("piq.toml"));
}

#[test]
fn unknown_subcommand_is_rejected() {
    let dir = tempdir().unwrap();
    piq_cmd(dir.path())
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
