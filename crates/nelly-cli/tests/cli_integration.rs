//! CLI integration tests for the nelly binary

#![allow(clippy::unwrap_used)] // Tests can use unwrap

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

/// Create a nelly command
fn nelly() -> Command {
    Command::cargo_bin("nelly").expect("Failed to find nelly binary")
}

/// Columns: target, feature, indicator (last).
/// Records 1-2 train, 3 test, 4 drops, 5 test.
const FLOWS: &str = "\
@relation flows
@attribute latency numeric
@attribute bytes numeric
@attribute is_train numeric
@data
2,10,1
4,20,1
5,30,0
9,40,-1
1,50,0
";

fn write_source(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// learners
// ============================================================================

#[test]
fn test_learners_lists_builtins() {
    nelly()
        .arg("learners")
        .assert()
        .success()
        .stdout(predicate::str::contains("targetmean"))
        .stdout(predicate::str::contains("adagrad"));
}

#[test]
fn test_learners_json() {
    let out = nelly().args(["learners", "--json"]).output().unwrap();
    assert!(out.status.success());
    let names: Vec<String> = serde_json::from_slice(&out.stdout).unwrap();
    assert!(names.contains(&"sgd".to_string()));
}

// ============================================================================
// evaluate
// ============================================================================

#[test]
fn test_evaluate_rows_to_stdout() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "flows.arff", FLOWS);

    nelly()
        .args(["evaluate", "-q", "--layout", "basic", "--arff"])
        .arg(&source)
        .assert()
        .success()
        .stdout("testIndex,trainCount,predicted,actual\n1,2,3,5\n2,2,3,1\n");
}

#[test]
fn test_evaluate_rows_to_file_with_errors() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "flows.arff", FLOWS);
    let out = dir.path().join("rows.csv");

    nelly()
        .args(["evaluate", "--arff"])
        .arg(&source)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("test records"));

    let content = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "testIndex,trainCount,predicted,actual,error,mae,rmse");
    assert_eq!(lines[1], "1,2,3,5,2,2,2");
    assert_eq!(lines.len(), 3);
}

#[test]
fn test_evaluate_summary_json() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "flows.arff", FLOWS);

    let out = nelly()
        .args(["evaluate", "-q", "--json", "--no-header", "--arff"])
        .arg(&source)
        .output()
        .unwrap();
    assert!(out.status.success());

    let stderr = String::from_utf8(out.stderr).unwrap();
    let summary: serde_json::Value = serde_json::from_str(stderr.trim()).unwrap();
    assert_eq!(summary["records"], 5);
    assert_eq!(summary["test_count"], 2);
    assert_eq!(summary["train_count"], 2);
    assert_eq!(summary["dropped"], 1);
    assert_eq!(summary["mae"], 2.0);
}

#[test]
fn test_evaluate_max_records() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "flows.arff", FLOWS);

    nelly()
        .args(["evaluate", "-q", "--layout", "basic", "--max-records", "3", "--arff"])
        .arg(&source)
        .assert()
        .success()
        .stdout("testIndex,trainCount,predicted,actual\n1,2,3,5\n");
}

#[test]
fn test_evaluate_jsonl_rows() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "flows.arff", FLOWS);

    let out = nelly()
        .args(["evaluate", "-q", "--format", "jsonl", "--arff"])
        .arg(&source)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let first: serde_json::Value = serde_json::from_str(stdout.lines().next().unwrap()).unwrap();
    assert_eq!(first["testIndex"], 1);
    assert_eq!(first["predicted"], 3.0);
}

#[test]
fn test_evaluate_csv_source_with_explicit_columns() {
    let dir = TempDir::new().unwrap();
    let source = write_source(
        &dir,
        "flows.csv",
        "is_train,bytes,latency\n1,10,2\n1,20,4\n0,30,5\n",
    );

    nelly()
        .args([
            "evaluate", "-q", "--layout", "basic", "--no-header", "--idx-class", "-1",
            "--idx-train", "1", "--arff",
        ])
        .arg(&source)
        .assert()
        .success()
        .stdout("1,2,3,5\n");
}

#[test]
fn test_unparsable_index_falls_back_with_warning() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "flows.arff", FLOWS);

    nelly()
        .args(["evaluate", "--layout", "basic", "--idx-class", "abc", "--arff"])
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("1,2,3,5"))
        .stderr(predicate::str::contains("could not parse target_column 'abc'"));
}

#[test]
fn test_negative_record_limit_falls_back_to_unbounded() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "flows.arff", FLOWS);

    nelly()
        .args(["evaluate", "--layout", "basic", "--max-records", "-5", "--arff"])
        .arg(&source)
        .assert()
        .success()
        .stdout("testIndex,trainCount,predicted,actual\n1,2,3,5\n2,2,3,1\n")
        .stderr(predicate::str::contains("could not parse max_records '-5'"));
}

#[test]
fn test_quiet_still_reports_fallbacks() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "flows.arff", FLOWS);

    nelly()
        .args(["evaluate", "-q", "--idx-class", "abc", "--arff"])
        .arg(&source)
        .assert()
        .success()
        .stderr(predicate::str::contains("[WARN]"))
        .stderr(predicate::str::contains("could not parse target_column 'abc'"));
}

#[test]
fn test_summary_json_lists_fallbacks() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "flows.arff", FLOWS);
    let config = write_source(&dir, "config.json", r#"{"threshold": "high"}"#);

    let out = nelly()
        .args(["evaluate", "-q", "--json", "--max-records", "lots", "--config"])
        .arg(&config)
        .arg("--arff")
        .arg(&source)
        .output()
        .unwrap();
    assert!(out.status.success());

    let summary: serde_json::Value =
        serde_json::from_str(String::from_utf8(out.stderr).unwrap().trim()).unwrap();
    assert_eq!(summary["test_count"], 2);
    let warnings = summary["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].as_str().unwrap().contains("threshold 'high'"));
    assert!(warnings[1].as_str().unwrap().contains("max_records 'lots'"));
}

#[test]
fn test_config_file_is_overridden_by_flags() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "flows.arff", FLOWS);
    let config = write_source(
        &dir,
        "config.json",
        r#"{"learner": "fadingtarget", "threshold": 100.0}"#,
    );

    // threshold 100 alone would drop every training candidate
    let out = nelly()
        .args(["evaluate", "-q", "--json", "--thr-train", "0", "--config"])
        .arg(&config)
        .arg("--arff")
        .arg(&source)
        .output()
        .unwrap();
    assert!(out.status.success());

    let summary: serde_json::Value =
        serde_json::from_str(String::from_utf8(out.stderr).unwrap().trim()).unwrap();
    assert_eq!(summary["learner"], "fadingtarget");
    assert_eq!(summary["train_count"], 2);
}

// ============================================================================
// failures and exit codes
// ============================================================================

#[test]
fn test_missing_source_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    nelly()
        .args(["evaluate", "--arff"])
        .arg(dir.path().join("absent.arff"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("source not found"));
}

#[test]
fn test_unknown_learner_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "flows.arff", FLOWS);

    nelly()
        .args(["evaluate", "--learner", "fimtdd", "--arff"])
        .arg(&source)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("unknown learner 'fimtdd'"));
}

#[test]
fn test_indicator_on_target_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let source = write_source(&dir, "flows.arff", FLOWS);

    nelly()
        .args(["evaluate", "--idx-train", "1", "--arff"])
        .arg(&source)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("indicator_column"));
}

#[test]
fn test_missing_target_aborts_with_schema_code() {
    let dir = TempDir::new().unwrap();
    let source = write_source(
        &dir,
        "gaps.arff",
        "@relation gaps\n@attribute y numeric\n@attribute flag numeric\n@data\n1,1\n?,0\n",
    );

    nelly()
        .args(["evaluate", "--arff"])
        .arg(&source)
        .assert()
        .code(4)
        .stderr(predicate::str::contains("record 2"));
}

#[test]
fn test_malformed_source_is_source_error() {
    let dir = TempDir::new().unwrap();
    let source = write_source(
        &dir,
        "bad.arff",
        "@relation bad\n@attribute y numeric\n@attribute flag numeric\n@data\n1,oops\n",
    );

    nelly()
        .args(["evaluate", "--arff"])
        .arg(&source)
        .assert()
        .code(6)
        .stderr(predicate::str::contains("line 5"));
}
