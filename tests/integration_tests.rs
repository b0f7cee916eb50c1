//! Integration tests for the harnessviz CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const DEMO: &str = r#"
metadata:
  title: Demo harness
connectors:
  X1:
    pincount: 3
    pinlabels: [GND, VCC, SIG]
  X2:
    pincount: 3
cables:
  W1:
    colors: [RD, BK, GN]
    length: 0.5
connections:
  - - X1: [1-3]
    - W1: [1-3]
    - X2: [1-3]
additional_bom_items:
  - description: M3x10 screw
    qty: 4
"#;

const BROKEN: &str = r#"
connectors:
  X1:
    pincount: 2
connections:
  - - X9: [1]
"#;

/// Helper to get a harnessviz command isolated from user config
fn harnessviz(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("harnessviz").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("HARNESSVIZ_OUTPUT_DIR")
        .env_remove("HARNESSVIZ_FORMATS")
        .env_remove("HARNESSVIZ_USE_MULTIPLIERS")
        .env_remove("HARNESSVIZ_MULTIPLIER_FILE")
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env("HOME", dir.path());
    cmd
}

fn write_harness(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// Basic Commands
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    harnessviz(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("bom"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    harnessviz(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("harnessviz"));
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    harnessviz(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("harnessviz"));
}

// ============================================================================
// Build Command
// ============================================================================

#[test]
fn test_build_writes_outputs() {
    let tmp = TempDir::new().unwrap();
    write_harness(&tmp, "demo.yml", DEMO);

    harnessviz(&tmp)
        .args(["build", "demo.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("demo"));

    let dot = fs::read_to_string(tmp.path().join("demo.gv")).unwrap();
    assert!(dot.starts_with("graph {"));
    assert!(dot.contains("\"X1\":\"p1r\":e -- \"W1\":\"w1\":w"));
    assert!(dot.contains("#000000:#FF0000:#000000"));
    assert!(dot.contains("#000000:#00FF00:#000000"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(tmp.path().join("demo.json")).unwrap()).unwrap();
    assert_eq!(json["metadata"]["title"], "Demo harness");
    assert_eq!(json["metadata"]["sheet_current"], 1);
    assert_eq!(json["metadata"]["sheet_total"], 1);
    assert!(json["graph"]["nodes"].as_array().unwrap().len() >= 3);

    let bom = fs::read_to_string(tmp.path().join("demo.bom.tsv")).unwrap();
    assert!(bom.starts_with("Id\tDescription\tQty\tUnit\tDesignators"));
    assert!(bom.contains("M3x10 screw"));

    assert!(tmp.path().join("shared_bom.tsv").exists());
}

#[test]
fn test_build_format_selection() {
    let tmp = TempDir::new().unwrap();
    write_harness(&tmp, "demo.yml", DEMO);

    harnessviz(&tmp)
        .args(["build", "demo.yml", "--formats", "gv", "-o", "out"])
        .assert()
        .success();

    assert!(tmp.path().join("out/demo.gv").exists());
    assert!(!tmp.path().join("out/demo.json").exists());
    assert!(!tmp.path().join("out/shared_bom.tsv").exists());
}

#[test]
fn test_build_shared_bom_accumulates() {
    let tmp = TempDir::new().unwrap();
    write_harness(&tmp, "a.yml", DEMO);
    write_harness(&tmp, "b.yml", DEMO);

    harnessviz(&tmp)
        .args(["build", "a.yml", "b.yml"])
        .assert()
        .success();

    let shared = fs::read_to_string(tmp.path().join("shared_bom.tsv")).unwrap();
    let screws = shared
        .lines()
        .find(|l| l.contains("M3x10 screw"))
        .unwrap();
    let cells: Vec<&str> = screws.split('\t').collect();
    assert_eq!(cells[2], "8");
    assert_eq!(cells[4], "a, b");
}

#[test]
fn test_build_with_multipliers() {
    let tmp = TempDir::new().unwrap();
    write_harness(&tmp, "a.yml", DEMO);
    write_harness(&tmp, "b.yml", DEMO);
    fs::write(tmp.path().join("quantity_multipliers.txt"), "a: 3\nb: 0.5\n").unwrap();

    harnessviz(&tmp)
        .args(["build", "a.yml", "b.yml", "-u"])
        .assert()
        .success();

    let shared = fs::read_to_string(tmp.path().join("shared_bom.tsv")).unwrap();
    let screws = shared.lines().find(|l| l.contains("M3x10 screw")).unwrap();
    assert_eq!(screws.split('\t').nth(2), Some("14"));
}

#[test]
fn test_build_missing_multiplier_file() {
    let tmp = TempDir::new().unwrap();
    write_harness(&tmp, "a.yml", DEMO);

    harnessviz(&tmp)
        .args(["build", "a.yml", "-u", "-m", "missing.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.txt"));
}

#[test]
fn test_build_reports_failing_file() {
    let tmp = TempDir::new().unwrap();
    write_harness(&tmp, "a.yml", DEMO);
    write_harness(&tmp, "b.yml", BROKEN);
    write_harness(&tmp, "c.yml", DEMO);

    harnessviz(&tmp)
        .args(["build", "a.yml", "b.yml", "c.yml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("a"))
        .stderr(predicate::str::contains("b"))
        .stderr(predicate::str::contains("UnresolvedReferenceError"));

    assert!(tmp.path().join("a.gv").exists());
    assert!(!tmp.path().join("c.gv").exists());
    let shared = fs::read_to_string(tmp.path().join("shared_bom.tsv")).unwrap();
    let screws = shared.lines().find(|l| l.contains("M3x10 screw")).unwrap();
    assert_eq!(screws.split('\t').nth(2), Some("4"));
}

#[test]
fn test_build_prepend() {
    let tmp = TempDir::new().unwrap();
    write_harness(
        &tmp,
        "parts.yml",
        "connectors:\n  X1:\n    pincount: 2\n    type: Molex KK 254\n",
    );
    write_harness(&tmp, "main.yml", "connections:\n  - - X1: [1, 2]\n");

    harnessviz(&tmp)
        .args(["build", "main.yml", "-p", "parts.yml", "--formats", "tsv"])
        .assert()
        .success();

    let bom = fs::read_to_string(tmp.path().join("main.bom.tsv")).unwrap();
    assert!(bom.contains("Molex KK 254"));
}

#[test]
fn test_build_directory_input() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("harnesses")).unwrap();
    fs::write(tmp.path().join("harnesses/one.yml"), DEMO).unwrap();
    fs::write(tmp.path().join("harnesses/two.yaml"), DEMO).unwrap();

    harnessviz(&tmp)
        .args(["build", "harnesses", "--formats", "gv"])
        .assert()
        .success();

    assert!(tmp.path().join("harnesses/one.gv").exists());
    assert!(tmp.path().join("harnesses/two.gv").exists());
}

#[test]
fn test_build_nonexistent_input() {
    let tmp = TempDir::new().unwrap();
    harnessviz(&tmp)
        .args(["build", "nope.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_build_formats_from_project_config() {
    let tmp = TempDir::new().unwrap();
    write_harness(&tmp, "demo.yml", DEMO);
    fs::write(tmp.path().join(".harnessviz.yaml"), "formats: [json]\n").unwrap();

    harnessviz(&tmp).args(["build", "demo.yml"]).assert().success();

    assert!(tmp.path().join("demo.json").exists());
    assert!(!tmp.path().join("demo.gv").exists());
}

#[test]
fn test_build_output_name() {
    let tmp = TempDir::new().unwrap();
    write_harness(&tmp, "demo.yml", DEMO);

    harnessviz(&tmp)
        .args(["build", "demo.yml", "-O", "loom", "--formats", "gv,tsv"])
        .assert()
        .success();

    assert!(tmp.path().join("loom.gv").exists());
    assert!(tmp.path().join("loom.bom.tsv").exists());
    assert!(!tmp.path().join("demo.gv").exists());
}

#[test]
fn test_build_output_name_needs_single_input() {
    let tmp = TempDir::new().unwrap();
    write_harness(&tmp, "a.yml", DEMO);
    write_harness(&tmp, "b.yml", DEMO);

    harnessviz(&tmp)
        .args(["build", "a.yml", "b.yml", "--output-name", "loom"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs a single input"));

    assert!(!tmp.path().join("loom.gv").exists());
}

// ============================================================================
// Validate Command
// ============================================================================

#[test]
fn test_validate_passes() {
    let tmp = TempDir::new().unwrap();
    write_harness(&tmp, "demo.yml", DEMO);

    harnessviz(&tmp)
        .args(["validate", "demo.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All files passed"));
}

#[test]
fn test_validate_prepend_from_project_config() {
    let tmp = TempDir::new().unwrap();
    write_harness(&tmp, "parts.yml", "connectors:\n  X1:\n    pincount: 2\n");
    write_harness(&tmp, "main.yml", "connections:\n  - - X1: [1, 2]\n");

    harnessviz(&tmp)
        .args(["validate", "main.yml"])
        .assert()
        .failure();

    fs::write(tmp.path().join(".harnessviz.yaml"), "prepend: [parts.yml]\n").unwrap();
    harnessviz(&tmp)
        .args(["validate", "main.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All files passed"));
}

#[test]
fn test_validate_reports_each_file() {
    let tmp = TempDir::new().unwrap();
    write_harness(&tmp, "good.yml", DEMO);
    write_harness(&tmp, "bad.yml", BROKEN);

    harnessviz(&tmp)
        .args(["validate", "good.yml", "bad.yml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("good.yml"))
        .stdout(predicate::str::contains("bad.yml"))
        .stderr(predicate::str::contains("1 file has errors"));
}

#[test]
fn test_validate_conflict() {
    let tmp = TempDir::new().unwrap();
    write_harness(
        &tmp,
        "conflict.yml",
        r#"
connectors:
  X1:
    pincount: 2
  X2:
    pincount: 2
cables:
  W1:
    wirecount: 2
connections:
  - - X1: [1, 1]
    - W1: [1, 2]
    - X2: [1, 2]
"#,
    );

    harnessviz(&tmp)
        .args(["validate", "conflict.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("claimed by both"));
}

#[test]
fn test_validate_yaml_syntax_error() {
    let tmp = TempDir::new().unwrap();
    write_harness(&tmp, "syntax.yml", "connectors:\n  X1: [1, 2\n");

    harnessviz(&tmp)
        .args(["validate", "syntax.yml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("YAML syntax error"));
}

// ============================================================================
// BOM Command
// ============================================================================

#[test]
fn test_bom_tsv() {
    let tmp = TempDir::new().unwrap();
    write_harness(&tmp, "demo.yml", DEMO);

    harnessviz(&tmp)
        .args(["bom", "demo.yml", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Id\tDescription"))
        .stdout(predicate::str::contains("M3x10 screw\t4"));
}

#[test]
fn test_bom_shared_json() {
    let tmp = TempDir::new().unwrap();
    write_harness(&tmp, "a.yml", DEMO);
    write_harness(&tmp, "b.yml", DEMO);

    let output = harnessviz(&tmp)
        .args(["bom", "a.yml", "b.yml", "--shared", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let screws = rows
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["Description"] == "M3x10 screw")
        .unwrap();
    assert_eq!(screws["Qty"], "8");
    assert_eq!(screws["Harnesses"], "a, b");
}

#[test]
fn test_bom_table() {
    let tmp = TempDir::new().unwrap();
    write_harness(&tmp, "demo.yml", DEMO);

    harnessviz(&tmp)
        .args(["bom", "demo.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Description"))
        .stdout(predicate::str::contains("M3x10 screw"));
}
