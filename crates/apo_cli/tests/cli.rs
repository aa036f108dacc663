//! Black-box tests for the `apo` binary: exit codes and written artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn write_json(dir: &Path, name: &str, v: &Value) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, serde_json::to_vec_pretty(v).unwrap()).unwrap();
    p
}

fn payload() -> Value {
    json!({
        "items": [
            {
                "category": "tasks",
                "description": "Reconcile vendor statements",
                "factors": ["routine", "data_driven"],
                "metadata": { "importance": 0.8, "frequency": "high", "skill_level": 2, "tech_adoption": 0.7 }
            },
            { "category": "skills", "description": "Client negotiation", "factors": ["social"] },
            { "category": "technologies", "description": "Spreadsheet software" }
        ],
        "external_signals": { "bls_trend_pct": 3.0 }
    })
}

fn apo() -> Command {
    let mut cmd = Command::cargo_bin("apo").unwrap();
    cmd.env_remove("APO_LOG");
    cmd
}

fn read(path: PathBuf) -> Value {
    serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
}

#[test]
fn run_writes_result_and_run_record() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "payload.json", &payload());
    let out = dir.path().join("out");

    apo().arg("--input").arg(&input).arg("--out").arg(&out).arg("--quiet").assert().success();

    let result = read(out.join("result.json"));
    let record = read(out.join("run_record.json"));
    assert!(result["overall_apo"].is_number());
    assert!(result["ci"]["lower"].as_f64().unwrap() <= result["ci"]["upper"].as_f64().unwrap());
    assert_eq!(result["external_signals"]["bls_adjustment_pts"], json!(0.0));
    assert!(record["result_id"].as_str().unwrap().starts_with("RES:"));
    assert_eq!(record["iterations"], json!(200));
}

#[test]
fn same_seed_gives_identical_bytes() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "payload.json", &payload());
    let (a, b) = (dir.path().join("a"), dir.path().join("b"));
    for out in [&a, &b] {
        apo()
            .args(["--seed", "0x2A", "--iterations", "500", "--quiet"])
            .arg("--input")
            .arg(&input)
            .arg("--out")
            .arg(out)
            .assert()
            .success();
    }
    assert_eq!(fs::read(a.join("result.json")).unwrap(), fs::read(b.join("result.json")).unwrap());
    let record = read(a.join("run_record.json"));
    assert_eq!(record["seed"], json!(42));
    assert_eq!(record["iterations"], json!(500));
}

#[test]
fn no_ci_omits_interval() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "payload.json", &payload());
    let out = dir.path().join("out");
    apo().arg("--input").arg(&input).arg("--out").arg(&out).args(["--no-ci", "--quiet"]).assert().success();
    let result = read(out.join("result.json"));
    assert!(result.get("ci").is_none());
    assert!(read(out.join("run_record.json")).get("seed").is_none());
}

#[test]
fn invalid_payload_exits_2_with_pointer() {
    let dir = TempDir::new().unwrap();
    let bad = json!({ "items": [{ "category": "tasks", "description": "", "factors": [] }] });
    let input = write_json(dir.path(), "payload.json", &bad);
    apo()
        .arg("--input")
        .arg(&input)
        .arg("--out")
        .arg(dir.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("/items/0/description"));
    assert!(!dir.path().join("result.json").exists());
}

#[test]
fn url_input_is_rejected() {
    apo().args(["--input", "https://example.com/payload.json"]).assert().code(2);
}

#[test]
fn missing_input_exits_4() {
    let dir = TempDir::new().unwrap();
    apo().arg("--input").arg(dir.path().join("nope.json")).assert().code(4);
}

#[test]
fn missing_config_file_scores_with_defaults() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "payload.json", &payload());
    let out = dir.path().join("out");
    apo()
        .arg("--input")
        .arg(&input)
        .arg("--config")
        .arg(dir.path().join("absent.json"))
        .arg("--out")
        .arg(&out)
        .arg("--quiet")
        .assert()
        .success();
    let result = read(out.join("result.json"));
    let first = result["validation_warnings"][0].as_str().unwrap();
    assert!(first.starts_with("config: config: "));
    assert!(first.ends_with("; using defaults"));
}

#[test]
fn malformed_config_file_scores_with_defaults() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "payload.json", &payload());
    let cfg = dir.path().join("config.json");
    fs::write(&cfg, br#"{"weights":{"tasks":0.5,"#).unwrap();
    let out = dir.path().join("out");
    apo()
        .arg("--input")
        .arg(&input)
        .arg("--config")
        .arg(&cfg)
        .arg("--out")
        .arg(&out)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(predicate::str::contains("using defaults"));
    let plain = dir.path().join("plain");
    apo().arg("--input").arg(&input).arg("--out").arg(&plain).arg("--quiet").assert().success();

    let result = read(out.join("result.json"));
    assert_eq!(result["weights_used"], read(plain.join("result.json"))["weights_used"]);
    let warnings = result["validation_warnings"].as_array().unwrap();
    assert!(warnings[0].as_str().unwrap().starts_with("config: config: "));
}

#[test]
fn config_file_replaces_payload_config_and_reports_unknown_tables() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "payload.json", &payload());
    let cfg = write_json(
        dir.path(),
        "config.json",
        &json!({ "simulation": { "enabled": false }, "surprise": {} }),
    );
    let out = dir.path().join("out");
    apo()
        .arg("--input")
        .arg(&input)
        .arg("--config")
        .arg(&cfg)
        .arg("--out")
        .arg(&out)
        .arg("--quiet")
        .assert()
        .success();
    let result = read(out.join("result.json"));
    assert!(result.get("ci").is_none());
    let warnings = result["validation_warnings"].as_array().unwrap();
    assert!(warnings.iter().any(|w| w.as_str().unwrap().starts_with("config: surprise")));
}

#[test]
fn signals_file_replaces_payload_signals() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "payload.json", &payload());
    let sig = write_json(dir.path(), "signals.json", &json!({ "bls_trend_pct": -8 }));
    let out = dir.path().join("out");
    apo()
        .arg("--input")
        .arg(&input)
        .arg("--signals")
        .arg(&sig)
        .arg("--out")
        .arg(&out)
        .args(["--no-ci", "--quiet"])
        .assert()
        .success();
    let result = read(out.join("result.json"));
    assert_eq!(result["external_signals"]["bls_adjustment_pts"], json!(3.0));
}

#[test]
fn validate_only_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = write_json(dir.path(), "payload.json", &payload());
    apo()
        .arg("--input")
        .arg(&input)
        .arg("--out")
        .arg(dir.path())
        .arg("--validate-only")
        .assert()
        .success()
        .stderr(predicate::str::contains("inputs OK"));
    assert!(!dir.path().join("result.json").exists());
}
