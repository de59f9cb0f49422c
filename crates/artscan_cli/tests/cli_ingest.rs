use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;

fn workspace_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_artscan"))
        .args(args)
        .output()
        .expect("failed to run artscan CLI")
}

fn temp_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "artscan_cli_{}_{}_{}",
        prefix,
        std::process::id(),
        nanos
    ))
}

const SCANS: &str = r#"[
  {
    "name": "Royal Flora",
    "slot": "Flower of Life",
    "level": "+20",
    "star": 5,
    "main_name": "HP",
    "main_value": "4,780",
    "substats": ["CRIT Rate+7.0%", "CRIT DMG+21.8%", "ATK+37", "Elemental Mastery+42"],
    "lock": false
  },
  {
    "name": "Royal Flora",
    "slot": "Flower of Life",
    "level": "+20",
    "star": 5,
    "main_name": "HP",
    "main_value": "4,780",
    "substats": ["CRIT Rate+7.0%", "CRIT DMG+21.8%", "ATK+37", "Elemental Mastery+42"],
    "lock": true
  },
  {
    "name": "Royal Flora",
    "slot": "Flower of Life",
    "level": "+20",
    "star": 5,
    "main_name": "HP",
    "main_value": "4,780",
    "substats": ["CRIT Rate+7.1%", "CRIT DMG+21.8%", "ATK+37", "Elemental Mastery+42"],
    "lock": false
  }
]"#;

#[test]
fn ingest_reports_accepted_duplicate_and_rejected() {
    let root = temp_test_dir("ingest");
    fs::create_dir_all(&root).expect("failed to create temp root");
    let scans = root.join("scans.json");
    fs::write(&scans, SCANS).expect("failed to write scans file");
    let db = root.join("artifacts.json");

    let data = workspace_data_dir();
    let output = run_cli(&[
        "--data",
        &data.to_string_lossy(),
        "--db",
        &db.to_string_lossy(),
        "ingest",
        &scans.to_string_lossy(),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("1 accepted, 1 duplicate, 1 rejected"),
        "unexpected summary: {stdout}"
    );

    // The durable store holds exactly the accepted record.
    let stored: Value =
        serde_json::from_slice(&fs::read(&db).expect("db file")).expect("db must be valid JSON");
    assert_eq!(stored.as_array().map(Vec::len), Some(1));

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn strict_ingest_fails_on_first_rejection() {
    let root = temp_test_dir("strict");
    fs::create_dir_all(&root).expect("failed to create temp root");
    let scans = root.join("scans.json");
    fs::write(&scans, SCANS).expect("failed to write scans file");

    let data = workspace_data_dir();
    let output = run_cli(&[
        "--data",
        &data.to_string_lossy(),
        "ingest",
        "--strict",
        &scans.to_string_lossy(),
    ]);
    assert!(!output.status.success());

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn export_writes_the_requested_schema() {
    let root = temp_test_dir("export");
    fs::create_dir_all(&root).expect("failed to create temp root");
    let scans = root.join("scans.json");
    fs::write(&scans, SCANS).expect("failed to write scans file");
    let db = root.join("artifacts.json");
    let out = root.join("good.json");

    let data = workspace_data_dir();
    let data_arg = data.to_string_lossy();
    let db_arg = db.to_string_lossy();

    let ingest = run_cli(&[
        "--data",
        &data_arg,
        "--db",
        &db_arg,
        "ingest",
        &scans.to_string_lossy(),
    ]);
    assert!(ingest.status.success());

    let export = run_cli(&[
        "--data",
        &data_arg,
        "--db",
        &db_arg,
        "export",
        "--format",
        "good",
        "--output",
        &out.to_string_lossy(),
    ]);
    assert!(export.status.success(), "stderr: {}", String::from_utf8_lossy(&export.stderr));

    let doc: Value = serde_json::from_slice(&fs::read(&out).expect("export file"))
        .expect("export must be valid JSON");
    assert_eq!(doc["format"], "GOOD");
    assert_eq!(doc["artifacts"].as_array().map(Vec::len), Some(1));
    assert_eq!(doc["artifacts"][0]["setKey"], "NoblesseOblige");

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn missing_reference_data_is_fatal() {
    let output = run_cli(&["--data", "/nonexistent/artscan-data", "stats"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ReferenceData"), "stderr: {stderr}");
}
