//! Command-line interface tests
//!
//! Runs the `pill-matcher` binary against temporary database and label files.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

const DATABASE_CSV: &str = "\
splimprint,splcolor_text_encoded,splshape_text_encoded,medicine_name,medicine_name_encoded
M;30,3,1,Oxycodone,2
IP;204,0,1,Ibuprofen,1
,5,0,Aspirin,0
";

fn write_database(dir: &Path) -> PathBuf {
    let path = dir.join("drug_database.csv");
    std::fs::write(&path, DATABASE_CSV).expect("Failed to write database");
    path
}

fn pill_matcher() -> Command {
    let mut cmd = Command::cargo_bin("pill-matcher").expect("Binary should build");
    cmd.env_remove("DATABASE_CSV").env_remove("LABEL_ENCODER_PATH");
    cmd
}

#[test]
fn test_identify_text_output() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = write_database(dir.path());

    pill_matcher()
        .args(["identify", "--color", "3", "--shape", "1", "--imprint", "M;30"])
        .arg("--database")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 Oxycodone"))
        .stdout(predicate::str::contains("Score: 3.000"));
}

#[test]
fn test_identify_json_output() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = write_database(dir.path());

    let output = pill_matcher()
        .args(["identify", "--color", "0", "--shape", "1", "--imprint", "IP;2O4"])
        .args(["-n", "3", "--format", "json"])
        .arg("--database")
        .arg(&db)
        .output()
        .expect("Failed to run binary");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output should be JSON");
    assert_eq!(json["identified_drug_name"], "Ibuprofen");
    assert_eq!(json["predicted_imprint"], "IP;2O4");
    assert_eq!(json["match"]["index"], 1);
    assert_eq!(json["candidates"].as_array().map(Vec::len), Some(3));
}

#[test]
fn test_identify_tsv_output() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = write_database(dir.path());

    pill_matcher()
        .args(["identify", "--color", "5", "--shape", "0", "--format", "tsv"])
        .arg("--database")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("rank\tindex\tname_key\tname"))
        .stdout(predicate::str::contains("1\t2\t0\tAspirin"));
}

#[test]
fn test_identify_from_ocr_detections() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = write_database(dir.path());
    let ocr = dir.path().join("detections.json");
    std::fs::write(
        &ocr,
        r#"[
            {"bbox": [[40, 5], [70, 5], [70, 20], [40, 20]], "text": "30", "confidence": 0.91},
            {"bbox": [[5, 6], [30, 6], [30, 21], [5, 21]], "text": "M", "confidence": 0.99}
        ]"#,
    )
    .expect("Failed to write detections");

    pill_matcher()
        .args(["identify", "--color", "3", "--shape", "1", "--format", "json"])
        .arg("--ocr")
        .arg(&ocr)
        .arg("--database")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""predicted_imprint": "M;30""#))
        .stdout(predicate::str::contains("Oxycodone"));
}

#[test]
fn test_identify_reads_database_from_env() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = write_database(dir.path());

    pill_matcher()
        .env("DATABASE_CSV", &db)
        .args(["identify", "--color", "3", "--shape", "1", "--imprint", "M;30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Oxycodone"));
}

#[test]
fn test_identify_with_label_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = write_database(dir.path());
    let labels = dir.path().join("labels.txt");
    std::fs::write(&labels, "aspirin\nibuprofen\noxycodone\n").expect("Failed to write labels");

    pill_matcher()
        .args(["identify", "--color", "3", "--shape", "1", "--imprint", "M;30"])
        .arg("--database")
        .arg(&db)
        .arg("--labels")
        .arg(&labels)
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 oxycodone"));
}

#[test]
fn test_identify_without_labels_fails() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = dir.path().join("no_names.csv");
    std::fs::write(
        &db,
        "splimprint,splcolor_text_encoded,splshape_text_encoded,medicine_name_encoded\nM;30,3,1,0\n",
    )
    .expect("Failed to write database");

    pill_matcher()
        .args(["identify", "--color", "3", "--shape", "1", "--imprint", "M;30"])
        .arg("--database")
        .arg(&db)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no label decoder"));
}

#[test]
fn test_identify_rejects_long_imprint() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = write_database(dir.path());

    pill_matcher()
        .args(["identify", "--color", "3", "--shape", "1", "--imprint"])
        .arg("X".repeat(300))
        .arg("--database")
        .arg(&db)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Imprint too long"));
}

#[test]
fn test_identify_rejects_negative_weight() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = write_database(dir.path());

    pill_matcher()
        .args(["identify", "--color", "3", "--shape", "1", "--imprint", "M"])
        .args(["--weight-color=-1"])
        .arg("--database")
        .arg(&db)
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-negative"));
}

#[test]
fn test_identify_missing_database() {
    pill_matcher()
        .args(["identify", "--color", "3", "--shape", "1", "--imprint", "M"])
        .args(["--database", "/nonexistent/drug_database.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading database"));
}

#[test]
fn test_imprint_and_ocr_conflict() {
    pill_matcher()
        .args(["identify", "--color", "3", "--shape", "1", "--imprint", "M"])
        .args(["--ocr", "detections.json"])
        .assert()
        .failure();
}

#[test]
fn test_database_list() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = write_database(dir.path());

    pill_matcher()
        .args(["database", "list", "--limit", "2"])
        .arg("--database")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("Drug Database (3 records)"))
        .stdout(predicate::str::contains("Ibuprofen"))
        .stdout(predicate::str::contains("... and 1 more records"));
}

#[test]
fn test_database_show_json() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = write_database(dir.path());

    let output = pill_matcher()
        .args(["--format", "json", "database", "show", "2"])
        .arg("--database")
        .arg(&db)
        .output()
        .expect("Failed to run binary");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Output should be JSON");
    assert_eq!(json["name"], "Aspirin");
    assert_eq!(json["record"]["imprint"], "");
    assert_eq!(json["record"]["color_class"], 5);
}

#[test]
fn test_database_show_out_of_range() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = write_database(dir.path());

    pill_matcher()
        .args(["database", "show", "99"])
        .arg("--database")
        .arg(&db)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Record 99 not found"));
}

#[test]
fn test_database_stats_tsv() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = write_database(dir.path());

    pill_matcher()
        .args(["database", "stats", "--format", "tsv"])
        .arg("--database")
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("shape\t1\t2"));
}

#[test]
fn test_database_export_roundtrip() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = write_database(dir.path());
    let snapshot = dir.path().join("snapshot.json");

    pill_matcher()
        .args(["database", "export"])
        .arg(&snapshot)
        .arg("--database")
        .arg(&db)
        .assert()
        .success();

    let content = std::fs::read_to_string(&snapshot).expect("Snapshot should exist");
    assert!(content.contains("\"created_at\""));

    // Snapshots load like any other database, names included
    pill_matcher()
        .args(["identify", "--color", "0", "--shape", "1", "--imprint", "IP;204"])
        .arg("--database")
        .arg(&snapshot)
        .assert()
        .success()
        .stdout(predicate::str::contains("Ibuprofen"));
}
