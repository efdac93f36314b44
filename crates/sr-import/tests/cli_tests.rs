//! End-to-end tests for the sr-import binary
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

fn sr_import(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sr-import").unwrap();
    cmd.env_clear()
        .env("SR_DATA_DIR", dir.path())
        .env("SR_DATABASE", dir.path().join("sr.db"))
        .env("NO_COLOR", "1");
    cmd
}

async fn serve_release() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/SP2UserFiles/Place/12354500/Data/SR24/dnload/sr24upd.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(common::sr_archive()))
        .mount(&server)
        .await;
    server
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    sr_import(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("download"))
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("reset"));
}

#[test]
fn test_no_arguments_prints_usage() {
    let dir = TempDir::new().unwrap();
    sr_import(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_unknown_archive_kind_rejected() {
    let dir = TempDir::new().unwrap();
    sr_import(&dir)
        .args(["status", "--kind", "partial"])
        .assert()
        .failure();
}

#[test]
fn test_clean_with_nothing_downloaded() {
    let dir = TempDir::new().unwrap();
    sr_import(&dir)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to clean."));
}

#[test]
fn test_dry_run_import_of_extracted_files() {
    let dir = TempDir::new().unwrap();
    common::write_sr_files(&dir.path().join("sr24upd"));

    sr_import(&dir)
        .args(["import", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"))
        .stdout(predicate::str::contains("Parsed 17 records across 12 entities"));

    assert!(!dir.path().join("sr.db").exists());
}

#[test]
fn test_import_fails_without_extracted_files() {
    let dir = TempDir::new().unwrap();
    sr_import(&dir)
        .args(["import", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_zero_chunk_size_is_rejected() {
    let dir = TempDir::new().unwrap();
    sr_import(&dir)
        .args(["status", "--chunk-size", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Chunk size must be at least 1"));
}

#[tokio::test]
async fn test_update_status_reset_clean() {
    let server = serve_release().await;
    let dir = TempDir::new().unwrap();
    let base_url = format!("{}/", server.uri());

    sr_import(&dir)
        .env("SR_BASE_URL", &base_url)
        .arg("update")
        .assert()
        .success()
        .stdout(predicate::str::contains("Extracted 12 file(s)"))
        .stdout(predicate::str::contains("Imported 17 records across 12 entities"));

    let output = sr_import(&dir)
        .args(["status", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let counts: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let counts = counts.as_array().unwrap();
    assert_eq!(counts.len(), common::SR_RECORDS.len());
    for (count, (entity, records)) in counts.iter().zip(common::SR_RECORDS) {
        assert_eq!(count["entity_id"], *entity);
        assert_eq!(count["records"], *records);
    }

    sr_import(&dir)
        .args(["reset", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 17 record(s)"));

    sr_import(&dir)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("sr24upd.zip"));
    assert!(!dir.path().join("sr24upd").exists());
}

#[test]
fn test_reset_declined_keeps_records() {
    let dir = TempDir::new().unwrap();
    sr_import(&dir)
        .arg("reset")
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Reset cancelled."));
}
