use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/testdata").join(name)
}

fn gc() -> Command {
    let mut cmd = Command::cargo_bin("k8s-offline-gc").unwrap();
    cmd.env_remove("OFFGC_LOG");
    cmd
}

const EXPECTED: &[u8] = b"-n ci delete secret stale-token\0-n default delete secret leftover-secret\0";

#[test]
fn prints_nul_terminated_directives_for_orphans() {
    let out = gc()
        .arg(testdata("secrets.json"))
        .arg(testdata("jobs.json"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(out, EXPECTED);
}

#[test]
fn output_does_not_depend_on_file_order() {
    gc()
        .arg(testdata("jobs.json"))
        .arg(testdata("secrets.json"))
        .assert()
        .success()
        .stdout(EXPECTED);
}

#[test]
fn owner_kept_and_ambiguous_resources_never_printed() {
    gc()
        .arg(testdata("secrets.json"))
        .arg(testdata("jobs.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("has-to-stay").not())
        .stdout(predicate::str::contains("multi-owned").not())
        .stdout(predicate::str::contains("default-token").not());
}

#[test]
fn no_files_prints_nothing() {
    gc().assert().success().stdout(predicate::str::is_empty());
}

#[test]
fn missing_file_fails_naming_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("pods.json");
    gc()
        .arg(testdata("secrets.json"))
        .arg(&missing)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("pods.json"));
}

#[test]
fn malformed_file_fails_naming_the_file() {
    gc()
        .arg(testdata("jobs.json"))
        .arg(testdata("truncated.json"))
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("truncated.json"))
        .stderr(predicate::str::contains("parsing"));
}

#[test]
fn logs_stay_off_stdout() {
    gc()
        .env("OFFGC_LOG", "debug")
        .arg(testdata("secrets.json"))
        .arg(testdata("jobs.json"))
        .assert()
        .success()
        .stdout(EXPECTED)
        .stderr(predicate::str::contains("orphan scan complete"));
}

#[test]
fn failure_diagnostic_mentions_file_and_cause_once() {
    let assert = gc().arg(testdata("truncated.json")).assert().failure().code(1);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert_eq!(stderr.lines().count(), 1, "got {stderr:?}");
    assert!(stderr.starts_with("k8s-offline-gc: ingesting snapshot: parsing "), "got {stderr:?}");
    assert_eq!(stderr.matches("truncated.json").count(), 1, "got {stderr:?}");
    assert_eq!(stderr.matches("EOF while parsing").count(), 1, "got {stderr:?}");
}
