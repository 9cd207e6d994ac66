#![allow(deprecated)] // cargo_bin is deprecated but still functional

use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn workspace() -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let base = temp.path().canonicalize().unwrap();
    (temp, base)
}

fn records(base: &Path) -> Vec<serde_json::Value> {
    fs::read_dir(base.join("Trash/info"))
        .unwrap()
        .map(|entry| {
            let content = fs::read_to_string(entry.unwrap().path()).unwrap();
            serde_json::from_str(&content).unwrap()
        })
        .collect()
}

fn holding_files(base: &Path) -> usize {
    fs::read_dir(base.join("Trash/files")).unwrap().count()
}

#[test]
fn put_without_path_prints_usage_and_does_nothing() {
    let (_temp, base) = workspace();

    Command::cargo_bin("trash-put")
        .unwrap()
        .current_dir(&base)
        .assert()
        .success()
        .stdout(contains("Please provide a file"));

    assert!(!base.join("Trash").exists());
}

#[test]
fn put_moves_relative_path_into_trash() {
    let (_temp, base) = workspace();
    fs::write(base.join("report.txt"), "hello\n").unwrap();

    Command::cargo_bin("trash-put")
        .unwrap()
        .current_dir(&base)
        .arg("report.txt")
        .assert()
        .success();

    assert!(!base.join("report.txt").exists());
    let records = records(&base);
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record["FileName"], "report.txt");
    assert_eq!(record["FilePath"], base.join("report.txt").to_str().unwrap());
    assert_eq!(record["FileSize"], 6);

    let identity = record["UUID"].as_str().unwrap();
    let holding = base.join("Trash/files").join(identity);
    assert_eq!(record["BackupFileLocation"], holding.to_str().unwrap());
    assert_eq!(fs::read_to_string(holding).unwrap(), "hello\n");
}

#[test]
fn put_warns_and_uses_only_the_first_path() {
    let (_temp, base) = workspace();
    fs::write(base.join("a.txt"), "a").unwrap();
    fs::write(base.join("b.txt"), "b").unwrap();

    Command::cargo_bin("trash-put")
        .unwrap()
        .current_dir(&base)
        .args(["a.txt", "b.txt"])
        .assert()
        .success()
        .stderr(contains("only one file at a time"));

    assert!(!base.join("a.txt").exists());
    assert!(base.join("b.txt").exists());
    assert_eq!(holding_files(&base), 1);
}

#[test]
fn put_missing_file_fails_without_holding_file() {
    let (_temp, base) = workspace();

    Command::cargo_bin("trash-put")
        .unwrap()
        .current_dir(&base)
        .arg("missing.txt")
        .assert()
        .failure()
        .stderr(contains("missing.txt is unavailable"));

    assert_eq!(holding_files(&base), 0);
    assert_eq!(records(&base).len(), 1);
}

#[test]
fn put_honours_trash_dir_flag() {
    let (_temp, base) = workspace();
    fs::write(base.join("a.txt"), "a").unwrap();

    Command::cargo_bin("trash-put")
        .unwrap()
        .current_dir(&base)
        .args(["--trash-dir", "bin", "a.txt"])
        .assert()
        .success();

    assert_eq!(fs::read_dir(base.join("bin/files")).unwrap().count(), 1);
    assert!(!base.join("Trash").exists());
}

#[test]
fn list_shows_live_and_stale_entries() {
    let (_temp, base) = workspace();
    fs::write(base.join("kept.txt"), "hello\n").unwrap();
    for name in ["kept.txt", "ghost.txt"] {
        let _ = Command::cargo_bin("trash-put")
            .unwrap()
            .current_dir(&base)
            .arg(name)
            .output()
            .unwrap();
    }

    Command::cargo_bin("trash-list")
        .unwrap()
        .current_dir(&base)
        .assert()
        .success()
        .stdout(contains(base.join("kept.txt").to_str().unwrap()))
        .stdout(contains("6 B"))
        .stdout(contains("ghost.txt [stale]"));

    // Fresh stale records are kept: the deletion could still be in flight.
    Command::cargo_bin("trash-list")
        .unwrap()
        .current_dir(&base)
        .arg("--prune-stale")
        .assert()
        .success()
        .stdout(contains("ghost.txt [stale]"));
    assert_eq!(records(&base).len(), 2);
}

#[test]
fn list_on_missing_trash_prints_nothing() {
    let (_temp, base) = workspace();

    Command::cargo_bin("trash-list")
        .unwrap()
        .current_dir(&base)
        .assert()
        .success()
        .stdout("");
}

#[test]
fn list_treats_missing_holding_dir_as_empty() {
    let (_temp, base) = workspace();
    fs::create_dir_all(base.join("Trash/info")).unwrap();

    Command::cargo_bin("trash-list")
        .unwrap()
        .current_dir(&base)
        .assert()
        .success()
        .stdout("")
        .stderr("");
}

#[test]
fn put_records_canonical_holding_location() {
    let (_temp, base) = workspace();
    fs::create_dir(base.join("sub")).unwrap();
    fs::write(base.join("a.txt"), "a").unwrap();

    Command::cargo_bin("trash-put")
        .unwrap()
        .current_dir(&base)
        .args(["--trash-dir", "sub/../Trash", "a.txt"])
        .assert()
        .success();

    let records = records(&base);
    let identity = records[0]["UUID"].as_str().unwrap();
    let holding = base.join("Trash/files").join(identity);
    assert_eq!(records[0]["BackupFileLocation"], holding.to_str().unwrap());

    Command::cargo_bin("trash-list")
        .unwrap()
        .current_dir(&base)
        .assert()
        .success()
        .stdout(contains(base.join("a.txt").to_str().unwrap()))
        .stderr("");
}
