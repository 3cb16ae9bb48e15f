//! End-to-end runs of the `jobtrack` binary against a temporary CSV file.

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const HEADER: &str = "company,job_links,date_applied,connection_status,application_status";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    fn csv(&self) -> PathBuf {
        self.dir.path().join("job_applications.csv")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("jobtrack").expect("binary built");
        cmd.env("JOBTRACK_FILE", self.csv())
            .env("JOBTRACK_PROFILE", self.dir.path().join("user_config.json"))
            .env_remove("JOBTRACK_BACKEND")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[test]
fn empty_store_lists_nothing() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total applications: 0"));

    assert!(!ws.csv().exists());
}

#[test]
fn add_then_find_by_company_and_date() {
    let ws = Workspace::new();

    ws.cmd()
        .args([
            "add",
            "Acme",
            "--links",
            "https://acme.co/1",
            "--date",
            "2025-03-01",
            "--connection",
            "sent",
            "--status",
            "applied",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added application #1 for 'Acme'"));

    let content = fs::read_to_string(ws.csv()).unwrap();
    assert_eq!(
        content.lines().collect::<Vec<_>>(),
        vec![
            HEADER,
            "Acme,https://acme.co/1,2025-03-01,Connection sent,Applied"
        ]
    );

    ws.cmd()
        .args(["company", "ACME"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 1 application(s)"))
        .stdout(predicate::str::contains("https://acme.co/1"));

    ws.cmd()
        .args(["date", "2025-03-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1 Acme"));

    ws.cmd()
        .args(["date", "2025-03-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No applications found"));
}

#[test]
fn search_suggests_lowercased_unique_names() {
    let ws = Workspace::new();
    for company in ["Globex", "globex", "Acme"] {
        ws.cmd().args(["add", company]).assert().success();
    }

    ws.cmd()
        .args(["search", "GLO"])
        .assert()
        .success()
        .stdout("globex\n");

    ws.cmd()
        .arg("search")
        .assert()
        .success()
        .stdout("acme\nglobex\n");
}

#[test]
fn update_appends_links_and_keeps_unspecified_status() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["add", "Globex", "--date", "2025-03-01", "--connection", "waiting"])
        .assert()
        .success();

    ws.cmd()
        .args([
            "update",
            "1",
            "--links",
            " https://globex.co/a , ,https://globex.co/b",
            "--status",
            "rejected",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated application #1"));

    let content = fs::read_to_string(ws.csv()).unwrap();
    let expected = "Globex,N/A|https://globex.co/a|https://globex.co/b,\
                    2025-03-01,Waiting for referral,Rejected";
    assert!(content.contains(expected), "{content}");
}

#[test]
fn update_out_of_range_fails_without_touching_file() {
    let ws = Workspace::new();
    ws.cmd().args(["add", "Acme"]).assert().success();
    let before = fs::read_to_string(ws.csv()).unwrap();

    ws.cmd()
        .args(["update", "2", "--status", "rejected"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));

    assert_eq!(fs::read_to_string(ws.csv()).unwrap(), before);
}

#[test]
fn blank_company_is_rejected() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("company name must not be empty"));
}

#[test]
fn foreign_file_is_reset_unless_kept() {
    let ws = Workspace::new();
    fs::write(ws.csv(), "name,url\nAcme,https://acme.co\n").unwrap();

    ws.cmd()
        .args(["--keep-foreign", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("foreign header"));
    assert!(fs::read_to_string(ws.csv()).unwrap().starts_with("name,url"));

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No applications have been added yet."));
    assert_eq!(fs::read_to_string(ws.csv()).unwrap().trim(), HEADER);
}

#[test]
fn profile_set_then_show() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["profile", "set", "--name", "Ada Lovelace", "--position", "SWE Intern"])
        .assert()
        .success();

    ws.cmd()
        .args(["profile", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ada Lovelace"))
        .stdout(predicate::str::contains("SWE Intern"));
}
