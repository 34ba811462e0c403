//! Integration tests for the `hrdesk` command-line interface.
//!
//! Each test seeds a temporary data directory with JSON collection files
//! and runs the binary against it.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Fixed evaluation instant used with `--at`.
const AT: &str = "2025-09-15T08:00:00Z";

/// Helper: create a Command for the `hrdesk` binary with a clean environment.
fn hrdesk() -> Command {
    let mut cmd = cargo_bin_cmd!("hrdesk");
    cmd.env_remove("HRDESK_PORT")
        .env_remove("HRDESK_DATA_DIR")
        .env_remove("HRDESK_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &Path, file: &str, body: &str) {
    fs::write(dir.join(file), body).expect("write fixture");
}

/// Two Fairness tickets (12h and 100h effective), an in-progress Hiring
/// ticket, four requisitions, and seven survey responses.
fn seeded_dir() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    write(
        dir.path(),
        "tickets.json",
        r#"[
  {"id": "tkt_f1", "category": "Fairness", "status": "Closed", "title": "Shift swap dispute",
   "createdAt": "2025-09-12T08:00:00Z", "closedAt": "2025-09-12T20:00:00Z"},
  {"id": "tkt_f2", "category": "Fairness", "status": "Closed", "title": "Bonus allocation",
   "createdAt": "2025-09-10T08:00:00Z", "closedAt": "2025-09-14T12:00:00Z"},
  {"id": "tkt_h1", "category": "Hiring", "status": "InProgress", "title": "Backend engineer",
   "createdAt": "2025-06-01T00:00:00Z"}
]"#,
    );
    write(
        dir.path(),
        "requisitions.json",
        r#"[
  {"id": "RQ1", "ticketId": "tkt_h1", "keyRole": true,
   "firstInterviewAt": "2025-08-01T00:00:00Z", "offerSignedAt": "2025-08-02T00:00:00Z"},
  {"id": "RQ2", "ticketId": "tkt_h1", "keyRole": true,
   "firstInterviewAt": "2025-08-01T00:00:00Z", "offerSignedAt": "2025-08-03T00:00:00Z"},
  {"id": "RQ3", "ticketId": "tkt_h1", "keyRole": false,
   "approvedAt": "2025-07-01T00:00:00Z", "onboardedAt": "2025-07-11T00:00:00Z"},
  {"id": "RQ4", "ticketId": "tkt_gone", "keyRole": false,
   "approvedAt": "2025-07-01T00:00:00Z", "onboardedAt": "2025-07-06T00:00:00Z"}
]"#,
    );
    write(
        dir.path(),
        "surveys.json",
        r#"[{"score": 10}, {"score": 9}, {"score": 9}, {"score": 8},
            {"score": 7}, {"score": 6, "comment": "meh"}, {"score": 0}]"#,
    );
    dir
}

fn data_dir_arg(dir: &TempDir) -> String {
    dir.path().display().to_string()
}

fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    hrdesk()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("HR desk"));
}

#[test]
fn version_exits_0() {
    hrdesk()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hrdesk"));
}

// ──────────────────────────────────────────────
// 2. report
// ──────────────────────────────────────────────

#[test]
fn report_json_over_seeded_data() {
    let dir = seeded_dir();
    let output = hrdesk()
        .args(["--output", "json", "report", "--at", AT])
        .args(["--data-dir", &data_dir_arg(&dir)])
        .output()
        .expect("run hrdesk");
    assert!(output.status.success());

    let report = stdout_json(&output);
    assert_eq!(report["ttp"], 36.0);
    assert_eq!(report["ttf"], 180.0);
    assert_eq!(report["close72Rate"], 50);
    assert_eq!(report["poolMultiple"], 3);
    assert_eq!(report["eNPS"], 14);
}

#[test]
fn report_text_on_empty_store_shows_na() {
    let dir = TempDir::new().unwrap();
    hrdesk()
        .args(["report", "--at", AT, "--data-dir", &data_dir_arg(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::contains("n/a").count(5));
}

#[test]
fn report_json_on_empty_store_is_all_null() {
    let dir = TempDir::new().unwrap();
    let output = hrdesk()
        .args(["--output", "json", "report", "--data-dir", &data_dir_arg(&dir)])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report = stdout_json(&output);
    for key in ["ttp", "ttf", "close72Rate", "poolMultiple", "eNPS"] {
        assert!(report[key].is_null(), "{key} should be null: {report}");
    }
}

#[test]
fn report_rejects_malformed_at() {
    let dir = TempDir::new().unwrap();
    hrdesk()
        .args(["report", "--at", "yesterday", "--data-dir", &data_dir_arg(&dir)])
        .assert()
        .failure()
        .stderr(predicate::str::contains("RFC 3339"));
}

#[test]
fn report_on_malformed_file_exits_1() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "tickets.json", "{ not json");
    hrdesk()
        .args(["report", "--data-dir", &data_dir_arg(&dir)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("tickets.json"));
}

#[test]
fn report_rejects_out_of_range_stored_score() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "surveys.json", r#"[{"score": 200}, {"score": 0}]"#);
    hrdesk()
        .args(["report", "--data-dir", &data_dir_arg(&dir)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("surveys.json"))
        .stdout(predicate::str::contains("eNPS").not());
}

#[test]
fn json_errors_are_json() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "surveys.json", "[{\"score\": \"ten\"}]");
    let output = hrdesk()
        .args(["--output", "json", "report", "--data-dir", &data_dir_arg(&dir)])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let err: serde_json::Value = serde_json::from_slice(
        output
            .stderr
            .split(|b| *b == b'\n')
            .find(|line| line.starts_with(b"{"))
            .expect("a JSON error line"),
    )
    .unwrap();
    assert!(err["error"].as_str().unwrap().contains("surveys.json"));
}

#[test]
fn quiet_suppresses_error_text() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "tickets.json", "{ not json");
    hrdesk()
        .args(["--quiet", "report", "--data-dir", &data_dir_arg(&dir)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error:").not());
}

// ──────────────────────────────────────────────
// 3. sla, pause, resume
// ──────────────────────────────────────────────

#[test]
fn sla_json_for_slow_fairness_ticket() {
    let dir = seeded_dir();
    let output = hrdesk()
        .args(["--output", "json", "sla", "tkt_f2", "--at", AT])
        .args(["--data-dir", &data_dir_arg(&dir)])
        .output()
        .unwrap();
    assert!(output.status.success());
    let sla = stdout_json(&output);
    assert_eq!(sla["ticketId"], "tkt_f2");
    assert_eq!(sla["effectiveHours"], 100.0);
    assert_eq!(sla["targetHours"], 72.0);
    assert_eq!(sla["breached"], true);
    assert_eq!(sla["paused"], false);
}

#[test]
fn sla_unknown_ticket_exits_1() {
    let dir = seeded_dir();
    hrdesk()
        .args(["sla", "tkt_nope", "--data-dir", &data_dir_arg(&dir)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ticket not found: tkt_nope"));
}

#[test]
fn pause_then_resume_persists_interval() {
    let dir = seeded_dir();
    let data_dir = data_dir_arg(&dir);

    hrdesk()
        .args(["pause", "tkt_h1", "--reason", "candidate travelling"])
        .args(["--data-dir", &data_dir])
        .assert()
        .success()
        .stdout(predicate::str::contains("Paused tkt_h1 (stop_"));

    let raw = fs::read_to_string(dir.path().join("stop_clock.json")).unwrap();
    let stops: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stops[0]["ticketId"], "tkt_h1");
    assert_eq!(stops[0]["reason"], "candidate travelling");
    assert!(stops[0]["endAt"].is_null());

    let output = hrdesk()
        .args(["--output", "json", "sla", "tkt_h1", "--data-dir", &data_dir])
        .output()
        .unwrap();
    assert_eq!(stdout_json(&output)["paused"], true);

    hrdesk()
        .args(["resume", "tkt_h1", "--data-dir", &data_dir])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resumed tkt_h1"));

    let raw = fs::read_to_string(dir.path().join("stop_clock.json")).unwrap();
    let stops: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(stops[0]["endAt"].is_string());
}

#[test]
fn resume_without_pause_is_not_an_error() {
    let dir = seeded_dir();
    hrdesk()
        .args(["resume", "tkt_f1", "--data-dir", &data_dir_arg(&dir)])
        .assert()
        .success()
        .stdout(predicate::str::contains("no running pause"));

    let output = hrdesk()
        .args(["--output", "json", "resume", "tkt_f1"])
        .args(["--data-dir", &data_dir_arg(&dir)])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout_json(&output)["resumed"].is_null());
}

#[test]
fn pause_unknown_ticket_exits_1() {
    let dir = seeded_dir();
    hrdesk()
        .args(["pause", "tkt_ghost", "--data-dir", &data_dir_arg(&dir)])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ticket not found"));
    assert!(!dir.path().join("stop_clock.json").exists());
}

// ──────────────────────────────────────────────
// 4. Configuration layering
// ──────────────────────────────────────────────

#[test]
fn data_dir_from_config_file() {
    let data = seeded_dir();
    let cfg_dir = TempDir::new().unwrap();
    let cfg = cfg_dir.path().join("hrdesk.toml");
    fs::write(
        &cfg,
        format!(
            "[storage]\ndata_dir = {:?}\n",
            data.path().display().to_string()
        ),
    )
    .unwrap();

    let output = hrdesk()
        .args(["--output", "json", "report", "--at", AT, "--config"])
        .arg(&cfg)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["eNPS"], 14);
}

#[test]
fn data_dir_from_environment() {
    let data = seeded_dir();
    let output = hrdesk()
        .env("HRDESK_DATA_DIR", data.path())
        .args(["--output", "json", "report", "--at", AT])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["close72Rate"], 50);
}

#[test]
fn flag_beats_environment() {
    let seeded = seeded_dir();
    let empty = TempDir::new().unwrap();
    let output = hrdesk()
        .env("HRDESK_DATA_DIR", seeded.path())
        .args(["--output", "json", "report", "--at", AT])
        .args(["--data-dir", &data_dir_arg(&empty)])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(stdout_json(&output)["eNPS"].is_null());
}
