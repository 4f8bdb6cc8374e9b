//! End-to-end tests for the complete flow.
//!
//! Tests the full pipeline: record/import → query → delete, through the
//! `sculptor` binary with an isolated HOME and database.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn sculptor_binary() -> String {
    env!("CARGO_BIN_EXE_sculptor").to_string()
}

fn db_path(temp: &Path) -> PathBuf {
    temp.join("data").join("sculptor.db")
}

/// The binary with an isolated home and database, dating samples in `tz`.
fn command(temp: &Path, tz: &str) -> Command {
    let mut command = Command::new(sculptor_binary());
    command
        .env("HOME", temp)
        .env("XDG_CONFIG_HOME", temp.join(".config"))
        .env("TZ", tz)
        .env("SCULPTOR_DATABASE_PATH", db_path(temp));
    command
}

fn sculptor(temp: &Path, args: &[&str]) -> Output {
    command(temp, "UTC")
        .args(args)
        .output()
        .expect("failed to run sculptor")
}

fn sculptor_with_stdin(temp: &Path, tz: &str, args: &[&str], stdin: &str) -> Output {
    let mut child = command(temp, tz)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn sculptor");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// 40 seconds of Code followed by 20 seconds of Slack on 2025-01-15 (UTC),
/// then 90 seconds of Code, plus one Firefox sample the day before.
fn fixture_jsonl() -> String {
    let mut lines = Vec::new();
    let mut push = |id: String, second: u32, app: &str, pid: u32| {
        let minute = second / 60;
        let sec = second % 60;
        lines.push(format!(
            r#"{{"id":"{id}","timestamp":"2025-01-15T12:{minute:02}:{sec:02}Z","owner":{{"name":"{app}","processId":{pid}}},"title":"{app} window"}}"#
        ));
    };
    for i in 0..40 {
        push(format!("code-{i}"), i, "Visual Studio Code", 100);
    }
    for i in 40..60 {
        push(format!("slack-{i}"), i, "Slack", 200);
    }
    for i in 60..151 {
        push(format!("code-late-{i}"), i, "Visual Studio Code", 100);
    }
    lines.push(
        r#"{"id":"ff-1","timestamp":"2025-01-14T12:00:00Z","applicationName":"Firefox","processId":300}"#
            .to_string(),
    );
    lines.join("\n")
}

fn seeded() -> TempDir {
    let temp = TempDir::new().unwrap();
    let output = sculptor_with_stdin(temp.path(), "UTC", &["import"], &fixture_jsonl());
    assert!(
        output.status.success(),
        "import should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(stdout(&output).trim(), "Imported 152 samples");
    temp
}

#[test]
fn test_import_then_usage_queries() {
    let temp = seeded();

    let total = sculptor(temp.path(), &["usage", "total", "--date", "2025-01-15"]);
    assert!(total.status.success());
    assert_eq!(
        stdout(&total).trim(),
        "Total focus time on 2025-01-15: 0h 2m 31s"
    );

    let most = sculptor(temp.path(), &["usage", "most-used", "--date", "1/15/2025"]);
    assert!(most.status.success());
    assert_eq!(
        stdout(&most).trim(),
        "Most used on 2025-01-15: Visual Studio Code (0h 2m 11s)"
    );

    let categories = sculptor(
        temp.path(),
        &[
            "usage",
            "categories",
            "--start",
            "2025-01-14",
            "--end",
            "2025-01-15",
            "--json",
        ],
    );
    assert!(categories.status.success());
    let json: serde_json::Value = serde_json::from_slice(&categories.stdout).unwrap();
    assert_eq!(json["categories"]["Browsing"]["seconds"], 1);
    assert_eq!(json["categories"]["Code"]["minutes"], 2);
    assert_eq!(json["categories"]["Code"]["seconds"], 11);
    assert_eq!(json["categories"]["Communication"]["seconds"], 20);
}

#[test]
fn test_apps_over_range() {
    let temp = seeded();
    let apps = sculptor(
        temp.path(),
        &["usage", "apps", "--start", "2025-01-14", "--end", "2025-01-15"],
    );
    assert!(apps.status.success());
    let apps = stdout(&apps);
    assert!(apps.starts_with("Applications on 2025-01-14..2025-01-15"));
    assert!(apps.contains("Firefox"));
    assert!(apps.trim_end().ends_with("Total: 0h 2m 32s"));
}

#[test]
fn test_samples_dated_with_their_own_dst_offset() {
    // Berlin is UTC+1 in January and UTC+2 in July. Both samples fall just
    // before or after local midnight, so a single offset misplaces one.
    let temp = TempDir::new().unwrap();
    let input = concat!(
        r#"{"id":"winter","timestamp":"2026-01-15T22:30:00Z","applicationName":"Code","processId":1}"#,
        "\n",
        r#"{"id":"summer","timestamp":"2026-07-15T22:30:00Z","applicationName":"Code","processId":1}"#,
        "\n",
    );
    let output = sculptor_with_stdin(temp.path(), "Europe/Berlin", &["import"], input);
    assert!(output.status.success());

    let total = |date: &str| {
        let output = command(temp.path(), "Europe/Berlin")
            .args(["usage", "total", "--date", date])
            .output()
            .expect("failed to run sculptor");
        (output.status.success(), stdout(&output).trim().to_string())
    };
    // 23:30 CET
    assert_eq!(
        total("2026-01-15"),
        (true, "Total focus time on 2026-01-15: 0h 0m 1s".to_string())
    );
    assert!(!total("2026-01-16").0);
    // 00:30 CEST
    assert!(!total("2026-07-15").0);
    assert_eq!(
        total("2026-07-16"),
        (true, "Total focus time on 2026-07-16: 0h 0m 1s".to_string())
    );

    let samples = command(temp.path(), "Europe/Berlin")
        .args(["samples", "--date", "2026-07-16"])
        .output()
        .expect("failed to run sculptor");
    assert!(stdout(&samples).starts_with("00:30:00  Code"));
}

#[test]
fn test_import_is_idempotent() {
    let temp = seeded();
    let again = sculptor_with_stdin(temp.path(), "UTC", &["import"], &fixture_jsonl());
    assert!(again.status.success());
    assert_eq!(stdout(&again).trim(), "Imported 0 samples");
}

#[test]
fn test_empty_day_exits_non_zero() {
    let temp = seeded();
    let output = sculptor(temp.path(), &["usage", "total", "--date", "2025-02-01"]);
    assert!(!output.status.success());
    assert_eq!(stdout(&output).trim(), "No samples recorded for 2025-02-01.");
}

#[test]
fn test_invalid_date_is_an_error() {
    let temp = seeded();
    let output = sculptor(temp.path(), &["usage", "total", "--date", "15.01.2025"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid date"));
}

#[test]
fn test_sessions_list_and_delete() {
    let temp = seeded();

    let list = sculptor(
        temp.path(),
        &["sessions", "list", "--date", "2025-01-15", "--json"],
    );
    assert!(list.status.success());
    let json: serde_json::Value = serde_json::from_slice(&list.stdout).unwrap();
    let sessions = json["sessions"].as_array().unwrap();
    // Code 39s and Slack 19s are below the default 60s minimum.
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["owner_name"], "Visual Studio Code");
    assert_eq!(sessions[0]["samples"], 91);
    let id = sessions[0]["id"].as_str().unwrap().to_string();

    let delete = sculptor(
        temp.path(),
        &["sessions", "delete", &id, "--date", "2025-01-15"],
    );
    assert!(
        delete.status.success(),
        "delete should succeed: {}",
        String::from_utf8_lossy(&delete.stderr)
    );
    assert!(stdout(&delete).contains("91 samples"));

    let total = sculptor(temp.path(), &["usage", "total", "--date", "2025-01-15"]);
    assert_eq!(
        stdout(&total).trim(),
        "Total focus time on 2025-01-15: 0h 1m 0s"
    );

    let again = sculptor(
        temp.path(),
        &["sessions", "delete", &id, "--date", "2025-01-15"],
    );
    assert!(!again.status.success());
}

#[test]
fn test_record_then_status_and_samples() {
    let temp = TempDir::new().unwrap();

    let output = sculptor(
        temp.path(),
        &[
            "record",
            "--app",
            "Terminal",
            "--pid",
            "77",
            "--title",
            "zsh",
            "--at",
            "2025-01-15T08:30:00Z",
        ],
    );
    assert!(
        output.status.success(),
        "record should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let recorded = stdout(&output);
    let id = recorded.trim().strip_prefix("Recorded sample ").unwrap();
    assert_eq!(id.len(), 36);
    assert!(db_path(temp.path()).exists());

    let status = sculptor(temp.path(), &["status"]);
    assert!(status.status.success());
    let status = stdout(&status);
    assert!(status.contains("Samples: 1"));
    assert!(status.contains("Last sample: 2025-01-15T08:30:00Z (Terminal, pid 77)"));

    let samples = sculptor(temp.path(), &["samples", "--date", "2025-01-15", "--json"]);
    let json: serde_json::Value = serde_json::from_slice(&samples.stdout).unwrap();
    assert_eq!(json[0]["id"], id);

    let samples = sculptor(temp.path(), &["samples", "--date", "2025-01-15"]);
    assert!(samples.status.success());
    let samples = stdout(&samples);
    assert!(samples.starts_with("08:30:00  Terminal"));
    assert!(samples.trim_end().ends_with("zsh"));
}

#[test]
fn test_import_invalid_json_fails_without_writing() {
    let temp = TempDir::new().unwrap();
    let input = concat!(
        r#"{"timestamp":"2025-01-15T12:00:00Z","application_name":"Code","process_id":1}"#,
        "\n",
        "not json\n",
    );
    let output = sculptor_with_stdin(temp.path(), "UTC", &["import"], input);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid JSON on line 2"));

    let status = sculptor(temp.path(), &["status"]);
    assert!(stdout(&status).contains("Samples: 0"));
}

#[test]
fn test_no_subcommand_prints_help() {
    let temp = TempDir::new().unwrap();
    let output = sculptor(temp.path(), &[]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage:"));
}
