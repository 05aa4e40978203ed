//! End-to-end tests for the `wl` binary.
//!
//! Tests the pipeline: plan → allocate → payload file → submit.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn wl_binary() -> String {
    env!("CARGO_BIN_EXE_wl").to_string()
}

/// Runs `wl` with `HOME` pointed at `home` so no user config leaks in.
fn wl(home: &Path, args: &[&str]) -> Output {
    Command::new(wl_binary())
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("WL_API_TOKEN")
        .env_remove("WL_ACCOUNT_ID")
        .env_remove("WL_API_URL")
        .args(args)
        .output()
        .expect("failed to run wl")
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Mon 2024-03-04 through Fri 2024-03-15, two tickets at 60/40.
const TWO_TICKET_PLAN: &str = r#"
start = "2024-03-04"
end = "2024-03-15"
total_hours = 100

[[tickets]]
id = "SA-1"
percent_of_total = 60
activities = { DEV = 50, MEET = 50 }

[[tickets]]
id = "SA-2"
percent_of_total = 40
activities = { DEV = 50, MEET = 50, PM = 0 }
"#;

#[test]
fn test_allocate_writes_payload_for_working_days_only() {
    let temp = TempDir::new().unwrap();
    let plan = write_file(temp.path(), "plan.toml", TWO_TICKET_PLAN);
    let payload = temp.path().join("payload.json");

    let output = wl(
        temp.path(),
        &[
            "allocate",
            "--plan",
            plan.to_str().unwrap(),
            "--output",
            payload.to_str().unwrap(),
        ],
    );
    assert!(
        output.status.success(),
        "allocate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Working days: 10 (2024-03-04 to 2024-03-15)"));
    assert!(stdout.contains("not equal to 8"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&payload).unwrap()).unwrap();
    let days = json.as_object().unwrap();
    assert_eq!(days.len(), 10);
    assert!(!days.contains_key("2024-03-09"), "Saturday must be absent");
    assert!(!days.contains_key("2024-03-10"), "Sunday must be absent");

    let day = &json["2024-03-04"];
    assert_eq!(day["SA-1"]["DEV"], 3.0);
    assert_eq!(day["SA-1"]["MEET"], 3.0);
    assert_eq!(day["SA-2"]["DEV"], 2.0);
    assert_eq!(day["SA-2"]["MEET"], 2.0);
    // Zero cells stay in the file.
    assert_eq!(day["SA-2"]["PM"], 0.0);
}

#[test]
fn test_allocate_json_respects_configured_holidays() {
    let temp = TempDir::new().unwrap();
    let plan = write_file(temp.path(), "plan.toml", TWO_TICKET_PLAN);
    let config = write_file(
        temp.path(),
        "config.toml",
        r#"holidays = ["2024-03-08", "2024-03-11"]"#,
    );

    let output = wl(
        temp.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "allocate",
            "--plan",
            plan.to_str().unwrap(),
            "--total-hours",
            "64",
            "--json",
        ],
    );
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let days = json.as_object().unwrap();
    assert_eq!(days.len(), 8);
    assert!(!days.contains_key("2024-03-08"));
    assert!(!days.contains_key("2024-03-11"));
    // 64h * 60% / 8 days * 50%
    assert_eq!(json["2024-03-12"]["SA-1"]["DEV"], 2.4);
}

#[test]
fn test_allocate_rejects_bad_percentages_without_output() {
    let temp = TempDir::new().unwrap();
    let plan = write_file(
        temp.path(),
        "plan.toml",
        r#"
start = "2024-03-04"
end = "2024-03-08"
total_hours = 40
[[tickets]]
id = "SA-1"
percent_of_total = 100
activities = { DEV = 70, BUGFIX = 20 }
[[tickets]]
id = "SA-2"
percent_of_total = 10
activities = { SUPPORT = 0 }
"#,
    );
    let payload = temp.path().join("payload.json");

    let output = wl(
        temp.path(),
        &[
            "allocate",
            "--plan",
            plan.to_str().unwrap(),
            "--output",
            payload.to_str().unwrap(),
        ],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("SA-1 sum to 90"), "{stderr}");
    assert!(stderr.contains("SA-2 sum to 0"), "{stderr}");
    assert!(!payload.exists());
}

#[test]
fn test_allocate_weekend_range_fails() {
    let temp = TempDir::new().unwrap();
    let plan = write_file(temp.path(), "plan.toml", TWO_TICKET_PLAN);

    let output = wl(
        temp.path(),
        &[
            "allocate",
            "--plan",
            plan.to_str().unwrap(),
            "--start",
            "2024-03-09",
            "--end",
            "2024-03-10",
        ],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no working days"));
}

#[test]
fn test_submit_requires_token() {
    let temp = TempDir::new().unwrap();
    let payload = write_file(
        temp.path(),
        "payload.json",
        r#"{"2024-03-04":{"SA-1":{"DEV":8.0}}}"#,
    );
    let config = write_file(temp.path(), "config.toml", r#"account_id = "acct""#);

    let output = wl(
        temp.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "submit",
            "--input",
            payload.to_str().unwrap(),
        ],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("api_token"));
}

/// Nothing listens on the discard port, so every request fails at the
/// transport level; each positive entry is still attempted once and kept
/// for retry.
#[test]
fn test_submit_records_transport_failures_for_retry() {
    let temp = TempDir::new().unwrap();
    let payload = write_file(
        temp.path(),
        "payload.json",
        r#"{"2024-03-04":{"SA-1":{"DEV":6.0,"MEET":2.0,"PM":0.0}}}"#,
    );
    let config = write_file(
        temp.path(),
        "config.toml",
        r#"
api_url = "http://127.0.0.1:9"
api_token = "test-token"
account_id = "acct"
"#,
    );
    let failed = temp.path().join("failed.json");

    let output = wl(
        temp.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "submit",
            "--input",
            payload.to_str().unwrap(),
            "--failed-output",
            failed.to_str().unwrap(),
        ],
    );
    assert!(!output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("Failed to log").count(), 2, "{stdout}");
    assert!(stdout.contains("Logged 0 of 2 worklogs"), "{stdout}");
    assert!(String::from_utf8_lossy(&output.stderr).contains("2 of 2 worklogs were not logged"));

    let retry: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&failed).unwrap()).unwrap();
    assert_eq!(
        retry,
        serde_json::json!({ "2024-03-04": { "SA-1": { "DEV": 6.0, "MEET": 2.0 } } })
    );
}
