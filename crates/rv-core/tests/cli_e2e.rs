//! End-to-end tests for the rdbviz binary.
//!
//! Each test runs in its own temp directory with settings discovery pointed
//! at an empty config home, so a developer's own settings never leak in.

use assert_cmd::Command;
use predicates::prelude::*;
use rv_common::{Report, REPORT_SCHEMA_VERSION};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const NOW: &str = "2026-03-01T00:00:00Z";

const RECORDS: &str = concat!(
    r#"{"kind":"aux","key":"redis-ver","value":"7.2.4"}"#,
    "\n",
    r#"{"kind":"db_size","db":0,"keys":4,"expires":2}"#,
    "\n",
    r#"{"kind":"key","db":0,"key":"user:1001:profile","type":"hash","size":4096,"encoding":"listpack","elements":12}"#,
    "\n",
    r#"{"kind":"key","db":0,"key":"user:1002:profile","type":"hash","size":2048,"encoding":"listpack","elements":8}"#,
    "\n",
    r#"{"kind":"key","db":0,"key":"session:abc","type":"string","size":64,"expiration":"2026-03-01T00:30:00Z"}"#,
    "\n",
    r#"{"kind":"key","db":1,"key":"queue","type":"list","size":90000,"encoding":"quicklist","elements":700,"expiration":"2026-02-28T00:00:00Z"}"#,
    "\n",
);

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("rdbviz").expect("rdbviz binary should exist");
        cmd.current_dir(self.dir.path())
            .env("XDG_CONFIG_HOME", self.path("config-home"))
            .env_remove("RDBVIZ_CONFIG")
            .env_remove("RDBVIZ_CONFIG_DIR")
            .env_remove("RDBVIZ_LOG")
            .env_remove("RDBVIZ_LOG_FORMAT")
            .env_remove("RUST_LOG");
        cmd
    }

    fn analyze(&self, input: &Path, out: &Path) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("analyze")
            .arg("--input")
            .arg(input)
            .arg("--out")
            .arg(out)
            .args(["--now", NOW, "--progress", "0"]);
        cmd
    }
}

fn read_report(path: &Path) -> Report {
    Report::from_json(&std::fs::read_to_string(path).unwrap()).unwrap()
}

mod analyze {
    use super::*;

    #[test]
    fn writes_complete_report() {
        let ws = Workspace::new();
        let input = ws.write("dump.jsonl", RECORDS);
        let out = ws.path("out/report.json");

        ws.analyze(&input, &out)
            .assert()
            .code(0)
            .stdout(predicate::str::contains("4 keys"));

        let report = read_report(&out);
        assert_eq!(report.summary.total_keys, 4);
        assert_eq!(report.summary.total_size, 4096 + 2048 + 64 + 90000);
        assert_eq!(report.summary.db_count, 2);
        assert_eq!(report.summary.with_ttl, 2);
        assert_eq!(report.summary.expired, 1);
        assert_eq!(report.summary.now, NOW);
        assert_eq!(report.meta.redis_version.as_deref(), Some("7.2.4"));
        assert!(!report.meta.partial);

        assert_eq!(report.types[0].key_type, "list");
        assert_eq!(report.bigkeys[0].key, "queue");
        assert_eq!(report.bigkeys[0].elements, 700);
        assert!(report.prefixes.iter().any(|p| p.prefix == "user:" && p.count == 2));

        let ttl = |label: &str| {
            report
                .ttl_buckets
                .iter()
                .find(|b| b.label == label)
                .map(|b| b.count)
        };
        assert_eq!(ttl("no-expire"), Some(2));
        assert_eq!(ttl("expired"), Some(1));
        assert_eq!(ttl("<=1h"), Some(1));
    }

    #[test]
    fn rdb_is_an_alias_for_input() {
        let ws = Workspace::new();
        ws.write("dump.jsonl", RECORDS);

        ws.cmd()
            .args(["analyze", "--rdb", "dump.jsonl", "--out", "r.json", "--now", NOW])
            .assert()
            .success();
        assert!(ws.path("r.json").exists());
    }

    #[test]
    fn source_is_recorded_as_absolute_path() {
        let ws = Workspace::new();
        ws.write("dump.jsonl", RECORDS);

        ws.cmd()
            .args(["analyze", "-i", "dump.jsonl", "-o", "r.json", "--now", NOW])
            .assert()
            .success();
        let report = read_report(&ws.path("r.json"));
        assert!(Path::new(&report.meta.source).is_absolute());
        assert!(report.meta.source.ends_with("dump.jsonl"));
    }

    #[test]
    fn same_input_and_now_give_identical_reports() {
        let ws = Workspace::new();
        let input = ws.write("dump.jsonl", RECORDS);
        let first = ws.path("a.json");
        let second = ws.path("b.json");

        ws.analyze(&input, &first).assert().success();
        ws.analyze(&input, &second).assert().success();

        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }

    #[test]
    fn flags_override_settings() {
        let ws = Workspace::new();
        let input = ws.write("dump.jsonl", RECORDS);
        let out = ws.path("r.json");

        ws.analyze(&input, &out)
            .args(["--topn", "1", "--prefix-depth", "1"])
            .assert()
            .success();

        let report = read_report(&out);
        assert_eq!(report.bigkeys.len(), 1);
        assert_eq!(report.prefixes.len(), 1);
        assert_eq!(report.prefixes[0].prefix, "queue");
    }

    #[test]
    fn limit_writes_partial_report() {
        let ws = Workspace::new();
        let input = ws.write("dump.jsonl", RECORDS);
        let out = ws.path("r.json");

        ws.analyze(&input, &out)
            .args(["--limit", "2"])
            .assert()
            .code(1);

        let report = read_report(&out);
        assert!(report.meta.partial);
        assert_eq!(report.summary.total_keys, 2);
    }

    #[test]
    fn json_format_reports_run() {
        let ws = Workspace::new();
        let input = ws.write("dump.jsonl", RECORDS);
        let out = ws.path("r.json");

        let output = ws
            .analyze(&input, &out)
            .args(["--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["status"], "complete");
        assert_eq!(value["keys"], 4);
        assert_eq!(value["schema_version"], REPORT_SCHEMA_VERSION);
        assert!(value["run_id"].as_str().unwrap().starts_with("run-"));
    }

    #[test]
    fn jsonl_progress_goes_to_stderr() {
        let ws = Workspace::new();
        let input = ws.write("dump.jsonl", RECORDS);

        ws.cmd()
            .arg("analyze")
            .arg("--input")
            .arg(&input)
            .args(["--out", "r.json", "--now", NOW, "--progress", "1h", "-f", "jsonl", "-q"])
            .assert()
            .success()
            .stderr(predicate::str::contains(r#""event":"scan_started""#))
            .stderr(predicate::str::contains(r#""event":"scan_complete""#))
            .stderr(predicate::str::contains(r#""event":"report_written""#));
    }
}

mod errors {
    use super::*;

    #[test]
    fn malformed_line_is_input_error_and_writes_nothing() {
        let ws = Workspace::new();
        let input = ws.write(
            "dump.jsonl",
            concat!(
                r#"{"kind":"key","db":0,"key":"a","type":"string","size":1}"#,
                "\n",
                "{broken\n",
            ),
        );
        let out = ws.path("r.json");

        ws.analyze(&input, &out)
            .assert()
            .code(12)
            .stderr(predicate::str::contains("line 2"));
        assert!(!out.exists());
    }

    #[test]
    fn missing_input_is_input_error() {
        let ws = Workspace::new();
        ws.analyze(&ws.path("nope.jsonl"), &ws.path("r.json"))
            .assert()
            .code(12);
    }

    #[test]
    fn structured_error_in_json_mode() {
        let ws = Workspace::new();
        let output = ws
            .analyze(&ws.path("nope.jsonl"), &ws.path("r.json"))
            .args(["--format", "json", "-q"])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(12));

        let stderr = String::from_utf8(output.stderr).unwrap();
        let line = stderr.lines().last().unwrap();
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["category"], "input");
        assert!(value["context"]["path"].is_string());
    }

    #[test]
    fn bad_flag_value_is_args_error() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["analyze", "--input", "x", "--out", "y", "--topn", "many"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("error"));
    }

    #[test]
    fn bad_progress_duration_is_args_error() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["analyze", "--input", "x", "--out", "y", "--progress", "soon"])
            .assert()
            .code(10);
    }

    #[test]
    fn bad_now_is_args_error() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["analyze", "--input", "x", "--out", "y", "--now", "yesterday"])
            .assert()
            .code(10);
    }

    #[test]
    fn unknown_command_is_args_error() {
        Workspace::new()
            .cmd()
            .arg("nonexistent-command")
            .assert()
            .code(10);
    }

    #[test]
    fn out_of_range_setting_is_config_error() {
        let ws = Workspace::new();
        let input = ws.write("dump.jsonl", RECORDS);
        let out = ws.path("r.json");

        ws.analyze(&input, &out)
            .args(["--topn", "1000000"])
            .assert()
            .code(11)
            .stderr(predicate::str::contains("top_n"));
        assert!(!out.exists());
    }

    #[test]
    fn unparsable_settings_file_is_config_error() {
        let ws = Workspace::new();
        let input = ws.write("dump.jsonl", RECORDS);
        let config = ws.write("rdbviz.json", "{ not json");

        ws.analyze(&input, &ws.path("r.json"))
            .arg("--config")
            .arg(&config)
            .assert()
            .code(11);
    }

    #[test]
    fn unwritable_output_is_io_error() {
        let ws = Workspace::new();
        let input = ws.write("dump.jsonl", RECORDS);
        let blocker = ws.write("blocker", "x");

        ws.analyze(&input, &blocker.join("r.json"))
            .assert()
            .code(21);
    }
}

mod summarize {
    use super::*;

    fn analyzed() -> (Workspace, PathBuf) {
        let ws = Workspace::new();
        let input = ws.write("dump.jsonl", RECORDS);
        let out = ws.path("r.json");
        ws.analyze(&input, &out).assert().success();
        (ws, out)
    }

    #[test]
    fn markdown_by_default() {
        let (ws, report) = analyzed();
        ws.cmd()
            .arg("summarize")
            .arg(&report)
            .assert()
            .success()
            .stdout(predicate::str::starts_with("# rdbviz report"))
            .stdout(predicate::str::contains("## Big keys"))
            .stdout(predicate::str::contains("`queue`"));
    }

    #[test]
    fn one_line_summary() {
        let (ws, report) = analyzed();
        ws.cmd()
            .arg("summarize")
            .arg(&report)
            .args(["--format", "summary"])
            .assert()
            .success()
            .stdout(predicate::str::contains("4 keys"))
            .stdout(predicate::str::contains("1 expired"));
    }

    #[test]
    fn json_reparses() {
        let (ws, report) = analyzed();
        let output = ws
            .cmd()
            .arg("summarize")
            .arg(&report)
            .args(["--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let parsed = Report::from_json(&String::from_utf8(output.stdout).unwrap()).unwrap();
        assert_eq!(parsed, read_report(&report));
    }

    #[test]
    fn garbage_report_is_input_error() {
        let ws = Workspace::new();
        let report = ws.write("r.json", "{\"meta\": 3}");
        ws.cmd().arg("summarize").arg(&report).assert().code(12);
    }
}

mod schema {
    use super::*;

    #[test]
    fn list_names_report() {
        Workspace::new()
            .cmd()
            .args(["schema", "--list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Report"))
            .stdout(predicate::str::contains("SourceEntry"));
    }

    #[test]
    fn named_schema_is_json() {
        let output = Workspace::new()
            .cmd()
            .args(["schema", "BigKeyRecord", "--compact"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let stdout = String::from_utf8(output.stdout).unwrap();
        assert_eq!(stdout.trim().lines().count(), 1);
        let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
        assert!(value["properties"].get("elements").is_some());
    }

    #[test]
    fn unknown_schema_is_args_error() {
        Workspace::new()
            .cmd()
            .args(["schema", "Nope"])
            .assert()
            .code(10);
    }
}

mod config {
    use super::*;

    #[test]
    fn show_defaults() {
        Workspace::new()
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("built-in defaults"))
            .stdout(predicate::str::contains("| top_n | 50 |"));
    }

    #[test]
    fn show_file_from_env() {
        let ws = Workspace::new();
        let config = ws.write("custom.json", r#"{"top_n": 7}"#);

        let output = ws
            .cmd()
            .env("RDBVIZ_CONFIG", &config)
            .args(["config", "show", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(value["settings"]["top_n"], 7);
        assert_eq!(value["source"], "environment variable");
    }

    #[test]
    fn validate_reports_lint_warnings() {
        let ws = Workspace::new();
        let config = ws.write("rdbviz.json", r#"{"top_n": 0}"#);

        ws.cmd()
            .args(["config", "validate", "--config"])
            .arg(&config)
            .assert()
            .success()
            .stdout(predicate::str::contains("Valid"))
            .stdout(predicate::str::contains("Warning"));
    }

    #[test]
    fn validate_rejects_unknown_fields() {
        let ws = Workspace::new();
        let config = ws.write("rdbviz.json", r#"{"topn": 5}"#);

        ws.cmd()
            .args(["config", "validate", "--config"])
            .arg(&config)
            .assert()
            .code(11);
    }

    #[test]
    fn missing_explicit_file_is_config_error() {
        let ws = Workspace::new();
        ws.cmd()
            .args(["config", "validate", "--config", "missing.json"])
            .assert()
            .code(11);
    }
}

#[test]
fn version_prints_schema_version() {
    Workspace::new()
        .cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(REPORT_SCHEMA_VERSION));
}
