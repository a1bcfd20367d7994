//! End-to-end tests for the `rewind` binary.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

mod generators;

use generators::{user_line, SessionsTree};

const CWD: &str = "/work/project";

/// A `rewind` command isolated from the user's config and environment.
fn rewind(tree: &SessionsTree, home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rewind").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("RUST_LOG")
        .env_remove("REWIND_CONFIG")
        .env_remove("REWIND_CWD")
        .args(["--sessions-dir"])
        .arg(tree.root())
        .args(["--cwd", CWD]);
    cmd
}

fn sample_tree() -> SessionsTree {
    let tree = SessionsTree::new();
    let cwd = Path::new(CWD);
    tree.write_log(
        cwd,
        "first.jsonl",
        &[user_line("deploy to staging", 1_000), user_line("run the tests", 2_000)],
        120,
    );
    tree.write_log(cwd, "second.jsonl", &[user_line("Deploy to production", 3_000)], 60);
    tree
}

#[test]
fn test_history_json_is_oldest_first() {
    let tree = sample_tree();
    let home = tempfile::tempdir().unwrap();

    let output = rewind(&tree, &home).args(["history", "--json"]).output().unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let texts: Vec<_> = parsed
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["text"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(texts, vec!["deploy to staging", "run the tests", "Deploy to production"]);
    assert_eq!(parsed[0]["timestamp"], 1_000);
}

#[test]
fn test_history_limit_keeps_newest() {
    let tree = sample_tree();
    let home = tempfile::tempdir().unwrap();

    rewind(&tree, &home)
        .args(["history", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deploy to production"))
        .stdout(predicate::str::contains("run the tests").not());
}

#[test]
fn test_history_with_active_session() {
    let tree = sample_tree();
    let home = tempfile::tempdir().unwrap();
    let active = tree.write_log(Path::new(CWD), "active.jsonl", &[user_line("current prompt", 9_000)], 0);

    rewind(&tree, &home)
        .args(["history", "--session"])
        .arg(&active)
        .assert()
        .success()
        .stdout(predicate::str::contains("current prompt"))
        .stdout(predicate::str::contains("deploy to staging"));
}

#[test]
fn test_missing_session_file_fails() {
    let tree = sample_tree();
    let home = tempfile::tempdir().unwrap();

    rewind(&tree, &home)
        .args(["history", "--session", "/definitely/not/here.jsonl"])
        .assert()
        .failure()
        .code(3);
}

#[test]
fn test_search_prints_most_recent_first() {
    let tree = sample_tree();
    let home = tempfile::tempdir().unwrap();

    let output = rewind(&tree, &home).args(["search", "DEPLOY"]).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("Deploy to production"));
    assert!(lines[1].ends_with("deploy to staging"));
    // Not a terminal, so no highlighting.
    assert!(!stdout.contains('\x1b'));
}

#[test]
fn test_search_invalid_pattern_matches_nothing() {
    let tree = sample_tree();
    let home = tempfile::tempdir().unwrap();

    rewind(&tree, &home)
        .args(["search", "deploy("])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_config_shows_defaults() {
    let tree = SessionsTree::new();
    let home = tempfile::tempdir().unwrap();

    rewind(&tree, &home)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[history]"))
        .stdout(predicate::str::contains("max_entries = 100"))
        .stdout(predicate::str::contains("hotkey = \"ctrl+r\""));
}

#[test]
fn test_config_file_overrides_and_path() {
    let tree = SessionsTree::new();
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("custom.toml");
    std::fs::write(&config, "[history]\ncross_file_budget = 7\n").unwrap();

    rewind(&tree, &home)
        .arg("config")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("cross_file_budget = 7"));

    rewind(&tree, &home)
        .args(["config", "--path", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_invalid_key_binding_is_a_config_error() {
    let tree = SessionsTree::new();
    let home = tempfile::tempdir().unwrap();
    let config = home.path().join("bad.toml");
    std::fs::write(&config, "[search]\nhotkey = \"ctrl+nope\"\n").unwrap();

    rewind(&tree, &home)
        .arg("config")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .code(5);
}
