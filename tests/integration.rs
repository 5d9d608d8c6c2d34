//! End-to-end tests for the `kb` binary against a throwaway SQLite database.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn kb_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_kb"))
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/kb.sqlite"

[server]
bind = "127.0.0.1:0"

[logging]
filter = "warn"
"#,
        root.display()
    );

    let config_path = config_dir.join("kb.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_kb(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = kb_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run kb binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn submit(config_path: &Path, title: &str, content: &str) -> String {
    let (stdout, stderr, success) = run_kb(
        config_path,
        &[
            "submit", "--title", title, "--content", content, "--author", "u1", "--tag", "docs",
        ],
    );
    assert!(success, "submit failed: stdout={}, stderr={}", stdout, stderr);
    // "Submitted <uuid> (pending approval)."
    stdout
        .split_whitespace()
        .nth(1)
        .expect("submit prints the new id")
        .to_string()
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_kb(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/kb.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_kb(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_kb(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_submit_and_search() {
    let (_tmp, config_path) = setup_test_env();
    run_kb(&config_path, &["init"]);

    submit(&config_path, "情報公開条例の手引", "条例の運用について");
    submit(&config_path, "個人情報保護制度", "制度の概要");

    let (stdout, _, success) = run_kb(&config_path, &["search", "情報"]);
    assert!(success);
    assert!(stdout.contains("情報公開条例の手引"));
    assert!(stdout.contains("個人情報保護制度"));

    let (stdout, _, success) = run_kb(&config_path, &["search", "手引"]);
    assert!(success);
    assert!(stdout.contains("情報公開条例の手引"));
    assert!(!stdout.contains("個人情報保護制度"));
}

#[test]
fn test_search_no_results() {
    let (_tmp, config_path) = setup_test_env();
    run_kb(&config_path, &["init"]);

    let (stdout, _, success) = run_kb(&config_path, &["search", "nothing-here"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_whitespace_query_matches_verbatim() {
    let (_tmp, config_path) = setup_test_env();
    run_kb(&config_path, &["init"]);
    submit(&config_path, "release notes", "v1");
    submit(&config_path, "changelog", "v2");

    let (stdout, stderr, success) = run_kb(&config_path, &["search", " "]);
    assert!(success, "search failed: stderr={}", stderr);
    assert!(stdout.contains("release notes"));
    assert!(!stdout.contains("changelog"));

    let (_, _, success) = run_kb(&config_path, &["search", ""]);
    assert!(!success);
}

#[test]
fn test_view_increments_and_get_shows_count() {
    let (_tmp, config_path) = setup_test_env();
    run_kb(&config_path, &["init"]);
    let id = submit(&config_path, "Runbook", "restart the service");

    for expected in 1..=2 {
        let (stdout, _, success) = run_kb(&config_path, &["view", &id]);
        assert!(success);
        assert!(stdout.contains(&format!("{} views", expected)), "got: {}", stdout);
    }

    let (stdout, _, success) = run_kb(&config_path, &["get", &id]);
    assert!(success);
    assert!(stdout.contains("views:      2"));
    assert!(stdout.contains("status:     pending"));
}

#[test]
fn test_view_unknown_id_fails() {
    let (_tmp, config_path) = setup_test_env();
    run_kb(&config_path, &["init"]);

    let (_, stderr, success) = run_kb(&config_path, &["view", "no-such-id"]);
    assert!(!success);
    assert!(stderr.contains("not found"), "stderr: {}", stderr);
}

#[test]
fn test_reflect_defaults_and_list() {
    let (_tmp, config_path) = setup_test_env();
    run_kb(&config_path, &["init"]);

    let (stdout, _, success) = run_kb(&config_path, &["reflect", "--user", "u1"]);
    assert!(success);
    assert!(stdout.contains("contribution"));

    let (stdout, _, success) = run_kb(&config_path, &["reflections", "u1"]);
    assert!(success);
    assert!(stdout.contains("[contribution]  points=0 thanks=0 time_saved=0"));

    let (stdout, _, _) = run_kb(&config_path, &["reflections", "someone-else"]);
    assert!(stdout.contains("No reflections."));
}

#[test]
fn test_invalid_config_rejected() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("kb.toml");
    fs::write(&config_path, "[db]\npath = \"x.sqlite\"\n").unwrap();

    let (_, stderr, success) = run_kb(&config_path, &["init"]);
    assert!(!success);
    assert!(stderr.contains("parse config"), "stderr: {}", stderr);
}
