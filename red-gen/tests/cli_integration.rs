//! CLI integration tests for red-gen

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const KEY_VAR: &str = "REDCAST_GEN_TEST_KEY";

const TEMPLATES: &str = r#"{
    "templates": {
        "t1": {
            "name": "Before and after",
            "title_pattern": "{platform} made easy",
            "content_structure": ["hook", "solution"],
            "style": "personal story",
            "emoji_density": "high"
        }
    },
    "variables": { "platform": ["Temu"] }
}"#;

/// Helper to escape path for TOML on Windows
fn escape_path_for_toml(path: &Path) -> String {
    path.display().to_string().replace('\\', "\\\\")
}

/// Config whose model endpoint refuses connections
fn setup_test_env() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let templates_path = temp_dir.path().join("templates.json");
    fs::write(&templates_path, TEMPLATES).unwrap();

    let config = format!(
        r#"
[product]
name = "ShopPilot"
url = "https://shoppilot.example"
description = "Listing automation"
features = ["bulk listing"]
target_users = ["Temu sellers"]
pain_points = ["manual listing"]

[content_strategy]
post_times = ["09:00"]

[[content_strategy.content_types]]
name = "A"
weight = 1.0
templates = ["t1"]

[hashtags]
primary = ["跨境电商"]
secondary = ["Temu"]
optional = []

[ai]
model = "claude-sonnet-4-5"
max_tokens = 256
temperature = 0.5
api_key_env = "{key}"
timeout_secs = 5
endpoint = "http://127.0.0.1:9/v1/messages"

[publish]
auto_publish = false
save_draft = true
log_path = "{out}/publish_log.json"

[image]
save_path = "{out}/images"
count = 1

[storage]
output_dir = "{out}"
templates_path = "{templates}"
"#,
        key = KEY_VAR,
        out = escape_path_for_toml(&temp_dir.path().join("logs")),
        templates = escape_path_for_toml(&templates_path),
    );

    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, config).unwrap();
    (temp_dir, config_path)
}

#[test]
fn test_help_flag() {
    Command::cargo_bin("red-gen")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--count"))
        .stdout(predicate::str::contains("--show-latest"));
}

#[test]
fn test_missing_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    Command::cargo_bin("red-gen")
        .unwrap()
        .arg("--config")
        .arg(temp_dir.path().join("nope.toml"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_missing_api_key_exits_2() {
    let (_temp_dir, config_path) = setup_test_env();
    Command::cargo_bin("red-gen")
        .unwrap()
        .arg("--config")
        .arg(&config_path)
        .env_remove(KEY_VAR)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains(KEY_VAR));
}

#[test]
fn test_zero_count_is_invalid_input() {
    let (_temp_dir, config_path) = setup_test_env();
    Command::cargo_bin("red-gen")
        .unwrap()
        .args(["--count", "0", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .code(3);
}

#[test]
fn test_unreachable_model_saves_nothing() {
    let (temp_dir, config_path) = setup_test_env();
    Command::cargo_bin("red-gen")
        .unwrap()
        .arg("--config")
        .arg(&config_path)
        .env(KEY_VAR, "sk-test")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Model error"));

    assert!(!temp_dir.path().join("logs").exists());
}

#[test]
fn test_failed_note_does_not_stop_the_batch() {
    let (temp_dir, config_path) = setup_test_env();
    Command::cargo_bin("red-gen")
        .unwrap()
        .args(["--count", "3", "--verbose", "--config"])
        .arg(&config_path)
        .env(KEY_VAR, "sk-test")
        .env_remove("RUST_LOG")
        .env_remove("REDCAST_LOG_FORMAT")
        .env_remove("REDCAST_LOG_LEVEL")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Generating note 1/3"))
        .stderr(predicate::str::contains("Generating note 2/3"))
        .stderr(predicate::str::contains("Generating note 3/3"))
        .stderr(predicate::str::contains("Generated 0 of 3 note(s)"));

    assert!(!temp_dir.path().join("logs").exists());
}

#[test]
fn test_show_latest_without_records() {
    let (_temp_dir, config_path) = setup_test_env();
    Command::cargo_bin("red-gen")
        .unwrap()
        .args(["--show-latest", "--config"])
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No generated content"));
}

#[test]
fn test_show_latest_prints_newest_record() {
    let (temp_dir, config_path) = setup_test_env();
    let logs = temp_dir.path().join("logs");
    fs::create_dir_all(&logs).unwrap();

    for (stamp, title) in [("20250314_090000_000", "Older note"), ("20250314_200000_000", "Newer note")] {
        let record = serde_json::json!({
            "title": title,
            "content": "Body text here",
            "tags": ["#Temu", "效率工具"],
            "content_type": "A",
            "template": "Before and after",
            "generated_at": "2025-03-14T09:00:00+08:00",
            "test_mode": false
        });
        fs::write(
            logs.join(format!("content_{}.json", stamp)),
            serde_json::to_string_pretty(&record).unwrap(),
        )
        .unwrap();
    }

    Command::cargo_bin("red-gen")
        .unwrap()
        .args(["--show-latest", "--config"])
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Newer note"))
        .stdout(predicate::str::contains("#Temu #效率工具"))
        .stdout(predicate::str::contains("Older note").not());
}
