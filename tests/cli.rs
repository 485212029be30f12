//! End-to-end tests for the `indicator` binary against a config in a temp dir.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use indicator_core::models::Entry;
use indicator_core::store::Store;
use indicator_store::config::{self, Config};
use indicator_store::{db, open_store};
use tempfile::TempDir;

fn indicator_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_indicator"))
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/indicators.sqlite"

[server]
bind = "127.0.0.1:0"

[remote]
base_url = "http://127.0.0.1:9/v2"
timeout_secs = 1
"#,
        root.display()
    );

    let config_path = config_dir.join("indicator.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_indicator(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = indicator_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run indicator binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn load(config_path: &Path) -> Config {
    config::load_config(config_path).unwrap()
}

async fn seed(config_path: &Path) -> i64 {
    let store = open_store(&load(config_path)).await.unwrap();
    let collection = store
        .import_collection(
            "NY.GDP.MKTP.CD",
            "GDP (current US$)",
            &[
                Entry::new("NY.GDP.MKTP.CD", "Chile", "2016", 10.0),
                Entry::new("NY.GDP.MKTP.CD", "Peru", "2016", 30.0),
                Entry::new("NY.GDP.MKTP.CD", "Bolivia", "2016", 20.0),
                Entry::new("NY.GDP.MKTP.CD", "Uruguay", "2016", 5.0),
            ],
        )
        .await
        .unwrap();
    store.close().await;
    collection.id
}

async fn table_count(config_path: &Path) -> i64 {
    let pool = db::connect(&load(config_path)).await.unwrap();
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('collections', 'entries')",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    pool.close().await;
    count
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_indicator(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/indicators.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, first) = run_indicator(&config_path, &["init"]);
    assert!(first, "First init failed");
    let (_, _, second) = run_indicator(&config_path, &["init"]);
    assert!(second, "Second init failed (not idempotent)");
}

#[test]
fn test_list_empty_database() {
    let (_tmp, config_path) = setup_test_env();
    run_indicator(&config_path, &["init"]);

    let (stdout, stderr, success) = run_indicator(&config_path, &["list"]);
    assert!(success, "list failed: {}", stderr);
    assert!(stdout.contains("No collections imported."));
}

#[test]
fn test_missing_collection_exits_non_zero() {
    let (_tmp, config_path) = setup_test_env();
    run_indicator(&config_path, &["init"]);

    let (_, stderr, success) = run_indicator(&config_path, &["delete", "99"]);
    assert!(!success);
    assert!(stderr.contains("collection doesn't exist with id: 99"));

    let (_, _, success) = run_indicator(&config_path, &["get", "99"]);
    assert!(!success);
}

#[test]
fn test_invalid_order_by_exits_non_zero() {
    let (_tmp, config_path) = setup_test_env();
    run_indicator(&config_path, &["init"]);

    let (_, _, success) = run_indicator(&config_path, &["list", "--order-by", "-password"]);
    assert!(!success);
}

#[test]
fn test_import_fails_cleanly_when_remote_unreachable() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success) = run_indicator(&config_path, &["import", "SP.POP.TOTL"]);
    assert!(!success);

    let (stdout, _, _) = run_indicator(&config_path, &["list"]);
    assert!(stdout.contains("No collections imported."));
}

#[tokio::test]
async fn test_query_commands_on_seeded_collection() {
    let (_tmp, config_path) = setup_test_env();
    let id = seed(&config_path).await.to_string();

    let (stdout, stderr, success) = run_indicator(&config_path, &["list", "--order-by", "-indicator"]);
    assert!(success, "list failed: {}", stderr);
    assert!(stdout.contains("NY.GDP.MKTP.CD"));
    assert!(stdout.contains(&format!("/collections/{}", id)));

    let (stdout, _, success) = run_indicator(&config_path, &["get", &id]);
    assert!(success);
    assert!(stdout.contains("GDP (current US$)"));
    assert!(stdout.contains("Entries (4)"));

    let (stdout, _, success) = run_indicator(&config_path, &["entry", &id, "2016", "Peru"]);
    assert!(success);
    assert!(stdout.contains("30"));

    let (_, _, success) = run_indicator(&config_path, &["entry", &id, "1990", "Peru"]);
    assert!(!success);

    let (stdout, _, success) = run_indicator(&config_path, &["top", &id, "2016", "--q", "-3"]);
    assert!(success);
    let bolivia = stdout.find("Bolivia").unwrap();
    let chile = stdout.find("Chile").unwrap();
    let uruguay = stdout.find("Uruguay").unwrap();
    assert!(bolivia < chile && chile < uruguay);
    assert!(!stdout.contains("Peru"));

    let (stdout, _, success) = run_indicator(&config_path, &["delete", &id]);
    assert!(success);
    assert!(stdout.contains("was removed from the database"));

    let (stdout, _, _) = run_indicator(&config_path, &["list"]);
    assert!(stdout.contains("No collections imported."));
}

#[tokio::test]
async fn test_reset_drops_tables() {
    let (_tmp, config_path) = setup_test_env();
    seed(&config_path).await;
    assert_eq!(table_count(&config_path).await, 2);

    let (stdout, stderr, success) = run_indicator(&config_path, &["reset"]);
    assert!(success, "reset failed: {}", stderr);
    assert!(stdout.contains("Database reset."));
    assert_eq!(table_count(&config_path).await, 0);
}
