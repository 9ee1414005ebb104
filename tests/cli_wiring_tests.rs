//! CLI wiring tests
//!
//! Parses real argument vectors and dispatches them against a scratch home
//! directory configured with the stub gateway.

use chrono::Local;
use serde_json::Value as JsonValue;
use sqlpilot::cli::dispatch::run_command;
use sqlpilot::cli::{parse_args, Args};
use sqlpilot::config::{Config, CONFIG_FILE_NAME};
use sqlpilot::execution::SqlStore;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn load_fixture(name: &str) -> String {
    let path = PathBuf::from("tests/fixtures").join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", path.display()))
}

/// Home with a stub-backed config and the sample table
fn create_home() -> TempDir {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join(CONFIG_FILE_NAME),
        r#"
[llm]
provider = "stub"

[store]
path = "data/sales.db"

[audit]
log_dir = "audit"
"#,
    )
    .unwrap();

    std::fs::create_dir_all(home.path().join("data")).unwrap();
    let store = SqlStore::open(home.path().join("data/sales.db")).unwrap();
    store.execute_batch(&load_fixture("sampledb.sql")).unwrap();
    home
}

fn argv(home: &Path, items: &[&str]) -> Args {
    let mut args = vec![
        "sqlpilot".to_string(),
        "--home".to_string(),
        home.display().to_string(),
    ];
    args.extend(items.iter().map(|s| s.to_string()));
    parse_args(args).unwrap()
}

fn dispatch(home: &Path, items: &[&str]) -> (bool, String) {
    let args = argv(home, items);
    let config = Config::load(home).unwrap();
    let command = args.command.clone().unwrap();
    let mut out = Vec::new();
    let ok = run_command(&command, &args, &config, &mut out).unwrap();
    (ok, String::from_utf8(out).unwrap())
}

#[test]
fn test_config_paths_resolve_under_home() {
    let home = create_home();
    let config = Config::load(home.path()).unwrap();
    assert_eq!(config.llm.provider, "stub");
    assert_eq!(config.store.path, home.path().join("data/sales.db"));
    assert_eq!(config.audit.log_dir, home.path().join("audit"));
}

#[test]
fn test_ask_json_with_selections() {
    let home = create_home();
    let (ok, out) = dispatch(
        home.path(),
        &[
            "--json", "--column", "item", "--filter", "region=West", "ask", "how", "many", "units",
        ],
    );
    assert!(ok);
    let json: JsonValue = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["user_query"], "how many units");
    assert_eq!(json["count"], 1);

    // Audit record written under the configured directory
    let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
    let (_, log) = dispatch(home.path(), &["--json", "log", today.as_str()]);
    assert!(home
        .path()
        .join("audit")
        .join(format!("queries_{}.log", today))
        .exists());
    let record: JsonValue = serde_json::from_str(log.lines().last().unwrap()).unwrap();
    assert_eq!(record["selected_columns"], serde_json::json!(["item"]));
    assert_eq!(record["selected_values"]["region"], serde_json::json!(["West"]));
}

#[test]
fn test_exec_human_output() {
    let home = create_home();
    let (ok, out) = dispatch(
        home.path(),
        &["exec", "SELECT region, COUNT(*) AS n FROM sampledb GROUP BY region ORDER BY region"],
    );
    assert!(ok);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "region\tn");
    assert_eq!(lines[1], "Central\t10");
    assert_eq!(lines.last(), Some(&"(3 rows)"));
}

#[test]
fn test_schema_commands() {
    let home = create_home();
    let (ok, out) = dispatch(home.path(), &["--json", "schema"]);
    assert!(ok);
    let tables: JsonValue = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(tables[0]["name"], "sampledb");
    assert_eq!(tables[0]["columns"][2]["name"], "region");
    assert_eq!(tables[0]["columns"][2]["type"], "TEXT");

    let (_, out) = dispatch(home.path(), &["schema", "sampledb", "region"]);
    assert_eq!(out, "Central\nEast\nWest\n");
}

#[test]
fn test_schema_stats_command() {
    let home = create_home();
    let (ok, out) = dispatch(
        home.path(),
        &["--json", "--filter", "region=West", "schema", "stats", "sampledb", "units", "item"],
    );
    assert!(ok);
    let stats: JsonValue = serde_json::from_str(out.trim()).unwrap();
    assert_eq!(stats["units"]["unique_values"], 3);
    assert_eq!(stats["units"]["null_count"], 0);
    assert_eq!(stats["units"]["median"], 46.0);
    assert_eq!(stats["item"]["unique_values"], 2);
    assert!(stats["item"].get("mean").is_none());
}

#[test]
fn test_log_for_empty_day_prints_nothing() {
    let home = create_home();
    let (ok, out) = dispatch(home.path(), &["log", "1999-12-31"]);
    assert!(ok);
    assert!(out.is_empty());
}
