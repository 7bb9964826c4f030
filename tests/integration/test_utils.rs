//! Shared test utilities for integration tests
//!
//! Builds clients over the in-memory workspace and serializes tests that touch
//! process environment variables.

use notionflow::config::PollConfig;
use notionflow::{InMemoryWorkspace, NotionFlowClient};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Parent page used for every database created in tests
pub const PARENT_PAGE: &str = "parent-page";

/// Params of the standard run database
pub const RUN_PARAMS: &[(&str, &str)] = &[
    ("lr", "number"),
    ("optimizer", "category"),
    ("note", "string"),
    ("warmup", "boolean"),
];

/// Metrics of the standard run database
pub const RUN_METRICS: &[(&str, &str)] = &[("acc", "number"), ("loss", "array")];

/// Client over `workspace` with a parent page and no waiting between polls
pub fn client_over(workspace: &Arc<InMemoryWorkspace>) -> NotionFlowClient {
    NotionFlowClient::with_api(workspace.clone())
        .unwrap()
        .with_parent_page_id(Some(PARENT_PAGE.to_string()))
        .with_poll(PollConfig::immediate())
}

/// Create the standard run database and return its id
pub fn run_database(client: &NotionFlowClient, title: &str) -> String {
    let created = client.create_database(title, RUN_PARAMS, RUN_METRICS).unwrap();
    assert!(created.ready);
    created.id
}

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Variables read by configuration loading; cleared for every env test
const MANAGED_VARS: &[&str] = &[
    "HOME",
    "XDG_CONFIG_HOME",
    "NOTION_TOKEN",
    "NOTION_PARENT_PAGE_ID",
    "NOTIONFLOW__AUTH",
    "NOTIONFLOW__POLL__MAX_ATTEMPTS",
    "NOTIONFLOW__POLL__INTERVAL_MS",
    "NOTIONFLOW__STORAGE__BUCKET",
];

/// Run `f` with HOME and XDG_CONFIG_HOME pointing into `test_dir`, every managed
/// variable cleared, then `vars` applied. The original environment is restored
/// afterwards.
pub fn with_env<F, R>(test_dir: &TempDir, vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let saved: Vec<(&str, Option<String>)> = MANAGED_VARS
        .iter()
        .map(|name| (*name, std::env::var(name).ok()))
        .collect();

    for name in MANAGED_VARS {
        std::env::remove_var(name);
    }
    std::env::set_var("HOME", test_dir.path().join("home"));
    std::env::set_var("XDG_CONFIG_HOME", test_dir.path().join("config"));
    for (name, value) in vars {
        std::env::set_var(name, value);
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    for (name, value) in saved {
        match value {
            Some(value) => std::env::set_var(name, value),
            None => std::env::remove_var(name),
        }
    }

    match result {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
