//! Integration tests for the tracking client against the in-memory workspace

use crate::integration::test_utils::{client_over, run_database};
use async_trait::async_trait;
use notionflow::config::PollConfig;
use notionflow::error::StorageError;
use notionflow::models::MetricHistory;
use notionflow::storage::{object_url, ObjectStore};
use notionflow::{ApiError, InMemoryWorkspace, NotionFlowClient, PageStatus, SelectColor};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[test]
fn test_database_ready_after_delayed_provisioning() {
    let workspace = Arc::new(InMemoryWorkspace::new().with_provisioning_delay(3));
    let client = client_over(&workspace);

    let created = client
        .create_database("runs", &[("lr", "number")], &[("acc", "number")])
        .unwrap();

    assert!(created.ready);
    assert_eq!(workspace.database_retrievals(), 4);
}

#[test]
fn test_database_never_ready_uses_full_budget() {
    let workspace = Arc::new(InMemoryWorkspace::new().with_provisioning_delay(u32::MAX));
    let client = client_over(&workspace);

    let created = client
        .create_database("runs", &[("lr", "number")], &[("acc", "number")])
        .unwrap();

    assert!(!created.ready);
    assert!(created.id.starts_with("db-"));
    assert_eq!(workspace.database_retrievals(), 10);
}

#[test]
fn test_poll_budget_follows_config() {
    let workspace = Arc::new(InMemoryWorkspace::new().with_provisioning_delay(u32::MAX));
    let client = client_over(&workspace).with_poll(PollConfig {
        max_attempts: 3,
        interval_ms: 0,
    });

    let created = client
        .create_database::<&str, &str>("runs", &[], &[])
        .unwrap();

    assert!(!created.ready);
    assert_eq!(workspace.database_retrievals(), 3);
}

#[test]
fn test_schema_columns_created() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let client = client_over(&workspace);
    let database_id = run_database(&client, "runs");

    let database = client.get_database(&database_id).unwrap();
    assert_eq!(database.title_text(), Some("runs"));
    assert_eq!(database.properties.len(), 9 + 4 + 2);
    assert_eq!(
        database.column_type("Params[optimizer]").map(|t| t.as_str()),
        Some("select")
    );
    assert_eq!(
        database.column_type("Metrics[loss]").map(|t| t.as_str()),
        Some("rich_text")
    );
}

#[test]
fn test_unknown_column_type_fails_before_any_call() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let client = client_over(&workspace);

    let err = client
        .create_database("runs", &[("lr", "float")], &[("acc", "number")])
        .unwrap_err();

    assert!(matches!(err, ApiError::UnknownFieldType { kind: "param", .. }));
    assert_eq!(workspace.call_count(), 0);
}

#[test]
fn test_database_lookup_by_name_across_search_pages() {
    let workspace = Arc::new(InMemoryWorkspace::new().with_page_size(1));
    let client = client_over(&workspace);
    run_database(&client, "first");
    let second = run_database(&client, "second");
    run_database(&client, "third");

    assert_eq!(client.list_databases().unwrap().len(), 3);
    let found = client.get_database_by_name("second").unwrap().unwrap();
    assert_eq!(found.id, second);
    assert!(client.get_database_by_name("fourth").unwrap().is_none());
}

#[test]
fn test_new_page_has_title_only() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let client = client_over(&workspace);
    let database_id = run_database(&client, "runs");

    let named = client.add_empty_page(&database_id, Some("run-1")).unwrap();
    let unnamed = client.add_empty_page(&database_id, None).unwrap();

    assert_eq!(named.title().as_deref(), Some("run-1"));
    assert_eq!(unnamed.title().as_deref(), Some("New page"));
    assert_eq!(named.database_id(), Some(database_id.as_str()));
    assert_eq!(named.status(), None);
}

#[test]
fn test_log_param_shapes_value_by_column_type() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let client = client_over(&workspace);
    let database_id = run_database(&client, "runs");
    let page_id = client.add_empty_page(&database_id, None).unwrap().id;

    client.log_param(&page_id, "lr", 0.01).unwrap();
    client.log_param(&page_id, "optimizer", "adam").unwrap();
    client.log_param(&page_id, "note", 3.0).unwrap();
    let page = client.log_param(&page_id, "warmup", true).unwrap();

    assert_eq!(page.number("Params[lr]"), Some(0.01));
    assert_eq!(page.select("Params[optimizer]"), Some("adam"));
    assert_eq!(page.text("Params[note]").as_deref(), Some("3"));
    assert_eq!(page.checkbox("Params[warmup]"), Some(true));
}

#[test]
fn test_log_param_errors() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let client = client_over(&workspace);
    let database_id = run_database(&client, "runs");
    let page_id = client.add_empty_page(&database_id, None).unwrap().id;

    let err = client.log_param(&page_id, "lr", "fast").unwrap_err();
    assert!(matches!(err, ApiError::ValueTypeMismatch { .. }));

    let err = client.log_param(&page_id, "momentum", 0.9).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("Key Params[momentum] not found in page {}", page_id)
    );
}

#[test]
fn test_numeric_metric_keeps_latest_value() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let client = client_over(&workspace);
    let database_id = run_database(&client, "runs");
    let page_id = client.add_empty_page(&database_id, None).unwrap().id;

    client.log_metric(&page_id, "acc", 0.5, Some(0)).unwrap();
    let page = client.log_metric(&page_id, "acc", 0.9, Some(1)).unwrap();

    assert_eq!(page.number("Metrics[acc]"), Some(0.9));
}

#[test]
fn test_array_metric_accumulates_history() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let client = client_over(&workspace);
    let database_id = run_database(&client, "runs");
    let page_id = client.add_empty_page(&database_id, None).unwrap().id;

    client.log_metric(&page_id, "loss", 0.5, Some(0)).unwrap();
    client.log_metric(&page_id, "loss", 0.4, Some(1)).unwrap();
    let page = client.log_metric(&page_id, "loss", 0.3, None).unwrap();

    let history = MetricHistory::decode(&page.text("Metrics[loss]").unwrap()).unwrap();
    let points: Vec<(Option<u64>, f64)> =
        history.points().iter().map(|p| (p.step(), p.value())).collect();
    assert_eq!(points, vec![(Some(0), 0.5), (Some(1), 0.4), (None, 0.3)]);
}

#[test]
fn test_log_metrics_single_update() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let client = client_over(&workspace);
    let database_id = run_database(&client, "runs");
    let page_id = client.add_empty_page(&database_id, None).unwrap().id;
    client.log_metric(&page_id, "loss", 0.5, Some(0)).unwrap();
    let updates_before = workspace.page_updates();

    let page = client
        .log_metrics(&page_id, &[("acc", 0.7), ("loss", 0.45)], Some(1))
        .unwrap();

    assert_eq!(workspace.page_updates(), updates_before + 1);
    assert_eq!(page.number("Metrics[acc]"), Some(0.7));
    let history = MetricHistory::decode(&page.text("Metrics[loss]").unwrap()).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history.last().map(|p| p.value()), Some(0.45));
}

#[test]
fn test_log_metrics_unknown_key_writes_nothing() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let client = client_over(&workspace);
    let database_id = run_database(&client, "runs");
    let page_id = client.add_empty_page(&database_id, None).unwrap().id;
    let updates_before = workspace.page_updates();

    let err = client
        .log_metrics(&page_id, &[("acc", 0.7), ("f1", 0.2)], None)
        .unwrap_err();

    assert!(matches!(err, ApiError::KeyNotFound { .. }));
    assert_eq!(workspace.page_updates(), updates_before);
    assert_eq!(client.get_page(&page_id).unwrap().number("Metrics[acc]"), None);
}

#[test]
fn test_log_metrics_empty_is_noop() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let client = client_over(&workspace);
    let database_id = run_database(&client, "runs");
    let page_id = client.add_empty_page(&database_id, None).unwrap().id;
    let updates_before = workspace.page_updates();

    let page = client.log_metrics::<&str>(&page_id, &[], None).unwrap();

    assert_eq!(page.id, page_id);
    assert_eq!(workspace.page_updates(), updates_before);
}

#[test]
fn test_tags_append_in_order() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let client = client_over(&workspace);
    let database_id = run_database(&client, "runs");
    let page_id = client.add_empty_page(&database_id, None).unwrap().id;

    client.set_tag(&page_id, "baseline", None).unwrap();
    client.set_tag(&page_id, "gpu", Some(SelectColor::Blue)).unwrap();
    let page = client.set_tag(&page_id, "baseline", None).unwrap();

    assert_eq!(
        page.multi_select_names("tags"),
        vec!["baseline".to_string(), "gpu".to_string(), "baseline".to_string()]
    );
    let colors: Vec<&str> = page
        .property_value("tags")
        .and_then(|v| v.as_array())
        .unwrap()
        .iter()
        .filter_map(|o| o.get("color").and_then(|c| c.as_str()))
        .collect();
    assert_eq!(colors, vec!["default", "blue", "default"]);
}

#[test]
fn test_set_status() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let client = client_over(&workspace);
    let database_id = run_database(&client, "runs");
    let page_id = client.add_empty_page(&database_id, None).unwrap().id;

    let page = client.set_status(&page_id, PageStatus::Running).unwrap();
    assert_eq!(page.status(), Some("running"));
    let page = client.set_status(&page_id, PageStatus::Failed).unwrap();
    assert_eq!(page.status(), Some("failed"));
}

#[test]
fn test_remote_failures_are_remote_errors() {
    let workspace = Arc::new(InMemoryWorkspace::offline());
    let client = client_over(&workspace);

    let err = client.get_page("page-0001").unwrap_err();
    assert!(err.is_remote());
    let err = client
        .create_database("runs", &[("lr", "number")], &[("acc", "number")])
        .unwrap_err();
    assert!(err.is_remote());
}

#[test]
fn test_missing_page_is_not_found() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let client = client_over(&workspace);

    let err = client.log_metric("page-9999", "acc", 0.1, None).unwrap_err();
    assert!(matches!(err, ApiError::RemoteNotFound(_)));
}

/// Object store that records uploads instead of sending them
struct RecordingStore {
    uploads: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn upload(&self, path: &Path, bucket: &str, key: &str) -> Result<String, StorageError> {
        tokio::fs::metadata(path).await?;
        self.uploads.lock().unwrap().push(key.to_string());
        Ok(object_url("https://objects.test", bucket, key))
    }

    fn bucket(&self) -> &str {
        "runs"
    }

    fn key_prefix(&self) -> &str {
        "artifacts"
    }
}

#[test]
fn test_log_artifact_appends_external_file() {
    let temp_dir = TempDir::new().unwrap();
    let model = temp_dir.path().join("model.pt");
    std::fs::write(&model, b"weights").unwrap();

    let workspace = Arc::new(InMemoryWorkspace::new());
    let store = Arc::new(RecordingStore {
        uploads: Mutex::new(Vec::new()),
    });
    let client: NotionFlowClient = client_over(&workspace).with_object_store(store.clone());
    let database_id = run_database(&client, "runs");
    let page_id = client.add_empty_page(&database_id, None).unwrap().id;

    client.log_artifact(&page_id, &model).unwrap();
    let page = client.log_artifact(&page_id, &model).unwrap();

    let expected_key = format!("artifacts/{}/model.pt", page_id);
    assert_eq!(*store.uploads.lock().unwrap(), vec![expected_key.clone(), expected_key.clone()]);
    let files = page.property_value("artifacts").unwrap().as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["name"], "model.pt");
    assert_eq!(files[0]["type"], "external");
    assert_eq!(
        files[0]["external"]["url"],
        format!("https://objects.test/runs/{}", expected_key)
    );
}

#[test]
fn test_log_artifact_missing_file() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let store = Arc::new(RecordingStore {
        uploads: Mutex::new(Vec::new()),
    });
    let client = client_over(&workspace).with_object_store(store);
    let database_id = run_database(&client, "runs");
    let page_id = client.add_empty_page(&database_id, None).unwrap().id;

    let err = client
        .log_artifact(&page_id, Path::new("/no/such/model.pt"))
        .unwrap_err();
    assert!(matches!(err, ApiError::Storage(StorageError::IoError(_))));
}
