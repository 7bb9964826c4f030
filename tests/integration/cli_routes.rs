//! Integration tests for CLI routing and reports over the in-memory workspace

use crate::integration::test_utils::{client_over, run_database};
use notionflow::cli::{Commands, ReportCommands, RunContext};
use notionflow::models::PageStatus;
use notionflow::{ApiError, InMemoryWorkspace, NotionFlowConfig, Report};
use std::sync::Arc;

fn context(workspace: &Arc<InMemoryWorkspace>) -> RunContext {
    RunContext::with_client(NotionFlowConfig::default(), client_over(workspace))
}

#[test]
fn test_create_database_command() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let ctx = context(&workspace);

    let output = ctx
        .execute(&Commands::CreateDatabase {
            title: "runs".to_string(),
            params: vec!["lr=number".to_string(), "optimizer=category".to_string()],
            metrics: vec!["loss=array".to_string()],
        })
        .unwrap();

    assert!(output.contains("db-0001"));
    let database = ctx.client().get_database("db-0001").unwrap();
    assert!(database.properties.contains_key("Params[optimizer]"));
    assert!(database.properties.contains_key("Metrics[loss]"));
}

#[test]
fn test_create_database_rejects_malformed_column() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let ctx = context(&workspace);

    let err = ctx
        .execute(&Commands::CreateDatabase {
            title: "runs".to_string(),
            params: vec!["lr".to_string()],
            metrics: Vec::new(),
        })
        .unwrap_err();

    assert!(matches!(err, ApiError::InvalidArgument(_)));
    assert_eq!(workspace.call_count(), 0);
}

#[test]
fn test_databases_command() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let ctx = context(&workspace);
    let id = run_database(ctx.client(), "baseline");

    let text = ctx
        .execute(&Commands::Databases {
            format: "text".to_string(),
        })
        .unwrap();
    assert!(text.contains("baseline"));
    assert!(text.contains(&id));

    let json = ctx
        .execute(&Commands::Databases {
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed[0]["id"], id.as_str());
}

#[test]
fn test_status_and_tag_commands() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let ctx = context(&workspace);
    let database_id = run_database(ctx.client(), "runs");
    let page_id = ctx.client().add_empty_page(&database_id, None).unwrap().id;

    ctx.execute(&Commands::Status {
        page_id: page_id.clone(),
        status: "success".to_string(),
    })
    .unwrap();
    ctx.execute(&Commands::Tag {
        page_id: page_id.clone(),
        tag: "best".to_string(),
        color: Some("green".to_string()),
    })
    .unwrap();

    let page = ctx.client().get_page(&page_id).unwrap();
    assert_eq!(page.status(), Some(PageStatus::Success.as_str()));
    assert_eq!(page.multi_select_names("tags"), vec!["best".to_string()]);

    let err = ctx
        .execute(&Commands::Status {
            page_id: page_id.clone(),
            status: "done".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(_)));

    let err = ctx
        .execute(&Commands::Tag {
            page_id,
            tag: "x".to_string(),
            color: Some("teal".to_string()),
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(_)));
}

#[test]
fn test_report_commands() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let ctx = context(&workspace);
    let client = ctx.client();
    let database_id = run_database(client, "runs");
    let page_id = client.add_empty_page(&database_id, Some("trial-7")).unwrap().id;
    client.log_param(&page_id, "optimizer", "sgd").unwrap();
    client.log_metric(&page_id, "loss", 0.7, Some(0)).unwrap();
    client.log_metric(&page_id, "loss", 0.2, Some(1)).unwrap();

    let page_report = ctx
        .execute(&Commands::Report {
            command: ReportCommands::Page {
                id: page_id.clone(),
                format: "text".to_string(),
            },
        })
        .unwrap();
    assert!(page_report.contains("trial-7"));
    assert!(page_report.contains("sgd"));
    assert!(page_report.contains("0.2"));

    let summary = Report::new(client).page_summary(&page_id).unwrap();
    let loss = summary.metrics.iter().find(|m| m.name == "loss").unwrap();
    assert_eq!(loss.points, Some(2));

    let database_report = ctx
        .execute(&Commands::Report {
            command: ReportCommands::Database {
                id: database_id,
                format: "json".to_string(),
            },
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&database_report).unwrap();
    assert_eq!(parsed["params"].as_array().unwrap().len(), 4);
    assert_eq!(parsed["metrics"].as_array().unwrap().len(), 2);
}

#[test]
fn test_config_command_is_redacted() {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let config = NotionFlowConfig {
        auth: Some("secret_token".to_string()),
        ..NotionFlowConfig::default()
    };
    let ctx = RunContext::with_client(config, client_over(&workspace));

    let output = ctx.execute(&Commands::Config).unwrap();

    assert!(!output.contains("secret_token"));
    assert!(output.contains("api.notion.com"));
}
