//! Property-based tests for logging into run pages

use notionflow::config::PollConfig;
use notionflow::models::MetricHistory;
use notionflow::{InMemoryWorkspace, NotionFlowClient};
use proptest::prelude::*;
use std::sync::Arc;

/// Fresh workspace, client and empty run page
fn run_page() -> (NotionFlowClient, String) {
    let workspace = Arc::new(InMemoryWorkspace::new());
    let client = NotionFlowClient::with_api(workspace)
        .unwrap()
        .with_parent_page_id(Some("parent".to_string()))
        .with_poll(PollConfig::immediate());
    let database = client
        .create_database("runs", &[("lr", "number")], &[("acc", "number"), ("loss", "array")])
        .unwrap();
    let page_id = client.add_empty_page(&database.id, None).unwrap().id;
    (client, page_id)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Tags accumulate in call order, duplicates included
    #[test]
    fn test_tags_accumulate_in_order(tags in prop::collection::vec("[a-z0-9]{1,8}", 1..6)) {
        let (client, page_id) = run_page();
        for tag in &tags {
            client.set_tag(&page_id, tag, None).unwrap();
        }
        let page = client.get_page(&page_id).unwrap();
        prop_assert_eq!(page.multi_select_names("tags"), tags);
    }

    /// Every array metric call adds exactly one point, in order; number metrics
    /// hold only the last value
    #[test]
    fn test_metric_calls_accumulate(
        values in prop::collection::vec(
            (prop::option::of(0u64..1000), (-80_000i32..80_000).prop_map(|n| f64::from(n) / 8.0)),
            1..8,
        ),
    ) {
        let (client, page_id) = run_page();
        for (step, value) in &values {
            client.log_metric(&page_id, "loss", *value, *step).unwrap();
            client.log_metric(&page_id, "acc", *value, *step).unwrap();
        }
        let page = client.get_page(&page_id).unwrap();

        let history = MetricHistory::decode(&page.text("Metrics[loss]").unwrap()).unwrap();
        let stored: Vec<(Option<u64>, f64)> =
            history.points().iter().map(|p| (p.step(), p.value())).collect();
        prop_assert_eq!(stored, values.clone());
        prop_assert_eq!(page.number("Metrics[acc]"), values.last().map(|(_, v)| *v));
    }
}
