//! Property-based tests for run schema construction

use notionflow::models::{metric_field_type, metrics_key, param_field_type, params_key, RunSchema};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn param_types() -> impl Strategy<Value = String> {
    prop_oneof![Just("number"), Just("string"), Just("category"), Just("boolean")]
        .prop_map(str::to_string)
}

fn metric_types() -> impl Strategy<Value = String> {
    prop_oneof![Just("number"), Just("array")].prop_map(str::to_string)
}

/// Name → type of the last declaration of each name
fn last_declared(columns: &[(String, String)]) -> BTreeMap<&str, &str> {
    columns
        .iter()
        .map(|(name, kind)| (name.as_str(), kind.as_str()))
        .collect()
}

proptest! {
    /// Same inputs always give the same schema and payload
    #[test]
    fn test_schema_build_is_deterministic(
        params in prop::collection::vec(("[a-z_]{1,10}", param_types()), 0..8),
        metrics in prop::collection::vec(("[a-z_]{1,10}", metric_types()), 0..8),
    ) {
        let first = RunSchema::build(&params, &metrics).unwrap();
        let second = RunSchema::build(&params, &metrics).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.to_properties(), second.to_properties());
    }

    /// Base columns plus one column per distinct name; a repeated name keeps its
    /// last declared type
    #[test]
    fn test_schema_columns_follow_declarations(
        params in prop::collection::vec(("[a-z]{1,4}", param_types()), 0..10),
        metrics in prop::collection::vec(("[a-z]{1,4}", metric_types()), 0..10),
    ) {
        let schema = RunSchema::build(&params, &metrics).unwrap();
        let declared_params = last_declared(&params);
        let declared_metrics = last_declared(&metrics);

        prop_assert_eq!(schema.len(), 9 + declared_params.len() + declared_metrics.len());
        for (name, kind) in declared_params {
            let column = schema.get(&params_key(name)).unwrap();
            prop_assert_eq!(column.field_type, param_field_type(kind).unwrap());
        }
        for (name, kind) in declared_metrics {
            let column = schema.get(&metrics_key(name)).unwrap();
            prop_assert_eq!(column.field_type, metric_field_type(kind).unwrap());
        }
    }

    /// Unknown logical types never produce a schema
    #[test]
    fn test_unknown_param_type_rejected(kind in "[a-z]{1,8}") {
        prop_assume!(!["number", "string", "category", "boolean"].contains(&kind.as_str()));
        let params = vec![("x".to_string(), kind)];
        let metrics: Vec<(String, String)> = Vec::new();
        prop_assert!(RunSchema::build(&params, &metrics).is_err());
    }
}
