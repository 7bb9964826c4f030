//! Run schema: the column layout of an experiment database.

use crate::error::Result;
use crate::models::field_type::{metric_field_type, param_field_type, FieldType};
use crate::models::property::SelectOption;
use crate::models::status::PageStatus;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Column name holding a run parameter
pub fn params_key(name: &str) -> String {
    format!("Params[{}]", name)
}

/// Column name holding a run metric
pub fn metrics_key(name: &str) -> String {
    format!("Metrics[{}]", name)
}

/// One column of the schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub field_type: FieldType,
    /// Declared options (select and multi_select only)
    pub options: Option<Vec<SelectOption>>,
}

impl ColumnSpec {
    pub fn plain(field_type: FieldType) -> Self {
        Self {
            field_type,
            options: None,
        }
    }

    pub fn with_options(field_type: FieldType, options: Vec<SelectOption>) -> Self {
        Self {
            field_type,
            options: Some(options),
        }
    }

    fn to_json(&self) -> Value {
        let config = match &self.options {
            Some(options) => json!({ "options": options }),
            None => Value::Object(Map::new()),
        };
        let mut column = Map::new();
        column.insert(self.field_type.as_str().to_string(), config);
        Value::Object(column)
    }
}

/// Database schema for runs: fixed base columns plus param and metric columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSchema {
    columns: BTreeMap<String, ColumnSpec>,
}

impl RunSchema {
    /// The nine columns every run database carries
    pub fn base() -> Self {
        let mut columns = BTreeMap::new();
        columns.insert("name".to_string(), ColumnSpec::plain(FieldType::Title));
        columns.insert("description".to_string(), ColumnSpec::plain(FieldType::RichText));
        columns.insert("date".to_string(), ColumnSpec::plain(FieldType::Date));
        columns.insert("user".to_string(), ColumnSpec::plain(FieldType::People));
        columns.insert("source".to_string(), ColumnSpec::plain(FieldType::RichText));
        columns.insert("version".to_string(), ColumnSpec::plain(FieldType::RichText));
        columns.insert(
            "tags".to_string(),
            ColumnSpec::with_options(FieldType::MultiSelect, Vec::new()),
        );
        columns.insert("artifacts".to_string(), ColumnSpec::plain(FieldType::Files));
        columns.insert(
            "status".to_string(),
            ColumnSpec::with_options(FieldType::Select, PageStatus::options()),
        );
        Self { columns }
    }

    /// Base columns plus one `Params[..]` column per param and one `Metrics[..]`
    /// column per metric. Types are logical names (`number`, `string`, ...).
    pub fn build<P, M>(params: &[(P, P)], metrics: &[(M, M)]) -> Result<Self>
    where
        P: AsRef<str>,
        M: AsRef<str>,
    {
        let mut schema = Self::base();
        for (name, logical) in params {
            let field_type = param_field_type(logical.as_ref())?;
            schema
                .columns
                .insert(params_key(name.as_ref()), ColumnSpec::plain(field_type));
        }
        for (name, logical) in metrics {
            let field_type = metric_field_type(logical.as_ref())?;
            schema
                .columns
                .insert(metrics_key(name.as_ref()), ColumnSpec::plain(field_type));
        }
        Ok(schema)
    }

    pub fn columns(&self) -> &BTreeMap<String, ColumnSpec> {
        &self.columns
    }

    pub fn get(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.get(name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// `properties` payload for database creation
    pub fn to_properties(&self) -> Value {
        let properties: Map<String, Value> = self
            .columns
            .iter()
            .map(|(name, spec)| (name.clone(), spec.to_json()))
            .collect();
        Value::Object(properties)
    }
}
