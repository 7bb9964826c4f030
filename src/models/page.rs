//! Page objects (one page per run) as returned by the workspace service.

use crate::models::field_type::FieldType;
use crate::models::property::plain_text;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Where a page lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Parent {
    DatabaseId { database_id: String },
    PageId { page_id: String },
    BlockId { block_id: String },
    Workspace { workspace: bool },
}

/// Snapshot of a page at fetch time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub id: String,
    /// Property name → value envelope (`{"id", "type", "<type>": value}`)
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    pub parent: Parent,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_edited_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub url: Option<String>,
}

impl PageInfo {
    pub fn database_id(&self) -> Option<&str> {
        match &self.parent {
            Parent::DatabaseId { database_id } => Some(database_id),
            _ => None,
        }
    }

    /// The raw `type` token of a property
    pub fn property_type(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .and_then(|p| p.get("type"))
            .and_then(Value::as_str)
    }

    /// The value held under the property's type key (e.g. `number` → `0.9`)
    pub fn property_value(&self, key: &str) -> Option<&Value> {
        let property = self.properties.get(key)?;
        let kind = property.get("type")?.as_str()?;
        property.get(kind)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.property_value(key).and_then(Value::as_f64)
    }

    pub fn checkbox(&self, key: &str) -> Option<bool> {
        self.property_value(key).and_then(Value::as_bool)
    }

    pub fn select(&self, key: &str) -> Option<&str> {
        self.property_value(key)
            .and_then(|v| v.get("name"))
            .and_then(Value::as_str)
    }

    /// Concatenated text of a rich_text or title property
    pub fn text(&self, key: &str) -> Option<String> {
        match FieldType::from_wire(self.property_type(key)?)? {
            FieldType::RichText | FieldType::Title => self
                .property_value(key)
                .and_then(Value::as_array)
                .map(|segments| plain_text(segments)),
            _ => None,
        }
    }

    /// Names of the options in a multi_select property, in stored order
    pub fn multi_select_names(&self, key: &str) -> Vec<String> {
        self.property_value(key)
            .and_then(Value::as_array)
            .map(|options| {
                options
                    .iter()
                    .filter_map(|o| o.get("name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn title(&self) -> Option<String> {
        self.text("name")
    }

    pub fn status(&self) -> Option<&str> {
        self.select("status")
    }
}
