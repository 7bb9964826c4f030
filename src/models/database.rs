//! Database objects as returned by the workspace service.

use crate::models::field_type::FieldType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Text payload of a rich-text segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<Value>,
}

/// One segment of a rich-text array (database titles, rich_text cells)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextSegment {
    #[serde(rename = "type", default = "default_segment_type")]
    pub segment_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plain_text: Option<String>,
}

fn default_segment_type() -> String {
    "text".to_string()
}

impl RichTextSegment {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            segment_type: default_segment_type(),
            text: Some(TextContent {
                content: content.into(),
                link: None,
            }),
            plain_text: None,
        }
    }

    /// Segment text, preferring `text.content` over `plain_text`
    pub fn content(&self) -> Option<&str> {
        self.text
            .as_ref()
            .map(|t| t.content.as_str())
            .or(self.plain_text.as_deref())
    }
}

/// Snapshot of a database at fetch time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub id: String,
    #[serde(default)]
    pub title: Vec<RichTextSegment>,
    /// Column name → schema descriptor (`{"id", "name", "type", "<type>": {..}}`)
    #[serde(default)]
    pub properties: BTreeMap<String, Value>,
    #[serde(default)]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_edited_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub archived: bool,
}

impl DatabaseInfo {
    /// Text of the first title segment, used for name lookups
    pub fn title_text(&self) -> Option<&str> {
        self.title.first().and_then(RichTextSegment::content)
    }

    /// Remote kind of a column, when the column exists and its kind is known
    pub fn column_type(&self, name: &str) -> Option<FieldType> {
        self.properties
            .get(name)
            .and_then(|p| p.get("type"))
            .and_then(Value::as_str)
            .and_then(FieldType::from_wire)
    }
}
