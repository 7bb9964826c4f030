//! Property values and the update envelopes sent to the workspace service.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// Maximum characters per rich-text segment accepted by the service
pub const RICH_TEXT_SEGMENT_LIMIT: usize = 2000;

/// Option colors accepted by select and multi_select properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectColor {
    #[default]
    Default,
    Gray,
    Brown,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Pink,
    Red,
}

impl SelectColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectColor::Default => "default",
            SelectColor::Gray => "gray",
            SelectColor::Brown => "brown",
            SelectColor::Orange => "orange",
            SelectColor::Yellow => "yellow",
            SelectColor::Green => "green",
            SelectColor::Blue => "blue",
            SelectColor::Purple => "purple",
            SelectColor::Pink => "pink",
            SelectColor::Red => "red",
        }
    }
}

impl std::str::FromStr for SelectColor {
    type Err = crate::error::ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_value(Value::String(s.to_string())).map_err(|_| {
            crate::error::ApiError::InvalidArgument(format!("Unknown color: {}", s))
        })
    }
}

/// A named option of a select or multi_select property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
    #[serde(default)]
    pub color: SelectColor,
}

impl SelectOption {
    pub fn new(name: impl Into<String>, color: SelectColor) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// Externally hosted file attached to a files property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub url: String,
}

impl FileRef {
    fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "type": "external",
            "external": { "url": self.url },
        })
    }

    /// Read a file entry as returned by the service (external or hosted)
    pub fn from_json(value: &Value) -> Option<FileRef> {
        let name = value.get("name")?.as_str()?.to_string();
        let kind = value.get("type")?.as_str()?;
        let url = value.get(kind)?.get("url")?.as_str()?.to_string();
        Some(FileRef { name, url })
    }
}

/// Value logged for a run parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl ParamValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Number(_) => "number",
            ParamValue::Text(_) => "text",
            ParamValue::Bool(_) => "boolean",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Text(s) => f.write_str(s),
            ParamValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Number(value as f64)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Number(f64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Number(f64::from(value))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// A property write, one variant per writable remote kind
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyUpdate {
    Number(f64),
    RichText(String),
    Select(String),
    Checkbox(bool),
    MultiSelect(Vec<SelectOption>),
    Files(Vec<FileRef>),
}

impl PropertyUpdate {
    /// Render the envelope exactly as the service expects it in `properties`
    pub fn to_json(&self) -> Value {
        match self {
            PropertyUpdate::Number(n) => json!({ "number": n }),
            PropertyUpdate::RichText(text) => json!({ "rich_text": rich_text_segments(text) }),
            PropertyUpdate::Select(name) => json!({ "select": { "name": name } }),
            PropertyUpdate::Checkbox(b) => json!({ "checkbox": b }),
            PropertyUpdate::MultiSelect(options) => json!({ "multi_select": options }),
            PropertyUpdate::Files(files) => {
                json!({ "files": files.iter().map(FileRef::to_json).collect::<Vec<_>>() })
            }
        }
    }
}

/// Split text into `text` segments no longer than the per-segment limit.
/// Empty text yields no segments.
pub fn rich_text_segments(text: &str) -> Vec<Value> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(RICH_TEXT_SEGMENT_LIMIT)
        .map(|chunk| {
            let content: String = chunk.iter().collect();
            json!({ "type": "text", "text": { "content": content } })
        })
        .collect()
}

/// Concatenate the text of rich-text segments (`plain_text` or `text.content`)
pub fn plain_text(segments: &[Value]) -> String {
    segments
        .iter()
        .filter_map(|segment| {
            segment
                .get("text")
                .and_then(|t| t.get("content"))
                .or_else(|| segment.get("plain_text"))
                .and_then(Value::as_str)
        })
        .collect()
}
