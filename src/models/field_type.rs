//! Field-type mapping between logical experiment types and remote property kinds.

use crate::error::{ApiError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Remote property kinds understood by the workspace service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Title,
    RichText,
    Number,
    Select,
    MultiSelect,
    Date,
    People,
    Files,
    Checkbox,
    Url,
    Email,
    PhoneNumber,
    Formula,
    Relation,
    Rollup,
    Status,
    CreatedTime,
    CreatedBy,
    LastEditedTime,
    LastEditedBy,
}

impl FieldType {
    pub const ALL: [FieldType; 20] = [
        FieldType::Title,
        FieldType::RichText,
        FieldType::Number,
        FieldType::Select,
        FieldType::MultiSelect,
        FieldType::Date,
        FieldType::People,
        FieldType::Files,
        FieldType::Checkbox,
        FieldType::Url,
        FieldType::Email,
        FieldType::PhoneNumber,
        FieldType::Formula,
        FieldType::Relation,
        FieldType::Rollup,
        FieldType::Status,
        FieldType::CreatedTime,
        FieldType::CreatedBy,
        FieldType::LastEditedTime,
        FieldType::LastEditedBy,
    ];

    /// Wire token for this kind (the `type` field of a property envelope)
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Title => "title",
            FieldType::RichText => "rich_text",
            FieldType::Number => "number",
            FieldType::Select => "select",
            FieldType::MultiSelect => "multi_select",
            FieldType::Date => "date",
            FieldType::People => "people",
            FieldType::Files => "files",
            FieldType::Checkbox => "checkbox",
            FieldType::Url => "url",
            FieldType::Email => "email",
            FieldType::PhoneNumber => "phone_number",
            FieldType::Formula => "formula",
            FieldType::Relation => "relation",
            FieldType::Rollup => "rollup",
            FieldType::Status => "status",
            FieldType::CreatedTime => "created_time",
            FieldType::CreatedBy => "created_by",
            FieldType::LastEditedTime => "last_edited_time",
            FieldType::LastEditedBy => "last_edited_by",
        }
    }

    /// Parse a wire token; `None` for kinds this client does not know.
    pub fn from_wire(token: &str) -> Option<FieldType> {
        FieldType::ALL.iter().copied().find(|t| t.as_str() == token)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical parameter types accepted when creating a run database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Number,
    String,
    Category,
    Boolean,
}

impl ParamType {
    pub fn field_type(self) -> FieldType {
        match self {
            ParamType::Number => FieldType::Number,
            ParamType::String => FieldType::RichText,
            ParamType::Category => FieldType::Select,
            ParamType::Boolean => FieldType::Checkbox,
        }
    }
}

impl FromStr for ParamType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "number" => Ok(ParamType::Number),
            "string" => Ok(ParamType::String),
            "category" => Ok(ParamType::Category),
            "boolean" => Ok(ParamType::Boolean),
            _ => Err(ApiError::UnknownFieldType {
                kind: "param",
                name: s.to_string(),
            }),
        }
    }
}

/// Logical metric types accepted when creating a run database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Single latest value
    Number,
    /// Step history kept in a rich_text cell
    Array,
}

impl MetricType {
    pub fn field_type(self) -> FieldType {
        match self {
            MetricType::Number => FieldType::Number,
            MetricType::Array => FieldType::RichText,
        }
    }
}

impl FromStr for MetricType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "number" => Ok(MetricType::Number),
            "array" => Ok(MetricType::Array),
            _ => Err(ApiError::UnknownFieldType {
                kind: "metric",
                name: s.to_string(),
            }),
        }
    }
}

/// Resolve a logical param type name to its remote field kind
pub fn param_field_type(name: &str) -> Result<FieldType> {
    name.parse::<ParamType>().map(ParamType::field_type)
}

/// Resolve a logical metric type name to its remote field kind
pub fn metric_field_type(name: &str) -> Result<FieldType> {
    name.parse::<MetricType>().map(MetricType::field_type)
}
