//! Run status stored in the `status` select column.

use crate::error::ApiError;
use crate::models::property::{SelectColor, SelectOption};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a run page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Running,
    Success,
    Failed,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Running => "running",
            PageStatus::Success => "success",
            PageStatus::Failed => "failed",
        }
    }

    pub fn color(&self) -> SelectColor {
        match self {
            PageStatus::Running => SelectColor::Yellow,
            PageStatus::Success => SelectColor::Green,
            PageStatus::Failed => SelectColor::Red,
        }
    }

    /// Select options declared on the `status` column of a run database
    pub fn options() -> Vec<SelectOption> {
        [PageStatus::Success, PageStatus::Failed, PageStatus::Running]
            .iter()
            .map(|status| SelectOption::new(status.as_str(), status.color()))
            .collect()
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(PageStatus::Running),
            "success" => Ok(PageStatus::Success),
            "failed" => Ok(PageStatus::Failed),
            _ => Err(ApiError::InvalidArgument(format!(
                "Invalid status: {} (must be running, success or failed)",
                s
            ))),
        }
    }
}
