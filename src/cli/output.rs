//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map client errors to a string for CLI output. Remote failures get a hint about
/// credentials since that is their most common cause.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::RemoteAuthFailed(_) => format!(
            "{}\nCheck NOTION_TOKEN and that the integration is shared with the page.",
            e
        ),
        _ => e.to_string(),
    }
}
