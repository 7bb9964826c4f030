//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("api.base_url", "https://api.notion.com/v1")?
        .set_default("api.notion_version", "2022-06-28")?
        .set_default("poll.max_attempts", 10)?
        .set_default("poll.interval_ms", 1000)?
        .set_default("storage.key_prefix", "artifacts")
}
