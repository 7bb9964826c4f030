//! Environment sources: `NOTIONFLOW__SECTION__KEY` overrides and the two
//! credential variables understood by every NotionFlow entry point.

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Integration token
pub const TOKEN_ENV: &str = "NOTION_TOKEN";

/// Page under which run databases are created
pub const PARENT_PAGE_ENV: &str = "NOTION_PARENT_PAGE_ID";

/// Add environment overrides to builder. Credential variables win over
/// everything else, including `NOTIONFLOW__AUTH`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let mut builder = builder.add_source(
        Environment::with_prefix("NOTIONFLOW")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    if let Some(token) = non_empty_var(TOKEN_ENV) {
        builder = builder.set_override("auth", token)?;
    }
    if let Some(parent) = non_empty_var(PARENT_PAGE_ENV) {
        builder = builder.set_override("parent_page_id", parent)?;
    }
    Ok(builder)
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
