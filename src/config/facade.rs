//! Config loading facade: assembles sources in precedence order.

use super::merge::merge_policy;
use super::sources::{env, global_file};
use super::NotionFlowConfig;
use crate::error::ApiError;
use config::File;
use std::path::Path;

/// Loads [`NotionFlowConfig`] from defaults, files and the environment
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults → global config file → environment
    pub fn load() -> Result<NotionFlowConfig, ApiError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = env::add_to_builder(builder)?;
        Self::finish(builder.build()?)
    }

    /// Defaults → the given file (required) → environment
    pub fn load_from_file(path: &Path) -> Result<NotionFlowConfig, ApiError> {
        if !path.exists() {
            return Err(ApiError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        let builder = env::add_to_builder(builder)?;
        Self::finish(builder.build()?)
    }

    /// Built-in defaults only; ignores files and the environment
    pub fn defaults() -> NotionFlowConfig {
        NotionFlowConfig::default()
    }

    fn finish(raw: config::Config) -> Result<NotionFlowConfig, ApiError> {
        let config: NotionFlowConfig = raw.try_deserialize()?;
        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::Configuration(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
