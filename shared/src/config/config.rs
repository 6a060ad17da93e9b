use std::fs;
use tracing::{debug, error, info};

use crate::types::Role;
use crate::types::client_config::{AppConfig, ConfigError};

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Loading configuration from: {}", path);

    let contents = fs::read_to_string(path)?;
    debug!("Processing file: {}", path);

    parse_config(&contents)
}

/// Parse and validate configuration text. Split out of [`load_config`] so
/// callers holding the TOML in memory skip the filesystem.
pub fn parse_config(contents: &str) -> Result<AppConfig, ConfigError> {
    if contents.trim().is_empty() {
        error!("Configuration file is empty");
        return Err(ConfigError::InvalidConfig("empty file".into()));
    }

    let config: AppConfig = toml::from_str(contents)?;

    info!("Configuration loaded successfully");
    debug!("Config: {:?}", config);

    validate_config(&config)?;

    info!("Config validated");

    Ok(config)
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    // Base URL must be resolvable (env var or config field) and absolute.
    match config.api.resolved_base_url() {
        None => {
            return Err(ConfigError::InvalidConfig(
                "base_url must be set via the PARKING_API_URL env var or api.base_url config field"
                    .into(),
            ));
        }
        Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => {
            return Err(ConfigError::InvalidConfig(format!(
                "base_url must start with http:// or https://, got {}",
                url
            )));
        }
        _ => {}
    }

    if config.storage.dir.trim().is_empty() {
        return Err(ConfigError::InvalidConfig("storage.dir cannot be empty".into()));
    }

    let key = config.storage.key.trim();
    if key.is_empty() || key.contains('/') || key.contains('\\') || key == "." || key == ".." {
        return Err(ConfigError::InvalidConfig(
            "storage.key must be a plain file name".into(),
        ));
    }

    if config.access.admitted_roles.is_empty() {
        return Err(ConfigError::InvalidConfig(
            "access.admitted_roles cannot be empty".into(),
        ));
    }

    if config.access.admitted_roles.contains(&Role::Unknown) {
        return Err(ConfigError::InvalidConfig(
            "access.admitted_roles contains an unrecognised role".into(),
        ));
    }

    Ok(())
}
