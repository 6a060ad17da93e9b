use serde::Deserialize;
use thiserror::Error;

use super::role::{Role, RoleSet};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Backend base URL, e.g. `http://localhost:3000/api`.
    ///
    /// The `PARKING_API_URL` environment variable takes priority over this
    /// field, so one config file can point at different backends.
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding the credential file.
    #[serde(default = "default_storage_dir")]
    pub dir: String,
    /// Fixed storage key; doubles as the credential file name.
    #[serde(default = "default_storage_key")]
    pub key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AccessConfig {
    /// Roles allowed to hold a session in the console.
    #[serde(default = "default_admitted_roles")]
    pub admitted_roles: Vec<Role>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub access: AccessConfig,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl ApiConfig {
    /// Resolve the base URL with `PARKING_API_URL` taking priority over the
    /// config file field. Trailing slashes are stripped.
    ///
    /// Returns `None` when neither source is set.
    pub fn resolved_base_url(&self) -> Option<String> {
        std::env::var("PARKING_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.base_url.clone())
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
    }
}

impl StorageConfig {
    pub fn token_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.dir).join(&self.key)
    }
}

impl AccessConfig {
    pub fn admitted(&self) -> RoleSet {
        self.admitted_roles.iter().copied().collect()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            key: default_storage_key(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            admitted_roles: default_admitted_roles(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

pub fn default_storage_dir() -> String {
    ".parking-console".to_string()
}

pub fn default_storage_key() -> String {
    "token".to_string()
}

pub fn default_log_filter() -> String {
    "info".to_string()
}

pub fn default_admitted_roles() -> Vec<Role> {
    vec![
        Role::AdminGeneral,
        Role::AdminParking,
        Role::Admin,
        Role::Employee,
    ]
}
