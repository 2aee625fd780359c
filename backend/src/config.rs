//! Configuration management for the Kariyad weather station server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with KWS_ prefix
//! 4. The hosted-table variables (SUPABASE_URL, SUPABASE_API_KEY,
//!    SUPABASE_WEATHER_TABLE) used by existing deployments

use std::path::PathBuf;
use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use crate::external::RemoteTableConfig;
use crate::store::StoreConfig;

pub const DEFAULT_WEATHER_TABLE: &str = "weather_data";

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Local data file configuration
    pub storage: StorageConfig,

    /// Hosted table configuration
    pub remote: RemoteConfig,

    /// Admin authentication configuration
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding the data file and its backups
    pub data_dir: PathBuf,

    /// Name of the JSON data file inside `data_dir`
    pub file_name: String,
}

#[derive(Deserialize, Clone)]
pub struct RemoteConfig {
    /// Base URL of the hosted table service
    pub url: Option<String>,

    /// API key, sent both as `apikey` and as a bearer token
    pub api_key: Option<String>,

    /// Table holding the weather rows
    pub table: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct AuthConfig {
    /// Secret key for signing JWT tokens
    pub jwt_secret: String,

    /// bcrypt hash of the station admin password; login is disabled when unset
    pub admin_password_hash: Option<String>,

    /// Access token expiration in seconds
    pub token_expiry_secs: i64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("KWS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8080)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("storage.data_dir", "data")?
            .set_default("storage.file_name", "weather-data.json")?
            .set_default("remote.table", DEFAULT_WEATHER_TABLE)?
            .set_default("remote.timeout_secs", 10)?
            .set_default("auth.jwt_secret", "development-secret-key")?
            .set_default("auth.token_expiry_secs", 8 * 3600)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (KWS_ prefix)
            .add_source(
                Environment::with_prefix("KWS")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("remote.url", non_empty_env("SUPABASE_URL"))?
            .set_override_option("remote.api_key", non_empty_env("SUPABASE_API_KEY"))?
            .set_override_option("remote.table", non_empty_env("SUPABASE_WEATHER_TABLE"))?
            .build()?;

        config.try_deserialize()
    }

    /// Storage settings handed to the record store.
    ///
    /// The hosted table is only used when both URL and key are present.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            data_file: self.storage.data_dir.join(&self.storage.file_name),
            remote: self.remote.table_config(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl RemoteConfig {
    pub fn table_config(&self) -> Option<RemoteTableConfig> {
        let url = self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())?;
        let api_key = self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())?;

        Some(RemoteTableConfig {
            base_url: url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: self.table.clone(),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
        })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// Secrets stay out of logs
impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .field("table", &self.table)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<set>")
            .field("admin_password_hash", &self.admin_password_hash.as_ref().map(|_| "<set>"))
            .field("token_expiry_secs", &self.token_expiry_secs)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            file_name: "weather-data.json".to_string(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            table: DEFAULT_WEATHER_TABLE.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development-secret-key".to_string(),
            admin_password_hash: None,
            token_expiry_secs: 8 * 3600,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            remote: RemoteConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}
