//! Application configuration
//!
//! Sources, later ones winning:
//! 1. built-in defaults
//! 2. `config/default.toml` (optional)
//! 3. `config/{APP_ENV}.toml` (optional)
//! 4. `MARKET__SECTION__KEY` environment variables, after `.env` is loaded

use ::config::{Config, File};
use serde::Deserialize;

const ENV_PREFIX: &str = "MARKET";
const ENV_SEPARATOR: &str = "__";
const LIST_KEYS: [&str; 2] = ["cors.allowed_origins", "storage.allowed_content_types"];

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub api: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            env: Environment::default(),
        }
    }
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which repository implementation backs the services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    /// Process-local store, lost on restart
    Memory,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: DatabaseBackend,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::default(),
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            run_migrations: true,
        }
    }
}

/// JWT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,
}

/// Rate limiting configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Where uploaded images are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Local,
    /// Remote object-storage bucket over HTTP
    Bucket,
}

/// Remote bucket credentials
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BucketConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub bucket_id: String,
    #[serde(default)]
    pub api_key: String,
}

/// File storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Prefix of URLs handed out by the local backend
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: u32,
    #[serde(default = "default_allowed_content_types")]
    pub allowed_content_types: Vec<String>,
    #[serde(default)]
    pub bucket: BucketConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            upload_dir: default_upload_dir(),
            public_base_url: default_public_base_url(),
            max_file_size_mb: default_max_file_size(),
            allowed_content_types: default_allowed_content_types(),
            bucket: BucketConfig::default(),
        }
    }
}

impl StorageConfig {
    #[must_use]
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb as usize * 1024 * 1024
    }

    #[must_use]
    pub fn is_allowed_content_type(&self, content_type: &str) -> bool {
        self.allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
    }
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "market-server".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

fn default_refresh_token_expiry() -> i64 {
    604800 // 7 days
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_burst() -> u32 {
    50
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_public_base_url() -> String {
    "/uploads".to_string()
}

fn default_max_file_size() -> u32 {
    5
}

fn default_allowed_content_types() -> Vec<String> {
    ["image/jpeg", "image/png", "image/gif"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl AppConfig {
    /// Load configuration from config files and `MARKET__*` environment variables
    ///
    /// # Errors
    /// Returns an error if a source cannot be parsed or the result fails [`Self::validate`]
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let profile = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{profile}")).required(false))
            .add_source(env_source());

        Self::from_builder(builder)
    }

    fn from_builder(
        builder: ::config::ConfigBuilder<::config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::MissingVar("jwt.secret"));
        }
        if self.database.backend == DatabaseBackend::Postgres && self.database.url.trim().is_empty() {
            return Err(ConfigError::MissingVar("database.url"));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::InvalidValue(
                "database.min_connections",
                "must not exceed database.max_connections".to_string(),
            ));
        }
        if self.storage.backend == StorageBackend::Bucket {
            let bucket = &self.storage.bucket;
            for (key, value) in [
                ("storage.bucket.endpoint", &bucket.endpoint),
                ("storage.bucket.project_id", &bucket.project_id),
                ("storage.bucket.bucket_id", &bucket.bucket_id),
                ("storage.bucket.api_key", &bucket.api_key),
            ] {
                if value.trim().is_empty() {
                    return Err(ConfigError::MissingVar(key));
                }
            }
        }
        if self.snowflake.worker_id >= 1024 {
            return Err(ConfigError::InvalidValue(
                "snowflake.worker_id",
                self.snowflake.worker_id.to_string(),
            ));
        }
        Ok(())
    }
}

fn env_source() -> ::config::Environment {
    let mut source = ::config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
        .list_separator(",");
    for key in LIST_KEYS {
        source = source.with_list_parse_key(key);
    }
    source
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error(transparent)]
    Source(#[from] ::config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_builder(Config::builder().add_source(env_source().source(Some(map))))
    }

    #[test]
    fn test_environment_is_production() {
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_server_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_defaults_from_minimal_env() {
        let config = load_from(&[
            ("MARKET__JWT__SECRET", "s3cret"),
            ("MARKET__DATABASE__URL", "postgres://localhost/market"),
        ])
        .unwrap();

        assert_eq!(config.app.name, "market-server");
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.jwt.access_token_expiry, 900);
        assert_eq!(config.jwt.refresh_token_expiry, 604_800);
        assert_eq!(config.storage.max_file_size_mb, 5);
        assert_eq!(config.storage.max_file_size_bytes(), 5 * 1024 * 1024);
        assert!(config.storage.is_allowed_content_type("image/PNG"));
        assert!(!config.storage.is_allowed_content_type("application/pdf"));
        assert!(config.database.run_migrations);
    }

    #[test]
    fn test_nested_and_list_values() {
        let config = load_from(&[
            ("MARKET__JWT__SECRET", "s3cret"),
            ("MARKET__DATABASE__BACKEND", "memory"),
            ("MARKET__API__PORT", "9000"),
            ("MARKET__APP__ENV", "production"),
            ("MARKET__CORS__ALLOWED_ORIGINS", "https://a.example,https://b.example"),
            ("MARKET__SNOWFLAKE__WORKER_ID", "7"),
        ])
        .unwrap();

        assert_eq!(config.database.backend, DatabaseBackend::Memory);
        assert_eq!(config.api.port, 9000);
        assert!(config.app.env.is_production());
        assert_eq!(config.cors.allowed_origins.len(), 2);
        assert_eq!(config.snowflake.worker_id, 7);
    }

    #[test]
    fn test_validation_failures() {
        assert!(matches!(
            load_from(&[("MARKET__JWT__SECRET", "s3cret")]),
            Err(ConfigError::MissingVar("database.url"))
        ));
        assert!(matches!(
            load_from(&[
                ("MARKET__JWT__SECRET", "  "),
                ("MARKET__DATABASE__BACKEND", "memory"),
            ]),
            Err(ConfigError::MissingVar("jwt.secret"))
        ));
        assert!(matches!(
            load_from(&[
                ("MARKET__JWT__SECRET", "s3cret"),
                ("MARKET__DATABASE__BACKEND", "memory"),
                ("MARKET__STORAGE__BACKEND", "bucket"),
                ("MARKET__STORAGE__BUCKET__ENDPOINT", "https://objects.example/v1"),
            ]),
            Err(ConfigError::MissingVar("storage.bucket.project_id"))
        ));
    }
}
