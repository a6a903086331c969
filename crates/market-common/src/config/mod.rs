//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, BucketConfig, ConfigError, CorsConfig, DatabaseBackend,
    DatabaseConfig, Environment, JwtConfig, RateLimitConfig, ServerConfig, SnowflakeConfig,
    StorageBackend, StorageConfig,
};
