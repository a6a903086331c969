//! # market-common
//!
//! Shared utilities including configuration, error handling, authentication, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    hash_password, validate_password_strength, verify_password, Claims, JwtService,
    PasswordService, TokenPair, TokenType,
};
pub use config::{
    AppConfig, AppSettings, BucketConfig, ConfigError, CorsConfig, DatabaseBackend,
    DatabaseConfig, Environment, JwtConfig, RateLimitConfig, ServerConfig, SnowflakeConfig,
    StorageBackend, StorageConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, TracingConfig, TracingError};
