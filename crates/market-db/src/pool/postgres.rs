//! PostgreSQL connection pool and schema migrations

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Pool settings
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// PostgreSQL connection URL
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Maximum time to wait for a connection
    pub acquire_timeout: Duration,
    /// Maximum idle time before a connection is closed
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl PoolConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl From<&market_common::DatabaseConfig> for PoolConfig {
    fn from(config: &market_common::DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            ..Self::new(config.url.clone())
        }
    }
}

/// Create a new PostgreSQL connection pool
pub async fn create_pool(config: &PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(&config.url)
        .await
}

/// Apply every pending migration found in `dir`
pub async fn run_migrations(pool: &PgPool, dir: &Path) -> Result<(), MigrateError> {
    let migrator = Migrator::new(dir).await?;
    info!(dir = %dir.display(), count = migrator.iter().count(), "Applying migrations");
    migrator.run(pool).await
}
