//! Server setup: dependency wiring and the listener loop

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use market_common::{AppConfig, AppError, DatabaseBackend, JwtService, StorageConfig};
use market_core::SnowflakeGenerator;
use market_db::{create_pool, run_migrations, MemoryStore, PoolConfig};
use market_service::{ServiceContext, UploadLimits};
use tokio::net::TcpListener;
use tracing::info;

use crate::middleware::{apply_middleware, apply_middleware_with_rate_limit};
use crate::routes::{create_router, health_routes, upload_routes};
use crate::state::AppState;

const MIGRATIONS_DIR: &str = "migrations";

/// Router with middleware but no rate limiting, for tests and embedding
pub fn create_app(state: AppState) -> Router {
    let max_upload = state.service_context().upload_limits().max_bytes;
    let cors = market_common::CorsConfig::default();
    apply_middleware(create_router(max_upload).merge(health_routes()), &cors, false)
        .with_state(state)
}

/// [`create_app`] plus the local upload directory when one is configured
pub fn create_app_with_uploads(state: AppState, storage: &StorageConfig) -> Router {
    let max_upload = state.service_context().upload_limits().max_bytes;
    let cors = market_common::CorsConfig::default();
    let mut router = create_router(max_upload).merge(health_routes());
    if let Some(uploads) = upload_routes(storage) {
        router = router.merge(uploads);
    }
    apply_middleware(router, &cors, false).with_state(state)
}

/// The production router: API behind the rate limiter; health and uploads outside it
pub fn create_app_with_config(state: AppState, config: &AppConfig) -> Result<Router, AppError> {
    let is_production = config.app.env.is_production();
    let max_upload = state.service_context().upload_limits().max_bytes;

    let api = apply_middleware_with_rate_limit(
        create_router(max_upload),
        &config.rate_limit,
        &config.cors,
        is_production,
    )?;
    let mut public = health_routes();
    if let Some(uploads) = upload_routes(&config.storage) {
        public = public.merge(uploads);
    }
    let public = apply_middleware(public, &config.cors, is_production);

    Ok(api.merge(public).with_state(state))
}

/// Connect the configured backends and build the service context
pub async fn create_app_state(config: &AppConfig) -> Result<AppState, AppError> {
    let jwt_service = Arc::new(JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
        config.jwt.refresh_token_expiry,
    ));
    let snowflake_generator = Arc::new(SnowflakeGenerator::new(config.snowflake.worker_id));
    let image_store = market_storage::from_config(&config.storage);

    let builder = ServiceContext::builder()
        .image_store(image_store)
        .upload_limits(UploadLimits::from(&config.storage))
        .jwt_service(jwt_service)
        .snowflake_generator(snowflake_generator);

    match config.database.backend {
        DatabaseBackend::Postgres => {
            info!("Connecting to PostgreSQL...");
            let pool = create_pool(&PoolConfig::from(&config.database))
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            info!("PostgreSQL connection established");

            if config.database.run_migrations {
                run_migrations(&pool, Path::new(MIGRATIONS_DIR))
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
                info!("Migrations applied");
            }

            let ctx = builder.postgres(pool.clone()).build()?;
            Ok(AppState::new(ctx).with_database(pool))
        }
        DatabaseBackend::Memory => {
            tracing::warn!("Using the in-memory backend; data is lost on restart");
            let ctx = builder.memory(&MemoryStore::new()).build()?;
            Ok(AppState::new(ctx))
        }
    }
}

/// Bind and serve until the process is stopped
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))
}

/// Build everything from configuration and serve
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {e}")))?;

    let state = create_app_state(&config).await?;
    let app = create_app_with_config(state, &config)?;

    run_server(app, addr).await
}
