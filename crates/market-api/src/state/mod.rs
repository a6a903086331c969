//! Application state shared across handlers

use std::sync::Arc;

use market_common::JwtService;
use market_db::PgPool;
use market_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    /// Present only with the PostgreSQL backend; probed by readiness
    database: Option<PgPool>,
}

impl AppState {
    pub fn new(service_context: ServiceContext) -> Self {
        Self {
            service_context: Arc::new(service_context),
            database: None,
        }
    }

    #[must_use]
    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.database = Some(pool);
        self
    }

    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    pub fn database(&self) -> Option<&PgPool> {
        self.database.as_ref()
    }

    pub fn jwt_service(&self) -> &JwtService {
        self.service_context.jwt_service()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("database", &self.database.is_some())
            .finish()
    }
}
