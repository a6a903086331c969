//! Service context - dependency container for services
//!
//! Holds the repositories, the unit-of-work factory, the image store and
//! the auth helpers every service borrows.

use std::sync::Arc;

use market_common::auth::{JwtService, PasswordService};
use market_common::StorageConfig;
use market_core::traits::{
    ChatRepository, ImageStore, ItemRepository, TransactionRepository, UnitOfWorkFactory,
    UserRepository,
};
use market_core::{Snowflake, SnowflakeGenerator};
use market_db::{
    MemoryStore, PgChatRepository, PgItemRepository, PgPool, PgTransactionRepository,
    PgUnitOfWorkFactory, PgUserRepository,
};

use super::error::{ServiceError, ServiceResult};

/// Image upload constraints
#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_bytes: usize,
    pub allowed_content_types: Vec<String>,
}

impl UploadLimits {
    pub fn allows(&self, content_type: &str) -> bool {
        self.allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
    }
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self::from(&StorageConfig::default())
    }
}

impl From<&StorageConfig> for UploadLimits {
    fn from(config: &StorageConfig) -> Self {
        Self {
            max_bytes: config.max_file_size_bytes(),
            allowed_content_types: config.allowed_content_types.clone(),
        }
    }
}

/// Service context containing all dependencies
#[derive(Clone)]
pub struct ServiceContext {
    // Repositories
    user_repo: Arc<dyn UserRepository>,
    item_repo: Arc<dyn ItemRepository>,
    transaction_repo: Arc<dyn TransactionRepository>,
    chat_repo: Arc<dyn ChatRepository>,

    // Atomic scopes over items + transactions
    units: Arc<dyn UnitOfWorkFactory>,

    // Blob storage
    image_store: Arc<dyn ImageStore>,
    upload_limits: UploadLimits,

    // Auth
    jwt_service: Arc<JwtService>,
    password_service: PasswordService,

    snowflake_generator: Arc<SnowflakeGenerator>,
}

impl ServiceContext {
    /// Start building a context
    pub fn builder() -> ServiceContextBuilder {
        ServiceContextBuilder::new()
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn item_repo(&self) -> &dyn ItemRepository {
        self.item_repo.as_ref()
    }

    pub fn transaction_repo(&self) -> &dyn TransactionRepository {
        self.transaction_repo.as_ref()
    }

    pub fn chat_repo(&self) -> &dyn ChatRepository {
        self.chat_repo.as_ref()
    }

    /// Factory for item/transaction units of work
    pub fn units(&self) -> &dyn UnitOfWorkFactory {
        self.units.as_ref()
    }

    // === Storage ===

    pub fn image_store(&self) -> &dyn ImageStore {
        self.image_store.as_ref()
    }

    pub fn upload_limits(&self) -> &UploadLimits {
        &self.upload_limits
    }

    // === Auth ===

    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    pub fn password_service(&self) -> PasswordService {
        self.password_service
    }

    /// Generate a new Snowflake ID
    pub fn generate_id(&self) -> Snowflake {
        self.snowflake_generator.generate()
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("repositories", &"...")
            .field("upload_limits", &self.upload_limits)
            .field("snowflake_generator", &self.snowflake_generator)
            .finish_non_exhaustive()
    }
}

/// Builder for creating ServiceContext
#[derive(Default)]
pub struct ServiceContextBuilder {
    user_repo: Option<Arc<dyn UserRepository>>,
    item_repo: Option<Arc<dyn ItemRepository>>,
    transaction_repo: Option<Arc<dyn TransactionRepository>>,
    chat_repo: Option<Arc<dyn ChatRepository>>,
    units: Option<Arc<dyn UnitOfWorkFactory>>,
    image_store: Option<Arc<dyn ImageStore>>,
    upload_limits: Option<UploadLimits>,
    jwt_service: Option<Arc<JwtService>>,
    snowflake_generator: Option<Arc<SnowflakeGenerator>>,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every repository and the unit of work backed by one PostgreSQL pool
    pub fn postgres(self, pool: PgPool) -> Self {
        self.user_repo(Arc::new(PgUserRepository::new(pool.clone())))
            .item_repo(Arc::new(PgItemRepository::new(pool.clone())))
            .transaction_repo(Arc::new(PgTransactionRepository::new(pool.clone())))
            .chat_repo(Arc::new(PgChatRepository::new(pool.clone())))
            .units(Arc::new(PgUnitOfWorkFactory::new(pool)))
    }

    /// Every repository and the unit of work backed by one in-memory store
    pub fn memory(self, store: &MemoryStore) -> Self {
        self.user_repo(Arc::new(store.clone()))
            .item_repo(Arc::new(store.clone()))
            .transaction_repo(Arc::new(store.clone()))
            .chat_repo(Arc::new(store.clone()))
            .units(Arc::new(store.clone()))
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn item_repo(mut self, repo: Arc<dyn ItemRepository>) -> Self {
        self.item_repo = Some(repo);
        self
    }

    pub fn transaction_repo(mut self, repo: Arc<dyn TransactionRepository>) -> Self {
        self.transaction_repo = Some(repo);
        self
    }

    pub fn chat_repo(mut self, repo: Arc<dyn ChatRepository>) -> Self {
        self.chat_repo = Some(repo);
        self
    }

    pub fn units(mut self, units: Arc<dyn UnitOfWorkFactory>) -> Self {
        self.units = Some(units);
        self
    }

    pub fn image_store(mut self, store: Arc<dyn ImageStore>) -> Self {
        self.image_store = Some(store);
        self
    }

    pub fn upload_limits(mut self, limits: UploadLimits) -> Self {
        self.upload_limits = Some(limits);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn snowflake_generator(mut self, generator: Arc<SnowflakeGenerator>) -> Self {
        self.snowflake_generator = Some(generator);
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        fn required<T>(value: Option<T>, name: &str) -> ServiceResult<T> {
            value.ok_or_else(|| ServiceError::internal(format!("{name} is required")))
        }

        Ok(ServiceContext {
            user_repo: required(self.user_repo, "user_repo")?,
            item_repo: required(self.item_repo, "item_repo")?,
            transaction_repo: required(self.transaction_repo, "transaction_repo")?,
            chat_repo: required(self.chat_repo, "chat_repo")?,
            units: required(self.units, "units")?,
            image_store: required(self.image_store, "image_store")?,
            upload_limits: self.upload_limits.unwrap_or_default(),
            jwt_service: required(self.jwt_service, "jwt_service")?,
            password_service: PasswordService::new(),
            snowflake_generator: self.snowflake_generator.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_requires_dependencies() {
        let err = ServiceContext::builder().build().unwrap_err();
        assert!(err.to_string().contains("user_repo is required"));
    }

    #[test]
    fn test_upload_limits_defaults() {
        let limits = UploadLimits::default();
        assert_eq!(limits.max_bytes, 5 * 1024 * 1024);
        assert!(limits.allows("IMAGE/PNG"));
        assert!(!limits.allows("application/pdf"));
    }
}
