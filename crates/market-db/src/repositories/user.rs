//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use market_core::entities::User;
use market_core::error::DomainError;
use market_core::traits::{RepoResult, UserRepository};
use market_core::value_objects::{Page, PageRequest, Snowflake};

use crate::mappers::map_rows;
use crate::models::UserModel;

use super::error::{like_pattern, map_db_error, map_unique_violation};

const USER_COLUMNS: &str =
    "id, name, email, phone, address, role, created_at, updated_at, deleted_at";

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(User::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1) AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(User::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND deleted_at IS NULL)
            ",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn list(&self, search: Option<&str>, page: PageRequest) -> RepoResult<Page<User>> {
        let pattern = search.and_then(like_pattern);

        let total = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM users
            WHERE deleted_at IS NULL
              AND ($1::TEXT IS NULL OR name ILIKE $1 OR email ILIKE $1)
            ",
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        let rows = sqlx::query_as::<_, UserModel>(&format!(
            r"
            SELECT {USER_COLUMNS} FROM users
            WHERE deleted_at IS NULL
              AND ($1::TEXT IS NULL OR name ILIKE $1 OR email ILIKE $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(pattern.as_deref())
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Page::new(map_rows(rows)?, total, page))
    }

    #[instrument(skip(self, password_hash))]
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, name, email, password_hash, phone, address, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.name)
        .bind(&user.email)
        .bind(password_hash)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::EmailAlreadyExists))?;

        Ok(())
    }

    #[instrument(skip(self, user, password_hash), fields(user_id = %user.id))]
    async fn update(&self, user: &User, password_hash: Option<&str>) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET name = $2, email = $3, phone = $4, address = $5,
                password_hash = COALESCE($6, password_hash), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.address)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::EmailAlreadyExists))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(user.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn hard_delete(&self, id: Snowflake) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // same lock order as a unit of work: transaction rows, then items
        sqlx::query(
            "SELECT id FROM transactions WHERE buyer_id = $1 AND status = 'pending' FOR UPDATE",
        )
        .bind(id.into_inner())
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;

        // open purchases die with the buyer; their items go back on sale
        sqlx::query(
            r"
            UPDATE items
            SET status = 'available', version = version + 1, updated_at = NOW()
            WHERE status = 'sold' AND deleted_at IS NULL
              AND id IN (SELECT item_id FROM transactions
                         WHERE buyer_id = $1 AND status = 'pending')
            ",
        )
        .bind(id.into_inner())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        // items, transactions and chats follow through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(id));
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_password_hash(&self, id: Snowflake) -> RepoResult<Option<String>> {
        sqlx::query_scalar::<_, String>(
            r"
            SELECT password_hash FROM users WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
