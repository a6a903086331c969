//! PostgreSQL implementation of ChatRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use market_core::entities::ChatMessage;
use market_core::error::DomainError;
use market_core::traits::{ChatRepository, RepoResult};
use market_core::value_objects::{Page, PageRequest, Snowflake};

use crate::models::ChatModel;

use super::error::map_db_error;

const CHAT_COLUMNS: &str = "id, sender_id, receiver_id, item_id, body, is_read, sent_at";

/// PostgreSQL implementation of ChatRepository
#[derive(Clone)]
pub struct PgChatRepository {
    pool: PgPool,
}

impl PgChatRepository {
    /// Create a new PgChatRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatRepository for PgChatRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<ChatMessage>> {
        let result = sqlx::query_as::<_, ChatModel>(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ChatMessage::from))
    }

    #[instrument(skip(self, message), fields(chat_id = %message.id))]
    async fn create(&self, message: &ChatMessage) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO chats (id, sender_id, receiver_id, item_id, body, is_read, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(message.id.into_inner())
        .bind(message.sender_id.into_inner())
        .bind(message.receiver_id.into_inner())
        .bind(message.item_id.into_inner())
        .bind(&message.body)
        .bind(message.is_read)
        .bind(message.sent_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_for_item(&self, item_id: Snowflake, page: PageRequest) -> RepoResult<Page<ChatMessage>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM chats WHERE item_id = $1")
            .bind(item_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let rows = sqlx::query_as::<_, ChatModel>(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats WHERE item_id = $1 \
             ORDER BY sent_at DESC, id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(item_id.into_inner())
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Page::new(rows.into_iter().map(ChatMessage::from).collect(), total, page))
    }

    #[instrument(skip(self))]
    async fn conversation(
        &self,
        user_a: Snowflake,
        user_b: Snowflake,
        item_id: Snowflake,
        page: PageRequest,
    ) -> RepoResult<Page<ChatMessage>> {
        let filter = r"
            WHERE item_id = $1
              AND ((sender_id = $2 AND receiver_id = $3) OR (sender_id = $3 AND receiver_id = $2))
        ";

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM chats {filter}"))
            .bind(item_id.into_inner())
            .bind(user_a.into_inner())
            .bind(user_b.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let rows = sqlx::query_as::<_, ChatModel>(&format!(
            "SELECT {CHAT_COLUMNS} FROM chats {filter} \
             ORDER BY sent_at ASC, id ASC LIMIT $4 OFFSET $5"
        ))
        .bind(item_id.into_inner())
        .bind(user_a.into_inner())
        .bind(user_b.into_inner())
        .bind(i64::from(page.limit()))
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(Page::new(rows.into_iter().map(ChatMessage::from).collect(), total, page))
    }

    #[instrument(skip(self))]
    async fn mark_conversation_read(
        &self,
        reader_id: Snowflake,
        sender_id: Snowflake,
        item_id: Snowflake,
    ) -> RepoResult<u64> {
        let result = sqlx::query(
            r"
            UPDATE chats SET is_read = TRUE
            WHERE item_id = $1 AND receiver_id = $2 AND sender_id = $3 AND NOT is_read
            ",
        )
        .bind(item_id.into_inner())
        .bind(reader_id.into_inner())
        .bind(sender_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("UPDATE chats SET is_read = TRUE WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ChatNotFound(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn partners(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r"
            SELECT receiver_id FROM chats WHERE sender_id = $1
            UNION
            SELECT sender_id FROM chats WHERE receiver_id = $1
            ORDER BY 1
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ids.into_iter().map(Snowflake::new).collect())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM chats WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ChatNotFound(id));
        }

        Ok(())
    }
}
