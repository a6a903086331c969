//! Chat service
//!
//! Item-scoped messages between a listing's owner and one counterpart.
//! Ownership is re-read on every send; nothing about the item is cached.

use market_core::entities::ChatMessage;
use market_core::{Caller, DomainError, PageRequest, Snowflake};
use tracing::instrument;
use validator::Validate;

use crate::dto::{ChatResponse, PaginatedResponse, SendChatRequest, UserResponse};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Default page size when reading a conversation
pub const CONVERSATION_PAGE_SIZE: u32 = 20;

/// Chat service
pub struct ChatService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChatService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Send a message about an item. One side must own the item.
    #[instrument(skip(self, request))]
    pub async fn send(&self, caller: Caller, request: SendChatRequest) -> ServiceResult<ChatResponse> {
        request.validate()?;
        let message = ChatMessage::compose(
            self.ctx.generate_id(),
            caller.user_id,
            request.receiver_id,
            request.item_id,
            &request.body,
        )?;

        if self.ctx.user_repo().find_by_id(request.receiver_id).await?.is_none() {
            return Err(DomainError::UserNotFound(request.receiver_id).into());
        }
        let item = self
            .ctx
            .item_repo()
            .find_by_id(request.item_id)
            .await?
            .ok_or(DomainError::ItemNotFound(request.item_id))?;

        if !item.is_owned_by(caller.user_id) && !item.is_owned_by(request.receiver_id) {
            return Err(DomainError::ChatNotPermitted.into());
        }

        self.ctx.chat_repo().create(&message).await?;
        Ok(ChatResponse::from(message))
    }

    /// Sender or receiver only
    #[instrument(skip(self))]
    pub async fn get(&self, caller: Caller, chat_id: Snowflake) -> ServiceResult<ChatResponse> {
        let message = self.load(chat_id).await?;
        if !message.involves(caller.user_id) {
            return Err(DomainError::NotChatParticipant.into());
        }
        Ok(ChatResponse::from(message))
    }

    /// Every message about an item, newest first; item owner only
    #[instrument(skip(self))]
    pub async fn list_for_item(
        &self,
        caller: Caller,
        item_id: Snowflake,
        page: PageRequest,
    ) -> ServiceResult<PaginatedResponse<ChatResponse>> {
        let item = self
            .ctx
            .item_repo()
            .find_by_id(item_id)
            .await?
            .ok_or(DomainError::ItemNotFound(item_id))?;
        if !item.is_owned_by(caller.user_id) {
            return Err(DomainError::NotItemOwner.into());
        }

        let page = self.ctx.chat_repo().list_for_item(item_id, page).await?;
        Ok(PaginatedResponse::from_page(page, ChatResponse::from))
    }

    /// Both directions between the caller and `other` about one item,
    /// oldest first. Messages addressed to the caller are marked read.
    #[instrument(skip(self))]
    pub async fn conversation(
        &self,
        caller: Caller,
        other: Snowflake,
        item_id: Snowflake,
        page: PageRequest,
    ) -> ServiceResult<PaginatedResponse<ChatResponse>> {
        self.ctx
            .chat_repo()
            .mark_conversation_read(caller.user_id, other, item_id)
            .await?;
        let page = self
            .ctx
            .chat_repo()
            .conversation(caller.user_id, other, item_id, page)
            .await?;
        Ok(PaginatedResponse::from_page(page, ChatResponse::from))
    }

    /// Users the caller has exchanged messages with
    #[instrument(skip(self))]
    pub async fn partners(&self, caller: Caller) -> ServiceResult<Vec<UserResponse>> {
        let ids = self.ctx.chat_repo().partners(caller.user_id).await?;
        let mut partners = Vec::with_capacity(ids.len());
        for id in ids {
            // deleted accounts drop out of the list
            if let Some(user) = self.ctx.user_repo().find_by_id(id).await? {
                partners.push(UserResponse::from(&user));
            }
        }
        Ok(partners)
    }

    /// Receiver only
    #[instrument(skip(self))]
    pub async fn mark_read(&self, caller: Caller, chat_id: Snowflake) -> ServiceResult<ChatResponse> {
        let mut message = self.load(chat_id).await?;
        if message.receiver_id != caller.user_id {
            return Err(DomainError::NotChatParticipant.into());
        }
        if !message.is_read {
            self.ctx.chat_repo().mark_read(chat_id).await?;
            message.is_read = true;
        }
        Ok(ChatResponse::from(message))
    }

    /// Sender only
    #[instrument(skip(self))]
    pub async fn delete(&self, caller: Caller, chat_id: Snowflake) -> ServiceResult<()> {
        let message = self.load(chat_id).await?;
        if message.sender_id != caller.user_id {
            return Err(DomainError::NotChatParticipant.into());
        }
        self.ctx.chat_repo().delete(chat_id).await?;
        Ok(())
    }

    async fn load(&self, chat_id: Snowflake) -> ServiceResult<ChatMessage> {
        self.ctx
            .chat_repo()
            .find_by_id(chat_id)
            .await?
            .ok_or_else(|| DomainError::ChatNotFound(chat_id).into())
    }
}
