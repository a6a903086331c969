//! Item service
//!
//! Listing lifecycle and ownership checks. Every status write goes through
//! a compare-and-swap on the item's `(status, version)`, so a racing
//! purchase or a second owner edit surfaces as a conflict instead of being
//! silently overwritten.

use market_common::AppError;
use market_core::entities::{Item, ItemChanges, ItemDraft};
use market_core::traits::ItemQuery;
use market_core::{Caller, DomainError, ItemStatus, PageRequest, Snowflake};
use tracing::instrument;
use validator::Validate;

use crate::dto::{
    CreateItemRequest, ImageUploadResponse, ItemResponse, PaginatedResponse, UpdateItemRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Item service
pub struct ItemService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ItemService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// List a new item owned by the caller
    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        caller: Caller,
        request: CreateItemRequest,
    ) -> ServiceResult<ItemResponse> {
        request.validate()?;
        let draft = ItemDraft::parse(
            &request.title,
            request.price,
            &request.category,
            request.description.as_deref(),
        )?;

        let item = Item::list(self.ctx.generate_id(), caller.user_id, draft);
        self.ctx.item_repo().create(&item).await?;

        Ok(ItemResponse::from(item))
    }

    /// Public read
    #[instrument(skip(self))]
    pub async fn get(&self, item_id: Snowflake) -> ServiceResult<ItemResponse> {
        self.load(item_id).await.map(ItemResponse::from)
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        query: ItemQuery,
        page: PageRequest,
    ) -> ServiceResult<PaginatedResponse<ItemResponse>> {
        let page = self.ctx.item_repo().list(&query, page).await?;
        Ok(PaginatedResponse::from_page(page, ItemResponse::from))
    }

    /// Every live item of one seller, any status
    #[instrument(skip(self))]
    pub async fn list_by_owner(
        &self,
        owner_id: Snowflake,
        page: PageRequest,
    ) -> ServiceResult<PaginatedResponse<ItemResponse>> {
        let page = self.ctx.item_repo().list_by_owner(owner_id, page).await?;
        Ok(PaginatedResponse::from_page(page, ItemResponse::from))
    }

    /// Partial update of descriptive fields; owner only.
    /// Status and image are never touched here.
    #[instrument(skip(self, request))]
    pub async fn update_fields(
        &self,
        caller: Caller,
        item_id: Snowflake,
        request: UpdateItemRequest,
    ) -> ServiceResult<ItemResponse> {
        request.validate()?;
        let mut item = self.load(item_id).await?;
        ensure_owner(&item, caller)?;

        let changes = ItemChanges {
            title: request.title,
            price: request.price,
            category: request.category,
            description: request.description,
        };
        if changes.apply(&mut item)? {
            self.ctx.item_repo().update_details(&item).await?;
        }

        Ok(ItemResponse::from(item))
    }

    /// Owner sets any status directly. This is the manual correction path;
    /// transaction-driven flips happen inside the transaction service.
    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        caller: Caller,
        item_id: Snowflake,
        status: &str,
    ) -> ServiceResult<ItemResponse> {
        let next: ItemStatus = status.parse()?;
        let mut item = self.load(item_id).await?;
        ensure_owner(&item, caller)?;

        let availability = self
            .ctx
            .item_repo()
            .compare_and_set_status(item_id, item.availability(), next)
            .await?;
        item.set_availability(availability);

        Ok(ItemResponse::from(item))
    }

    /// Soft delete by the owner, or by anyone holding the admin role
    #[instrument(skip(self))]
    pub async fn delete(&self, caller: Caller, item_id: Snowflake) -> ServiceResult<()> {
        let item = self.load(item_id).await?;
        if !item.is_owned_by(caller.user_id) && !caller.is_admin() {
            return Err(DomainError::NotItemOwner.into());
        }

        self.ctx
            .item_repo()
            .soft_delete(item_id, item.availability())
            .await?;
        Ok(())
    }

    /// Remove the row and everything hanging off it; admin only
    #[instrument(skip(self))]
    pub async fn hard_delete(&self, caller: Caller, item_id: Snowflake) -> ServiceResult<()> {
        if !caller.is_admin() {
            return Err(DomainError::AdminOnly.into());
        }
        self.ctx.item_repo().hard_delete(item_id).await?;
        Ok(())
    }

    /// Store an image for the item and point `image_url` at it; owner only.
    ///
    /// If the item cannot be updated the stored object is removed again. When
    /// that removal fails too the error is a storage error naming the key.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn upload_image(
        &self,
        caller: Caller,
        item_id: Snowflake,
        content_type: &str,
        data: Vec<u8>,
    ) -> ServiceResult<ImageUploadResponse> {
        let item = self.load(item_id).await?;
        ensure_owner(&item, caller)?;

        let limits = self.ctx.upload_limits();
        if !limits.allows(content_type) {
            return Err(AppError::UnsupportedMediaType(content_type.to_string()).into());
        }
        if data.is_empty() {
            return Err(ServiceError::validation("image file is empty"));
        }
        if data.len() > limits.max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "image exceeds {} bytes",
                limits.max_bytes
            ))
            .into());
        }

        let key = format!(
            "items/{item_id}/{}.{}",
            self.ctx.generate_id(),
            extension_for(content_type)
        );
        let stored = self.ctx.image_store().put(&key, content_type, data).await?;

        if let Err(e) = self.ctx.item_repo().set_image_url(item_id, &stored.url).await {
            return Err(match self.ctx.image_store().delete(&stored.key).await {
                Ok(()) => e.into(),
                Err(cleanup) => AppError::Storage(format!(
                    "{e}; stored object {} was left behind: {cleanup}",
                    stored.key
                ))
                .into(),
            });
        }

        Ok(ImageUploadResponse {
            item_id: item_id.to_string(),
            image_url: stored.url,
        })
    }

    async fn load(&self, item_id: Snowflake) -> ServiceResult<Item> {
        self.ctx
            .item_repo()
            .find_by_id(item_id)
            .await?
            .ok_or_else(|| DomainError::ItemNotFound(item_id).into())
    }
}

fn ensure_owner(item: &Item, caller: Caller) -> ServiceResult<()> {
    if item.is_owned_by(caller.user_id) {
        Ok(())
    } else {
        Err(DomainError::NotItemOwner.into())
    }
}

/// File extension for an accepted image content type
fn extension_for(content_type: &str) -> &'static str {
    match content_type.to_ascii_lowercase().as_str() {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        _ => "bin",
    }
}
