//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    CreateItemRequest, CreateTransactionRequest, LoginRequest, RefreshTokenRequest,
    RegisterRequest, SendChatRequest, UpdateItemRequest, UpdateItemStatusRequest,
    UpdateTransactionStatusRequest, UpdateUserRequest,
};

pub use responses::{
    ApiResponse, AuthResponse, ChatResponse, CurrentUserResponse, HealthChecks, HealthResponse,
    ImageUploadResponse, ItemResponse, ItemSummary, PaginatedResponse, PaginationMeta,
    ReadinessResponse, TransactionResponse, UserResponse,
};

pub use mappers::TransactionWithItem;
