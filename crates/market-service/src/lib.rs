//! # market-service
//!
//! Application layer: marketplace use cases, authorization and DTOs.

pub mod dto;
pub mod services;

pub use services::{
    AuthService, ChatService, ErrorKind, ItemService, ServiceContext, ServiceContextBuilder,
    ServiceError, ServiceResult, TransactionService, UploadLimits, UserService,
    CONVERSATION_PAGE_SIZE,
};
