//! Route handlers, one module per resource

pub mod auth;
pub mod chats;
pub mod health;
pub mod items;
pub mod transactions;
pub mod users;
