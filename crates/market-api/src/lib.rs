//! # market-api
//!
//! REST API server built with Axum.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{
    create_app, create_app_state, create_app_with_config, create_app_with_uploads, run,
};
pub use state::AppState;
