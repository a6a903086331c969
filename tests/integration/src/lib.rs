//! End-to-end helpers for the marketplace API
//!
//! Tests spawn a real server on an ephemeral port over PostgreSQL and talk
//! to it with `reqwest`.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
