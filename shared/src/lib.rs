//! Shared types for the Petal storefront backend
//!
//! Data models and DTOs used by the store server and its admin shell.
//! DB row types are feature-gated behind `db` so API-only consumers
//! don't pull in sqlx.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
