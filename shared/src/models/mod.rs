//! Data models
//!
//! Shared between store-server and the storefront/admin shell (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are UTC millis.

pub mod checkout;
pub mod order;
pub mod product;
pub mod promo_code;

// Re-exports
pub use checkout::*;
pub use order::*;
pub use product::*;
pub use promo_code::*;
