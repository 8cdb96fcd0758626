//! Abandoned Checkout Model
//!
//! Server-side mirror of an in-progress cart, used for recovery marketing.
//! At most one row is actively tracked per browser session, identified by a
//! client-stored id; repeated syncs update the same row.

use serde::{Deserialize, Serialize};

/// Channel the cart snapshot came in through
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(
    feature = "db",
    derive(sqlx::Type),
    sqlx(rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutSource {
    #[default]
    #[serde(alias = "cart")]
    Cart,
    #[serde(alias = "whatsapp")]
    Whatsapp,
    #[serde(alias = "instagram")]
    Instagram,
    Other,
}

/// Outstanding until a recovery message is followed by a confirmed order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(
    feature = "db",
    derive(sqlx::Type),
    sqlx(rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutStatus {
    Outstanding,
    Recovered,
}

/// Minimal item snapshot stored inside the checkout row (JSON column)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
    pub price: f64,
}

/// Abandoned checkout entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct AbandonedCheckout {
    pub id: i64,
    pub user_id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    /// JSON-serialized `Vec<CheckoutItem>`
    pub items_json: String,
    pub total: f64,
    pub source: CheckoutSource,
    /// Best-effort IP geolocation, blank when the lookup failed
    pub city: Option<String>,
    pub country: Option<String>,
    pub status: CheckoutStatus,
    pub recovery_sent_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl AbandonedCheckout {
    pub fn items(&self) -> Vec<CheckoutItem> {
        serde_json::from_str(&self.items_json).unwrap_or_default()
    }
}

/// Upsert payload (`POST /api/checkout/abandoned`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSync {
    /// Client-persisted id; absent on the first sync of a session
    pub checkout_id: Option<i64>,
    pub user_id: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub cart_items: Vec<CheckoutItem>,
    pub total: f64,
    pub city: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub source: CheckoutSource,
}
