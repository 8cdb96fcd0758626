//! Order Model
//!
//! Orders and line items. Line item `price` is the line total at purchase
//! time (unit price x quantity), a deliberate snapshot decoupled from the
//! live catalog price.

use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Order fulfilment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(
    feature = "db",
    derive(sqlx::Type),
    sqlx(rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
    Shipped,
    OutForDelivery,
    Delivered,
    Rto,
    RtoDelivered,
}

impl OrderStatus {
    /// Terminal states a shipment can no longer move out of
    pub fn is_shipping_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered
                | OrderStatus::RtoDelivered
                | OrderStatus::Cancelled
                | OrderStatus::Completed
        )
    }
}

/// Payment status. SUCCESSFUL is only ever set by the gateway confirmation
/// callback (or never, for COD until collection).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(
    feature = "db",
    derive(sqlx::Type),
    sqlx(rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Successful,
    Failed,
}

/// Payment method. Legacy storefront builds send `ONLINE` or lowercase
/// gateway names; accept them as aliases on input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(
    feature = "db",
    derive(sqlx::Type),
    sqlx(rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[serde(alias = "cod")]
    Cod,
    #[serde(alias = "razorpay", alias = "ONLINE", alias = "online")]
    Razorpay,
    #[serde(alias = "phonepe")]
    Phonepe,
}

impl PaymentMethod {
    pub fn is_cod(&self) -> bool {
        matches!(self, PaymentMethod::Cod)
    }
}

// =============================================================================
// Entities
// =============================================================================

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    /// Linked account; guest checkouts carry only the direct identity fields
    pub user_id: Option<i64>,
    pub customer_name: String,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub total: f64,
    pub shipping_fee: f64,
    pub discount_amount: f64,
    pub promo_code: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    /// Serialized [`ShippingInfo`] JSON
    pub address: String,
    pub awb_number: Option<String>,
    pub shipping_provider: Option<String>,
    pub shipping_status: Option<String>,
    pub tracking_url: Option<String>,
    pub shipped_at: Option<i64>,
    pub delivered_at: Option<i64>,
    pub estimated_delivery: Option<i64>,
    pub last_tracking_sync: Option<i64>,
    /// Human-facing sequential number, null until the order is confirmed
    pub order_number: Option<i64>,
    pub created_at: i64,
}

/// Order line item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Line total at time of purchase (unit price x quantity)
    pub price: f64,
}

// =============================================================================
// DTOs
// =============================================================================

/// A cart line as held by the storefront client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product id
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub quantity: i64,
    /// Unit price snapshot
    pub price: f64,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image: Option<String>,
    pub slug: Option<String>,
}

/// Shipping address block captured at checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Create order payload (`POST /api/orders` and payment initiation)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    pub cart: Vec<CartLine>,
    pub shipping_info: ShippingInfo,
    pub user_id: Option<i64>,
    pub total: f64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub shipping_fee: f64,
    #[serde(default)]
    pub discount_amount: f64,
    pub promo_code: Option<String>,
}
