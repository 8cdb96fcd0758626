//! Product Model

use serde::{Deserialize, Serialize};

/// Catalog product. The order flow only reads name/price and decrements
/// `quantity`; everything else belongs to the catalog screens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: f64,
    pub origin_price: Option<f64>,
    /// On-hand stock, decremented on order creation
    pub quantity: i64,
    pub thumbnail: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create product payload (admin catalog)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    pub slug: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: f64,
    pub origin_price: Option<f64>,
    pub quantity: i64,
    pub thumbnail: Option<String>,
}
