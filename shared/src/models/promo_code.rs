//! Promo Code Model

use serde::{Deserialize, Serialize};

/// Promotional discount code. `usage_count` is incremented exactly once per
/// confirmed order that carried the code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PromoCode {
    pub id: i64,
    pub code: String,
    pub discount_percent: f64,
    pub usage_count: i64,
    pub is_active: bool,
    pub created_at: i64,
}
