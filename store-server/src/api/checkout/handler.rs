//! Abandoned checkout API Handlers

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::repository::checkout;
use crate::utils::{AppError, AppResult};
use shared::models::CheckoutSync;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    /// Stable snapshot id; the storefront echoes it back on the next sync
    pub id: i64,
}

/// First `X-Forwarded-For` hop, or none for direct connections
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// POST /api/checkout/abandoned - upsert a cart snapshot from the storefront
///
/// Geolocation is best-effort: a missing or failing IP lookup never fails
/// the sync, the snapshot just lands without city/country.
pub async fn sync(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(payload): Json<CheckoutSync>,
) -> AppResult<Json<SyncResponse>> {
    if payload.cart_items.is_empty() {
        return Err(AppError::validation("Cart items are required"));
    }

    let mut city = payload.city.clone();
    let mut country = payload.country.clone();
    if city.is_none() && country.is_none() {
        if let Some(ip) = client_ip(&headers) {
            if let Some(geo) = state.geo.lookup(&ip).await {
                city = geo.city;
                country = geo.country;
            }
        }
    }

    let id = checkout::upsert(&state.db.pool, &payload, city, country).await?;

    Ok(Json(SyncResponse { success: true, id }))
}
