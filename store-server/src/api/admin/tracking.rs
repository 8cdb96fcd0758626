//! Admin tracking reconciliation handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::order;
use crate::shipping::{BatchSyncResult, TrackingView};
use crate::utils::{AppError, AppResponse, AppResult};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingQuery {
    pub order_id: Option<i64>,
    pub awb: Option<String>,
}

/// GET /api/admin/orders/tracking?orderId=xxx (or ?awb=xxx)
///
/// Pulls live carrier status for one order. When the carrier is down the
/// previously synced fields come back with `cached: true`.
pub async fn sync_single(
    State(state): State<ServerState>,
    Query(query): Query<TrackingQuery>,
) -> AppResult<Json<AppResponse<TrackingView>>> {
    let found = match (query.order_id, query.awb.as_deref()) {
        (Some(id), _) => order::find_by_id(&state.db.pool, id).await?,
        (None, Some(awb)) => order::find_by_awb(&state.db.pool, awb).await?,
        (None, None) => {
            return Err(AppError::validation("orderId or awb is required"));
        }
    };

    let tracked = found.ok_or_else(|| AppError::not_found("Order not found"))?;
    let view = state.shipping.sync_order(&state.db.pool, &tracked).await?;

    Ok(Json(AppResponse::success(view)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub synced: usize,
    pub failed: usize,
    pub results: Vec<BatchSyncResult>,
}

/// POST /api/admin/orders/tracking - reconcile every trackable order
pub async fn sync_batch(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<BatchSummary>>> {
    let results = state.shipping.sync_all(&state.db.pool).await?;

    let synced = results.iter().filter(|r| r.success).count();
    let failed = results.len() - synced;
    tracing::info!(synced, failed, "Batch tracking sync finished");

    Ok(Json(AppResponse::success(BatchSummary {
        synced,
        failed,
        results,
    })))
}
