//! Admin order list and status handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::order::{self, AdminListFilter};
use crate::utils::{AppResponse, AppResult};
use shared::models::{Order, OrderStatus};

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub status: Option<OrderStatus>,
    /// Matches order number, customer name, email or phone
    pub search: Option<String>,
    /// When true, restrict to unconfirmed online orders (abandoned view)
    #[serde(default)]
    pub abandoned: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// GET /api/admin/orders - paginated back-office order list
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<AppResponse<OrderPage>>> {
    let filter = AdminListFilter {
        page: query.page,
        limit: query.limit,
        status: query.status,
        search: query.search,
        abandoned: query.abandoned,
    };

    let (orders, total) = order::admin_list(&state.db.pool, &filter).await?;

    Ok(Json(AppResponse::success(OrderPage {
        orders,
        total,
        page: filter.page.max(1),
        limit: filter.limit.clamp(1, 100),
    })))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// PUT /api/admin/orders/:id/status - manual status override
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<AppResponse<Order>>> {
    let updated = order::update_status(&state.db.pool, id, payload.status).await?;
    tracing::info!(order_id = id, status = ?updated.status, "Order status updated by admin");
    Ok(Json(AppResponse::success(updated)))
}
