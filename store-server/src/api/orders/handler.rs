//! Storefront order API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::order;
use crate::utils::AppResult;
use shared::models::{Order, OrderCreate, OrderItem};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order_id: i64,
    /// None until the payment is confirmed (online orders)
    pub order_number: Option<i64>,
    pub message: String,
}

/// POST /api/orders - create an order from the storefront cart
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<CreateOrderResponse>> {
    let created = state.orders.create_order(payload).await?;

    let message = if created.order_number.is_some() {
        "Order placed successfully".to_string()
    } else {
        "Order created, awaiting payment".to_string()
    };

    Ok(Json(CreateOrderResponse {
        success: true,
        order_id: created.order_id,
        order_number: created.order_number,
        message,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOrdersQuery {
    pub user_id: i64,
}

/// Order with its line items, as the storefront order history renders it
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// GET /api/orders?userId=xxx - order history for a customer
pub async fn list_by_user(
    State(state): State<ServerState>,
    Query(query): Query<UserOrdersQuery>,
) -> AppResult<Json<Vec<OrderWithItems>>> {
    let orders = order::find_by_user(&state.db.pool, query.user_id).await?;

    let mut detailed = Vec::with_capacity(orders.len());
    for order_row in orders {
        let items = order::items_for_order(&state.db.pool, order_row.id).await?;
        detailed.push(OrderWithItems {
            order: order_row,
            items,
        });
    }

    Ok(Json(detailed))
}
