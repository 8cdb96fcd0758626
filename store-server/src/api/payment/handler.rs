//! Online payment API Handlers
//!
//! `initiate` persists a PENDING order before touching the gateway. When the
//! gateway call fails, the order (items, stock) is rolled back with a
//! compensating delete so a failed initiation leaves nothing behind.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::order;
use crate::payment::PaymentSession;
use crate::utils::{AppError, AppResult};
use shared::models::OrderCreate;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateResponse {
    pub success: bool,
    pub order_id: i64,
    #[serde(flatten)]
    pub session: PaymentSession,
}

/// POST /api/payment/initiate - create a pending order and open a gateway session
pub async fn initiate(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<InitiateResponse>> {
    let method = payload.payment_method;
    let Some(gateway) = state.payment.gateway_for(method) else {
        return Err(AppError::validation(
            "COD orders do not require payment initiation",
        ));
    };
    let gateway = gateway.clone();

    let created = state.orders.create_order(payload).await?;
    let order_id = created.order_id;

    let pending = order::find_by_id(&state.db.pool, order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

    match gateway.create_session(&pending).await {
        Ok(session) => Ok(Json(InitiateResponse {
            success: true,
            order_id,
            session,
        })),
        Err(e) => {
            // Undo the pending order so stock and order counts are untouched
            if let Err(del) = order::delete(&state.db.pool, order_id).await {
                tracing::error!(order_id, error = %del, "Failed to roll back order after gateway error");
            }
            tracing::warn!(order_id, gateway = ?method, error = %e, "Payment initiation failed");
            Err(AppError::upstream(format!("Payment initiation failed: {e}")))
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub order_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResponse {
    pub success: bool,
    pub order_id: i64,
    pub order_number: Option<i64>,
    pub message: String,
}

/// POST /api/payment/confirm - gateway callback marking the payment successful
///
/// Idempotent: repeated callbacks for the same order return the already
/// assigned order number.
pub async fn confirm(
    State(state): State<ServerState>,
    Json(payload): Json<ConfirmRequest>,
) -> AppResult<Json<ConfirmResponse>> {
    let confirmed = state.orders.confirm_payment(payload.order_id).await?;

    Ok(Json(ConfirmResponse {
        success: true,
        order_id: confirmed.id,
        order_number: confirmed.order_number,
        message: "Payment confirmed".to_string(),
    }))
}
