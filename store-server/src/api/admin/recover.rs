//! Abandoned cart recovery handler

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::checkout;
use crate::notify::{NotifyError, NotifyTask, RecoveryChannel};
use crate::utils::{AppError, AppResponse, AppResult};
use shared::models::{AbandonedCheckout, CheckoutItem, CheckoutStatus};

#[derive(Deserialize)]
pub struct CartListQuery {
    pub status: Option<CheckoutStatus>,
}

/// Snapshot with the stored items JSON expanded for the admin table
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    #[serde(flatten)]
    pub checkout: AbandonedCheckout,
    pub items: Vec<CheckoutItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartList {
    pub carts: Vec<CartView>,
    pub total: i64,
}

/// GET /api/admin/abandoned-carts - snapshots awaiting recovery
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<CartListQuery>,
) -> AppResult<Json<AppResponse<CartList>>> {
    let status = query.status.unwrap_or(CheckoutStatus::Outstanding);
    let rows = checkout::list_by_status(&state.db.pool, status).await?;
    let total = checkout::count(&state.db.pool).await?;

    let carts = rows
        .into_iter()
        .map(|checkout| {
            let items = checkout.items();
            CartView { checkout, items }
        })
        .collect();

    Ok(Json(AppResponse::success(CartList { carts, total })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverRequest {
    pub checkout_id: i64,
    #[serde(rename = "type")]
    pub channel: RecoveryChannel,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverResponse {
    pub success: bool,
    pub message: String,
}

/// POST /api/admin/abandoned-carts/recover - send a recovery nudge
///
/// The send is awaited here (unlike storefront notifications) so the admin
/// sees delivery failures. `recovery_sent_at` is only stamped after a
/// successful send.
pub async fn send(
    State(state): State<ServerState>,
    Json(payload): Json<RecoverRequest>,
) -> AppResult<Json<RecoverResponse>> {
    let snapshot = checkout::find_by_id(&state.db.pool, payload.checkout_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("Checkout {} not found", payload.checkout_id))
        })?;

    let to = match payload.channel {
        RecoveryChannel::Whatsapp => snapshot
            .customer_phone
            .clone()
            .ok_or_else(|| AppError::validation("Checkout has no phone number"))?,
        RecoveryChannel::Email => snapshot
            .customer_email
            .clone()
            .ok_or_else(|| AppError::validation("Checkout has no email address"))?,
    };

    let resume_link = format!(
        "{}/cart?checkout={}",
        state.config.store_base_url, snapshot.id
    );

    state
        .notifier
        .deliver(NotifyTask::Recovery {
            channel: payload.channel,
            to,
            customer_name: snapshot
                .customer_name
                .clone()
                .unwrap_or_else(|| "there".to_string()),
            total: snapshot.total,
            resume_link,
        })
        .await
        .map_err(|e| match e {
            NotifyError::Config(msg) => AppError::validation(msg),
            other => AppError::upstream(other.to_string()),
        })?;

    checkout::mark_recovery_sent(&state.db.pool, snapshot.id).await?;
    tracing::info!(checkout_id = snapshot.id, channel = ?payload.channel, "Recovery message sent");

    Ok(Json(RecoverResponse {
        success: true,
        message: "Recovery message sent".to_string(),
    }))
}
