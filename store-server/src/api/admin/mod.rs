//! Back-office admin API module

mod orders;
mod recover;
mod tracking;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/orders", get(orders::list))
        .route("/orders/{id}/status", put(orders::update_status))
        .route(
            "/orders/tracking",
            get(tracking::sync_single).post(tracking::sync_batch),
        )
        .route("/abandoned-carts", get(recover::list))
        .route("/abandoned-carts/recover", post(recover::send))
}
