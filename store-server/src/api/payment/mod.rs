//! Online payment API module

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payment", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/initiate", post(handler::initiate))
        .route("/confirm", post(handler::confirm))
}
