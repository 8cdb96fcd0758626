//! Abandoned checkout sync API module

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/checkout", routes())
}

fn routes() -> Router<ServerState> {
    Router::new().route("/abandoned", post(handler::sync))
}
