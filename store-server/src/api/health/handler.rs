//! Health API Handlers

use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::AppResult;
use shared::util::now_millis;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: i64,
}

/// GET /health - liveness probe
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: now_millis(),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealth {
    pub status: &'static str,
    pub version: &'static str,
    pub environment: String,
    pub timestamp: i64,
    pub database: DatabaseHealth,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub reachable: bool,
    pub latency_ms: i64,
}

/// GET /health/detailed - readiness probe with a database ping
pub async fn health_detailed(State(state): State<ServerState>) -> AppResult<Json<DetailedHealth>> {
    let started = now_millis();
    let reachable = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.db.pool)
        .await
        .is_ok();

    Ok(Json(DetailedHealth {
        status: if reachable { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        timestamp: now_millis(),
        database: DatabaseHealth {
            reachable,
            latency_ms: now_millis() - started,
        },
    }))
}
