//! Health check handlers

use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::store::StoreStatus;
use crate::AppState;

/// A remote fallback within this window reports the service as degraded
const DEGRADED_WINDOW_MINUTES: i64 = 5;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub storage: StoreStatus,
}

#[derive(Serialize)]
pub struct PingResponse {
    pub message: String,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let storage = state.store.status().await;

    let recent_fallback = storage
        .last_fallback_at
        .is_some_and(|at| Utc::now() - at < Duration::minutes(DEGRADED_WINDOW_MINUTES));
    let status = if recent_fallback {
        "degraded"
    } else {
        "healthy"
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage,
    })
}

pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        message: "Hello from the Kariyad weather station".to_string(),
    })
}
