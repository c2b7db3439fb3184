use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/ping", get(ping))
}

/// Full health check: content store reachability plus image storage state.
async fn health_check(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.content().ping().await.map_err(|e| {
        ApiError::Unavailable(format!("content store health check failed: {e}"))
    })?;

    Ok(Json(json!({
        "status": "ok",
        "database": "connected",
        "imageStorage": if state.uploader().is_online() { "online" } else { "offline" },
        "subscribers": state.event_bus().subscriber_count(),
    })))
}

/// Lightweight ping, no store check.
async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
