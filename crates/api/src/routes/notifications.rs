use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use lodge_site_core::events::Notification;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::admin_session::AdminSession;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/api/notifications", get(list_notifications))
        .route("/admin/api/notifications/{id}", delete(dismiss_notification))
}

async fn list_notifications(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> Json<Vec<Notification>> {
    Json(state.notifications().list())
}

async fn dismiss_notification(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.notifications().dismiss(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("notification {id}")))
    }
}
