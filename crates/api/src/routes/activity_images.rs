use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use lodge_site_core::activity::{ActivityImage, ActivityImageUpdate, NewActivityImage};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::admin_session::AdminSession;
use crate::state::AppState;

/// Admin management of gallery and attraction cards.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/api/activity-images", get(list_images).post(create_image))
        .route("/admin/api/activity-images/reorder", post(reorder_images))
        .route(
            "/admin/api/activity-images/{id}",
            put(update_image).delete(delete_image),
        )
}

async fn list_images(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> ApiResult<Json<Vec<ActivityImage>>> {
    Ok(Json(state.images().list_images(None).await?))
}

async fn create_image(
    State(state): State<AppState>,
    _admin: AdminSession,
    Json(new): Json<NewActivityImage>,
) -> ApiResult<(StatusCode, Json<ActivityImage>)> {
    if new.key.trim().is_empty() || new.image_url.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "key and image_url must not be empty".to_string(),
        ));
    }
    let image = state.images().create_image(new).await?;
    tracing::info!(key = %image.key, "activity image created");
    Ok((StatusCode::CREATED, Json(image)))
}

async fn update_image(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
    Json(update): Json<ActivityImageUpdate>,
) -> ApiResult<Json<ActivityImage>> {
    Ok(Json(state.images().update_image(id, update).await?))
}

async fn delete_image(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if state.images().delete_image(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("activity image {id}")))
    }
}

#[derive(Debug, Deserialize)]
struct ReorderRequest {
    ids: Vec<Uuid>,
}

async fn reorder_images(
    State(state): State<AppState>,
    _admin: AdminSession,
    Json(request): Json<ReorderRequest>,
) -> ApiResult<StatusCode> {
    state.images().reorder_images(&request.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}
