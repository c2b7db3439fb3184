use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lodge_site_core::media::{
    ImageUpload, PendingUpload, RecoveredUpload, StoredImage, UploadOutcome,
};
use serde::Serialize;
use tower_http::limit::RequestBodyLimitLayer;

use crate::error::{ApiError, ApiResult};
use crate::middleware::admin_session::AdminSession;
use crate::state::AppState;

/// Room for multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Image uploads. The body limit sits slightly above the image size limit
/// so that oversized files still reach validation and get a clear error.
pub fn routes(max_upload_bytes: u64) -> Router<AppState> {
    let limit = usize::try_from(max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        .route("/admin/api/uploads", post(upload).get(list_uploads))
        .route("/admin/api/uploads/retry", post(retry_pending))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(limit))
}

fn outcome_status(outcome: &UploadOutcome) -> StatusCode {
    match outcome {
        UploadOutcome::Uploaded { .. } => StatusCode::CREATED,
        UploadOutcome::Queued { .. } => StatusCode::ACCEPTED,
    }
}

async fn upload(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadOutcome>)> {
    let mut file: Option<ImageUpload> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("multipart error: {e}")))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read file: {e}")))?;
            file = Some(ImageUpload {
                file_name,
                content_type,
                data: data.to_vec(),
            });
            break;
        }
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("missing 'file' field".into()))?;
    tracing::debug!(admin = %admin.sub, file = %file.file_name, size = file.data.len(), "upload received");
    let outcome = state.uploader().upload(file).await?;
    Ok((outcome_status(&outcome), Json(outcome)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadsResponse {
    online: bool,
    pending: Option<PendingUpload>,
    /// Where the last queued file ended up once storage came back.
    recovered: Option<RecoveredUpload>,
    images: Vec<StoredImage>,
}

async fn list_uploads(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> ApiResult<Json<UploadsResponse>> {
    let uploader = state.uploader();
    let images = uploader.list().await?;
    Ok(Json(UploadsResponse {
        online: uploader.is_online(),
        pending: uploader.pending().await,
        recovered: uploader.recovered().await,
        images,
    }))
}

async fn retry_pending(
    State(state): State<AppState>,
    _admin: AdminSession,
) -> ApiResult<(StatusCode, Json<UploadOutcome>)> {
    match state.uploader().retry_pending().await {
        Some(result) => {
            let outcome = result?;
            Ok((outcome_status(&outcome), Json(outcome)))
        }
        None => Err(ApiError::NotFound("no pending upload".into())),
    }
}
