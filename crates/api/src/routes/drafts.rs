use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use lodge_site_core::draft::{DraftOp, DraftView, SaveReport};
use serde::Serialize;
use serde_json::{json, Value};

use super::parse_page;
use crate::error::ApiResult;
use crate::middleware::admin_session::AdminSession;
use crate::state::AppState;

/// Draft editing for the admin area.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/api/drafts/{page}", get(open_draft).delete(discard_draft))
        .route("/admin/api/drafts/{page}/ops", post(apply_ops))
        .route("/admin/api/drafts/{page}/save", post(save_draft))
}

async fn open_draft(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(page): Path<String>,
) -> ApiResult<Json<DraftView>> {
    let page = parse_page(&page)?;
    Ok(Json(state.drafts().open(page).await.view()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OpsResponse {
    draft: DraftView,
    /// Per operation, the id assigned to an added item.
    added_ids: Vec<Option<String>>,
}

async fn apply_ops(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(page): Path<String>,
    Json(ops): Json<Vec<DraftOp>>,
) -> ApiResult<Json<OpsResponse>> {
    let page = parse_page(&page)?;
    let count = ops.len();
    let (draft, added_ids) = state.drafts().apply(page, ops).await?;
    tracing::debug!(page = %page, ops = count, "draft updated");
    Ok(Json(OpsResponse {
        draft: draft.view(),
        added_ids,
    }))
}

async fn save_draft(
    State(state): State<AppState>,
    AdminSession(admin): AdminSession,
    Path(page): Path<String>,
) -> ApiResult<Json<SaveReport>> {
    let page = parse_page(&page)?;
    tracing::info!(admin = %admin.sub, page = %page, "saving draft");
    Ok(Json(state.drafts().save(page).await?))
}

async fn discard_draft(
    State(state): State<AppState>,
    _admin: AdminSession,
    Path(page): Path<String>,
) -> ApiResult<Json<Value>> {
    let page = parse_page(&page)?;
    let discarded = state.drafts().discard(page).await;
    Ok(Json(json!({ "discarded": discarded })))
}
