use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use lodge_site_core::activity::ActivityImage;
use lodge_site_core::content::{ContentScope, ContentTree, LoadOutcome};
use serde::Deserialize;
use serde_json::Value;

use super::parse_page;
use crate::error::ApiResult;
use crate::state::AppState;

/// Public read API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/content/{page}", get(get_content))
        .route("/v1/activity-images", get(list_activity_images))
}

#[derive(Debug, Deserialize)]
struct ContentQuery {
    section: Option<String>,
}

/// Loader outcome for a page, or one section of it.
async fn get_content(
    State(state): State<AppState>,
    Path(page): Path<String>,
    Query(query): Query<ContentQuery>,
) -> ApiResult<Json<LoadOutcome>> {
    let page = parse_page(&page)?;
    let scope = ContentScope::from_section(query.section.as_deref());

    let defaults = page.defaults();
    let fallback = match &scope {
        ContentScope::Page => defaults,
        ContentScope::Section(section) => match defaults.get(section) {
            Some(Value::Object(keys)) => keys.clone(),
            _ => ContentTree::new(),
        },
    };

    let outcome = state.loader().load(page.id(), &scope, &fallback).await;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
struct ImagesQuery {
    category: Option<String>,
}

async fn list_activity_images(
    State(state): State<AppState>,
    Query(query): Query<ImagesQuery>,
) -> ApiResult<Json<Vec<ActivityImage>>> {
    let images = state.images().list_images(query.category.as_deref()).await?;
    Ok(Json(images))
}
