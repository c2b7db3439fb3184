pub mod activity_images;
pub mod admin;
pub mod content;
pub mod drafts;
pub mod health;
pub mod notifications;
pub mod pages;
pub mod uploads;

#[cfg(test)]
mod tests;

use axum::Router;
use lodge_site_core::pages::Page;
use tower_http::services::ServeDir;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    let config = state.config();
    let media = ServeDir::new(&config.media_dir);
    let assets = ServeDir::new(&config.static_dir);

    Router::new()
        .merge(health::routes())
        .merge(pages::routes())
        .merge(content::routes())
        .merge(admin::routes())
        .merge(drafts::routes())
        .merge(activity_images::routes())
        .merge(uploads::routes(config.max_upload_bytes))
        .merge(notifications::routes())
        .nest_service("/media", media)
        .nest_service("/static", assets)
        .with_state(state)
}

pub(crate) fn parse_page(id: &str) -> ApiResult<Page> {
    Page::from_id(id).ok_or_else(|| ApiError::NotFound(format!("page '{id}'")))
}
