use axum::{extract::State, response::Html, routing::get, Router};
use lodge_site_core::activity::{ActivityImage, ATTRACTION_CATEGORY};
use lodge_site_core::content::{ContentScope, ContentTree};
use lodge_site_core::pages::Page;
use serde_json::Value;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::templates::{render, PublicPageTemplate};
use crate::views::{nav, pages, Footer, PageContent};

const FALLBACK_NOTICE: &str =
    "Some of our latest information could not be loaded. You are seeing our standard details.";

/// One public route per marketing page.
pub fn routes() -> Router<AppState> {
    Page::ALL.into_iter().fold(Router::new(), |router, page| {
        router.route(
            page.path(),
            get(move |State(state): State<AppState>| render_page(state, page)),
        )
    })
}

async fn render_page(state: AppState, page: Page) -> ApiResult<Html<String>> {
    let defaults = page.defaults();
    let outcome = state
        .loader()
        .load(page.id(), &ContentScope::Page, &defaults)
        .await;

    let attractions = match page {
        Page::Activities => attractions(&state).await,
        _ => Vec::new(),
    };

    let footer = if page == Page::Contact {
        Footer::from_details(&section_of(&outcome.content, "details"))
    } else if outcome.is_fallback() {
        // Store already failed for this request; skip a second retry round.
        Footer::from_details(&section_of(&Page::Contact.defaults(), "details"))
    } else {
        footer(&state).await
    };

    let content = PageContent::new(page, &outcome.content).with_links(&outcome.links);
    render(&PublicPageTemplate {
        site_name: state.config().site_name.clone(),
        nav: nav(Some(page)),
        footer,
        notice: outcome.is_fallback().then(|| FALLBACK_NOTICE.to_string()),
        view: pages::build(&content, page, &attractions),
    })
}

fn section_of(tree: &ContentTree, section: &str) -> ContentTree {
    match tree.get(section) {
        Some(Value::Object(keys)) => keys.clone(),
        _ => ContentTree::new(),
    }
}

/// Contact details for the footer, read section-scoped.
async fn footer(state: &AppState) -> Footer {
    let fallback = section_of(&Page::Contact.defaults(), "details");
    let outcome = state
        .loader()
        .load(
            Page::Contact.id(),
            &ContentScope::Section("details".to_string()),
            &fallback,
        )
        .await;
    Footer::from_details(&outcome.content)
}

/// Stored attraction cards; an unreachable table leaves the defaults.
async fn attractions(state: &AppState) -> Vec<ActivityImage> {
    match state.images().list_images(Some(ATTRACTION_CATEGORY)).await {
        Ok(images) => images,
        Err(err) => {
            tracing::warn!(error = %err, "attraction images unavailable; using defaults");
            Vec::new()
        }
    }
}
