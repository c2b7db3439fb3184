use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use lodge_site_core::pages::Page;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::middleware::admin_session::{removal_cookie, session_cookie, AdminPage};
use crate::state::AppState;
use crate::templates::{render, AdminDashboardTemplate, AdminLoginTemplate, PageSummary};

/// Browser-facing admin pages.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(dashboard))
        .route("/admin/login", get(login_form).post(login))
        .route("/admin/logout", post(logout))
}

async fn login_form(State(state): State<AppState>) -> ApiResult<Html<String>> {
    render(&AdminLoginTemplate {
        site_name: state.config().site_name.clone(),
        error: None,
    })
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    password: String,
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    match state.gate().login(&form.password) {
        Ok(token) => {
            tracing::info!("admin signed in");
            let cookie = session_cookie(
                token,
                state.gate().session_ttl(),
                state.config().secure_cookies,
            );
            Ok((jar.add(cookie), Redirect::to("/admin")).into_response())
        }
        Err(err) => {
            tracing::warn!(error = %err, "admin sign-in rejected");
            let page = render(&AdminLoginTemplate {
                site_name: state.config().site_name.clone(),
                error: Some("Incorrect password.".to_string()),
            })?;
            Ok((StatusCode::UNAUTHORIZED, page).into_response())
        }
    }
}

async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.remove(removal_cookie()), Redirect::to("/admin/login"))
}

async fn dashboard(
    State(state): State<AppState>,
    AdminPage(admin): AdminPage,
) -> ApiResult<Html<String>> {
    tracing::debug!(admin = %admin.sub, "dashboard opened");
    let (counts, store_online) = match state.content().page_counts().await {
        Ok(counts) => (counts, true),
        Err(err) => {
            tracing::warn!(error = %err, "page counts unavailable");
            (Vec::new(), false)
        }
    };
    let drafts = state.drafts().open_drafts().await;

    let pages = Page::ALL
        .into_iter()
        .map(|page| {
            let stored_rows = counts
                .iter()
                .find(|(id, _)| id == page.id())
                .map_or(0, |(_, n)| *n);
            let draft = drafts.iter().find(|(p, _)| *p == page);
            PageSummary {
                label: page.nav_label(),
                path: page.path(),
                stored_rows,
                draft_open: draft.is_some(),
                draft_dirty: draft.is_some_and(|(_, dirty)| *dirty),
            }
        })
        .collect();

    let images = state.uploader().list().await.unwrap_or_else(|err| {
        tracing::warn!(error = %err, "image listing unavailable");
        Vec::new()
    });

    render(&AdminDashboardTemplate {
        site_name: state.config().site_name.clone(),
        store_online,
        media_online: state.uploader().is_online(),
        pending: state.uploader().pending().await,
        pages,
        notifications: state
            .notifications()
            .list()
            .into_iter()
            .map(Into::into)
            .collect(),
        images,
    })
}
