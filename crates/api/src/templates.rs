use askama::Template;
use axum::response::Html;
use lodge_site_core::events::{Notification, NotificationLevel};
use lodge_site_core::media::{PendingUpload, StoredImage};

use crate::error::ApiResult;
use crate::views::{Footer, NavItem, PageView};

#[derive(Template)]
#[template(path = "page.html")]
pub struct PublicPageTemplate {
    pub site_name: String,
    pub nav: Vec<NavItem>,
    pub footer: Footer,
    pub notice: Option<String>,
    pub view: PageView,
}

#[derive(Template)]
#[template(path = "admin/login.html")]
pub struct AdminLoginTemplate {
    pub site_name: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub site_name: String,
    pub store_online: bool,
    pub media_online: bool,
    pub pending: Option<PendingUpload>,
    pub pages: Vec<PageSummary>,
    pub notifications: Vec<NotificationRow>,
    pub images: Vec<StoredImage>,
}

pub struct PageSummary {
    pub label: &'static str,
    pub path: &'static str,
    pub stored_rows: i64,
    pub draft_open: bool,
    pub draft_dirty: bool,
}

pub struct NotificationRow {
    pub level: &'static str,
    pub message: String,
    pub created_at: String,
}

impl From<Notification> for NotificationRow {
    fn from(n: Notification) -> Self {
        let level = match n.level {
            NotificationLevel::Info => "info",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        Self {
            level,
            message: n.message,
            created_at: n.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

pub fn render<T: Template>(template: &T) -> ApiResult<Html<String>> {
    Ok(Html(template.render()?))
}
