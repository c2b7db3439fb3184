use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use lodge_site_core::auth::AdminGate;
use lodge_site_core::content::{ContentRow, LinkType};
use lodge_site_core::events::EventBus;
use lodge_site_core::media::{FilesystemImageStore, Uploader};
use lodge_site_core::store::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::build_router;
use crate::config::AppConfig;
use crate::middleware::admin_session::SESSION_COOKIE;
use crate::state::{AppState, StateParts};

struct Harness {
    app: Router,
    state: AppState,
    store: Arc<MemoryStore>,
    media: tempfile::TempDir,
}

async fn harness(store: MemoryStore) -> Harness {
    let media = tempfile::tempdir().unwrap();
    let mut config = AppConfig::for_tests();
    config.media_dir = media.path().to_path_buf();

    let event_bus = EventBus::new(config.event_bus_capacity);
    let store = Arc::new(store);
    let images = FilesystemImageStore::new(media.path().to_path_buf(), "/media")
        .await
        .unwrap();
    let uploader = Arc::new(Uploader::new(
        Arc::new(images),
        event_bus.clone(),
        config.max_upload_bytes,
    ));
    let gate = AdminGate::new(&config.admin_password, &config.jwt_secret, Duration::hours(1)).unwrap();

    let state = AppState::new(StateParts {
        config,
        content: store.clone(),
        images: store.clone(),
        uploader,
        gate,
        event_bus,
    });

    Harness {
        app: build_router(state.clone()),
        state,
        store,
        media,
    }
}

impl Harness {
    fn admin_cookie(&self) -> String {
        let token = self.state.gate().issue_token().unwrap();
        format!("{SESSION_COOKIE}={token}")
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn get(&self, uri: &str) -> (StatusCode, String) {
        let (status, _, body) = self
            .send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await;
        (status, body)
    }

    async fn admin_json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, self.admin_cookie())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, serde_json::from_str(&body).unwrap_or(Value::Null))
    }
}

#[tokio::test]
async fn public_pages_render_defaults_from_an_empty_store() {
    let h = harness(MemoryStore::new()).await;
    for path in ["/", "/about", "/accommodations", "/amenities", "/activities", "/reservations", "/rules-faqs", "/contact"] {
        let (status, body) = h.get(path).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert!(body.contains("<nav>"), "{path}");
    }
    let (_, home) = h.get("/").await;
    assert!(home.contains("Welcome, Neighbor"));
}

#[tokio::test]
async fn stored_rows_override_single_fields() {
    let store = MemoryStore::with_rows(vec![ContentRow::text(
        "rules-faqs",
        "importantNote",
        "importantNote",
        "Be kind",
    )]);
    let h = harness(store).await;

    let (status, body) = h.get("/rules-faqs").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Be kind"));
    assert!(body.contains("Speed limit in the park is 5 MPH."));
}

#[tokio::test]
async fn unreachable_store_serves_fallback_with_notice() {
    let store = MemoryStore::new();
    store.fail_next_fetches(2);
    let h = harness(store).await;

    let (status, body) = h.get("/about").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Our Story"));
    assert!(body.contains("could not be loaded"));
}

/// The opening tag of the anchor whose href contains `needle`.
fn anchor_with<'a>(body: &'a str, needle: &str) -> &'a str {
    let at = body.find(needle).unwrap();
    let start = body[..at].rfind("<a ").unwrap();
    let end = at + body[at..].find('>').unwrap();
    &body[start..end]
}

#[tokio::test]
async fn stored_link_types_decide_new_tabs() {
    let store = MemoryStore::with_rows(vec![
        ContentRow::text("home", "hero", "ctaLink", "https://pineridge.example/book")
            .with_link_type(LinkType::Internal),
        ContentRow::text("reservations", "booking", "bookingLink", "/partners/book")
            .with_link_type(LinkType::External),
    ]);
    let h = harness(store).await;

    let (status, home) = h.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!anchor_with(&home, "pineridge.example").contains("target=\"_blank\""));

    let (status, reservations) = h.get("/reservations").await;
    assert_eq!(status, StatusCode::OK);
    assert!(anchor_with(&reservations, "partners").contains("target=\"_blank\""));

    let (_, body) = h.get("/v1/content/home").await;
    let outcome: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(outcome["links"]["hero.ctaLink"], "internal");
}

#[tokio::test]
async fn content_api_scopes_by_section() {
    let store = MemoryStore::with_rows(vec![ContentRow::text("home", "hero", "title", "Howdy")]);
    let h = harness(store).await;

    let (status, body) = h.get("/v1/content/home?section=hero").await;
    assert_eq!(status, StatusCode::OK);
    let outcome: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(outcome["source"], "fetched");
    assert_eq!(outcome["content"]["title"], "Howdy");
    assert_eq!(outcome["content"]["ctaLink"], "/reservations");

    let (status, _) = h.get("/v1/content/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_api_requires_a_session() {
    let h = harness(MemoryStore::new()).await;

    let (status, body) = h.get("/admin/api/drafts/home").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let error: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(error["error"]["type"], "unauthorized");

    let (status, headers, _) = h
        .send(Request::builder().uri("/admin").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/admin/login");
}

#[tokio::test]
async fn login_sets_a_cookie_that_opens_the_dashboard() {
    let h = harness(MemoryStore::new()).await;
    let login = |password: &str| {
        Request::builder()
            .method("POST")
            .uri("/admin/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("password={password}")))
            .unwrap()
    };

    let (status, headers, body) = h.send(login("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(headers.get(header::SET_COOKIE).is_none());
    assert!(body.contains("Incorrect password."));

    let (status, headers, _) = h.send(login("campfire")).await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    let set_cookie = headers[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("Max-Age=3600"));
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let (status, _, body) = h
        .send(
            Request::builder()
                .uri("/admin")
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Dashboard"));
}

#[tokio::test]
async fn draft_edits_are_saved_and_served() {
    let h = harness(MemoryStore::new()).await;

    let (status, body) = h
        .admin_json(
            "POST",
            "/admin/api/drafts/rules-faqs/ops",
            json!([
                { "op": "setField", "section": "importantNote", "key": "importantNote", "value": "Be kind" },
                { "op": "addItem", "list": { "section": "faqs", "key": "faqs" }, "item": { "question": "Showers?", "answer": "Hot, all day." } }
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["draft"]["dirty"], true);
    assert!(body["addedIds"][1].is_string());

    let (status, report) = h
        .admin_json("POST", "/admin/api/drafts/rules-faqs/save", Value::Null)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["page"], "rules-faqs");

    let rows = h.store.all_rows();
    assert!(rows
        .iter()
        .any(|r| r.content_key == "importantNote" && r.content_value == "Be kind"));

    let (_, page) = h.get("/rules-faqs").await;
    assert!(page.contains("Be kind"));
    assert!(page.contains("Showers?"));
}

#[tokio::test]
async fn draft_ops_fail_as_a_batch() {
    let h = harness(MemoryStore::new()).await;

    let (status, _) = h
        .admin_json(
            "POST",
            "/admin/api/drafts/home/ops",
            json!([
                { "op": "setField", "section": "hero", "key": "title", "value": "Changed" },
                { "op": "removeItem", "list": { "section": "highlights", "key": "items" }, "id": "missing" }
            ]),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, draft) = h.admin_json("GET", "/admin/api/drafts/home", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(draft["content"]["hero"]["title"], "Pine Ridge RV Park & Lodge");
}

#[tokio::test]
async fn activity_images_feed_the_activities_page() {
    let h = harness(MemoryStore::new()).await;

    let (status, created) = h
        .admin_json(
            "POST",
            "/admin/api/activity-images",
            json!({ "key": "tubing", "image_url": "/media/tubing.jpg", "title": "River Tubing", "description": "Float along." }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["category"], "attraction");

    let (status, _) = h
        .admin_json(
            "POST",
            "/admin/api/activity-images",
            json!({ "key": "tubing", "image_url": "/media/other.jpg", "title": "Dup" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, page) = h.get("/activities").await;
    assert!(page.contains("River Tubing"));
    assert!(!page.contains("Cedar Falls"));

    let (status, body) = h.get("/v1/activity-images?category=attraction").await;
    assert_eq!(status, StatusCode::OK);
    let listed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

fn multipart(file_name: &str, content_type: &str, data: &[u8]) -> (String, Vec<u8>) {
    let boundary = "lodge-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n").as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

#[tokio::test]
async fn uploads_are_validated_and_stored() {
    let h = harness(MemoryStore::new()).await;
    let upload = |file_name: &str, content_type: &str, data: Vec<u8>| {
        let (ct, body) = multipart(file_name, content_type, &data);
        Request::builder()
            .method("POST")
            .uri("/admin/api/uploads")
            .header(header::COOKIE, h.admin_cookie())
            .header(header::CONTENT_TYPE, ct)
            .body(Body::from(body))
            .unwrap()
    };

    let (status, _, body) = h.send(upload("lake.png", "image/png", vec![7; 64])).await;
    assert_eq!(status, StatusCode::CREATED);
    let outcome: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(outcome["status"], "uploaded");
    let name = outcome["name"].as_str().unwrap();
    assert!(name.ends_with(".png"));
    assert!(h.media.path().join(name).exists());

    let (status, _, _) = h.send(upload("big.jpg", "image/jpeg", vec![0; 2048])).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (status, _, _) = h.send(upload("notes.txt", "text/plain", vec![1; 8])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, listing) = h.admin_json("GET", "/admin/api/uploads", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["online"], true);
    assert!(listing["recovered"].is_null());
    assert_eq!(listing["images"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn queued_upload_reports_its_url_after_retry() {
    let h = harness(MemoryStore::new()).await;
    let request = |method: &str, uri: &str, body: Option<(String, Vec<u8>)>| {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, h.admin_cookie());
        match body {
            Some((ct, bytes)) => builder.header(header::CONTENT_TYPE, ct).body(Body::from(bytes)),
            None => builder.body(Body::empty()),
        }
        .unwrap()
    };

    std::fs::remove_dir_all(h.media.path()).unwrap();
    let (status, _, body) = h
        .send(request("POST", "/admin/api/uploads", Some(multipart("dock.webp", "image/webp", &[3; 32]))))
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let outcome: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(outcome["status"], "queued");

    std::fs::create_dir_all(h.media.path().join(".tmp")).unwrap();
    let (status, _, body) = h.send(request("POST", "/admin/api/uploads/retry", None)).await;
    assert_eq!(status, StatusCode::CREATED);
    let retried: Value = serde_json::from_str(&body).unwrap();

    let (status, listing) = h.admin_json("GET", "/admin/api/uploads", Value::Null).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listing["pending"].is_null());
    assert_eq!(listing["recovered"]["fileName"], "dock.webp");
    assert_eq!(listing["recovered"]["url"], retried["url"]);
}
