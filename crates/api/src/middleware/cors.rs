use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

/// CORS for the public read API. Admin routes rely on a same-site cookie,
/// so only safe methods are opened to other origins.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers(Any)
}
