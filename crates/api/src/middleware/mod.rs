pub mod admin_session;
pub mod cors;
pub mod request_tracing;
