use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lodge_site_core::auth::AuthError;
use lodge_site_core::draft::DraftError;
use lodge_site_core::media::UploadError;
use lodge_site_core::store::StoreError;
use serde_json::json;

/// API error type that maps to JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<DraftError> for ApiError {
    fn from(err: DraftError) -> Self {
        match err {
            DraftError::ItemNotFound(_) => ApiError::NotFound(err.to_string()),
            DraftError::DuplicateItem(_) => ApiError::Conflict(err.to_string()),
            DraftError::Store(store) => ApiError::Store(store),
            DraftError::NotAnObject(_)
            | DraftError::NotAList(_)
            | DraftError::InvalidItem(_)
            | DraftError::Validation(_) => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge { .. } => ApiError::PayloadTooLarge(err.to_string()),
            UploadError::UnsupportedType(_) | UploadError::InvalidName(_) | UploadError::Empty => {
                ApiError::BadRequest(err.to_string())
            }
            UploadError::Unreachable(_) => ApiError::Unavailable(err.to_string()),
            UploadError::Io(io) => ApiError::Internal(format!("image storage: {io}")),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidPassword | AuthError::InvalidToken(_) => ApiError::Unauthorized,
            AuthError::Hash(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<askama::Error> for ApiError {
    fn from(err: askama::Error) -> Self {
        ApiError::Internal(format!("template rendering failed: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "notFound", msg.clone()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "badRequest", msg.clone()),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Authentication required".to_string(),
            ),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "payloadTooLarge", msg.clone())
            }
            ApiError::Unavailable(msg) => {
                tracing::warn!("Service unavailable: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "unavailable",
                    msg.clone(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internalError",
                    "An internal error occurred".to_string(),
                )
            }
            ApiError::Store(StoreError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "notFound", msg.clone())
            }
            ApiError::Store(StoreError::Conflict(msg)) => {
                (StatusCode::CONFLICT, "conflict", msg.clone())
            }
            ApiError::Store(err @ StoreError::PartialReplace { .. }) => {
                tracing::error!("Partial save: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "partialSave",
                    err.to_string(),
                )
            }
            ApiError::Store(err) => {
                tracing::error!("Store error: {err}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "unavailable",
                    "The content store is unavailable".to_string(),
                )
            }
        };

        let body = json!({
            "error": {
                "type": error_type,
                "message": message,
                "statusCode": status.as_u16(),
            }
        });

        (status, Json(body)).into_response()
    }
}

/// Convenience type alias for route handlers.
pub type ApiResult<T> = Result<T, ApiError>;
