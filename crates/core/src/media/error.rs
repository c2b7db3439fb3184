use thiserror::Error;

/// Errors that can occur while validating or storing an uploaded image.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported image type '{0}' (allowed: JPEG, PNG, WebP, GIF)")]
    UnsupportedType(String),

    #[error("image exceeds size limit ({actual} > {limit} bytes)")]
    TooLarge { actual: u64, limit: u64 },

    #[error("invalid file name: {0}")]
    InvalidName(String),

    #[error("image is empty")]
    Empty,

    #[error("image storage unreachable: {0}")]
    Unreachable(String),

    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Failures worth retrying once the storage is reachable again.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, UploadError::Unreachable(_))
    }
}
