mod error;
mod store;
mod uploader;

pub use error::UploadError;
pub use store::{FilesystemImageStore, ImageStore, StoredImage};
pub use uploader::{
    spawn_connectivity_monitor, ImageUpload, PendingUpload, RecoveredUpload, UploadOutcome,
    Uploader, DEFAULT_MAX_UPLOAD_BYTES,
};
