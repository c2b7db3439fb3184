use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::fs;

use super::error::UploadError;

/// An object in the image bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    pub name: String,
    pub url: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,
}

/// Bucket holding uploaded images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Check that the bucket can be reached.
    async fn probe(&self) -> Result<(), UploadError>;

    /// Store bytes under `name`, replacing any object of that name.
    async fn put(&self, name: &str, data: &[u8]) -> Result<(), UploadError>;

    /// All objects in the bucket, newest first.
    async fn list(&self) -> Result<Vec<StoredImage>, UploadError>;

    /// URL under which the object is publicly served.
    fn public_url(&self, name: &str) -> String;
}

/// Filesystem-backed bucket, served by the web layer under `public_base`.
pub struct FilesystemImageStore {
    root: PathBuf,
    public_base: String,
}

impl FilesystemImageStore {
    pub async fn new(root: PathBuf, public_base: impl Into<String>) -> Result<Self, UploadError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self {
            root,
            public_base: public_base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn temp_path(&self) -> PathBuf {
        self.root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl ImageStore for FilesystemImageStore {
    async fn probe(&self) -> Result<(), UploadError> {
        match fs::metadata(&self.root).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(UploadError::Unreachable(format!(
                "{} is not a directory",
                self.root.display()
            ))),
            Err(e) => Err(UploadError::Unreachable(e.to_string())),
        }
    }

    async fn put(&self, name: &str, data: &[u8]) -> Result<(), UploadError> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(UploadError::InvalidName(name.to_string()));
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, self.root.join(name)).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn list(&self) -> Result<Vec<StoredImage>, UploadError> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut images = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            images.push(StoredImage {
                url: self.public_url(&name),
                name,
                size: meta.len(),
                modified_at: meta.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        images.sort_by(|a, b| b.modified_at.cmp(&a.modified_at).then(a.name.cmp(&b.name)));
        Ok(images)
    }

    fn public_url(&self, name: &str) -> String {
        format!("{}/{}", self.public_base, name)
    }
}
