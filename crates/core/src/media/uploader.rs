use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::error::UploadError;
use super::store::{ImageStore, StoredImage};
use crate::events::{EventBus, Notification, SiteEvent};

/// Accepted image types and the extension stored files get.
const ALLOWED_TYPES: [(&str, &str); 4] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// A file handed in by the admin.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    /// As sent by the client; guessed from the file name when blank.
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum UploadOutcome {
    Uploaded { name: String, url: String },
    /// Storage was unreachable; the file waits as the pending upload.
    Queued { file_name: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUpload {
    pub file_name: String,
    pub size: u64,
}

/// A queued file that made it to storage on a later retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveredUpload {
    pub file_name: String,
    pub name: String,
    pub url: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Validates and stores images, keeping at most one failed upload for a
/// later retry.
pub struct Uploader {
    store: Arc<dyn ImageStore>,
    events: EventBus,
    max_bytes: u64,
    pending: Mutex<Option<ImageUpload>>,
    recovered: Mutex<Option<RecoveredUpload>>,
    online: AtomicBool,
}

impl Uploader {
    pub fn new(store: Arc<dyn ImageStore>, events: EventBus, max_bytes: u64) -> Self {
        Self {
            store,
            events,
            max_bytes,
            pending: Mutex::new(None),
            recovered: Mutex::new(None),
            online: AtomicBool::new(true),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Resolve the content type and check size. Returns the extension to
    /// store the file under.
    pub fn validate(&self, upload: &ImageUpload) -> Result<&'static str, UploadError> {
        if upload.file_name.trim().is_empty() {
            return Err(UploadError::InvalidName("file name is empty".into()));
        }
        if upload.data.is_empty() {
            return Err(UploadError::Empty);
        }

        let size = upload.data.len() as u64;
        if size > self.max_bytes {
            return Err(UploadError::TooLarge {
                actual: size,
                limit: self.max_bytes,
            });
        }

        let content_type = match upload.content_type.as_deref() {
            Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => ct.to_string(),
            _ => mime_guess::from_path(&upload.file_name)
                .first()
                .map(|m| m.essence_str().to_string())
                .unwrap_or_default(),
        };

        ALLOWED_TYPES
            .iter()
            .find(|(mime, _)| content_type.eq_ignore_ascii_case(mime))
            .map(|(_, ext)| *ext)
            .ok_or(UploadError::UnsupportedType(content_type))
    }

    /// Validate, probe and store. Connectivity failures queue the file
    /// instead of failing, replacing any earlier pending file.
    pub async fn upload(&self, upload: ImageUpload) -> Result<UploadOutcome, UploadError> {
        let ext = self.validate(&upload)?;

        match self.store_file(&upload, ext).await {
            Ok(outcome) => Ok(outcome),
            Err(err) if err.is_connectivity() => {
                self.set_online(false);
                let file_name = upload.file_name.clone();
                let replaced = self.pending.lock().await.replace(upload);
                if let Some(old) = replaced {
                    tracing::warn!(dropped = %old.file_name, "pending upload replaced");
                }
                tracing::warn!(file = %file_name, error = %err, "image storage unreachable, upload queued");
                self.events.notify(Notification::warning(format!(
                    "Image storage is unreachable. '{file_name}' will be uploaded when the connection returns."
                )));
                Ok(UploadOutcome::Queued { file_name })
            }
            Err(err) => Err(err),
        }
    }

    async fn store_file(
        &self,
        upload: &ImageUpload,
        ext: &str,
    ) -> Result<UploadOutcome, UploadError> {
        self.store.probe().await?;

        let name = format!(
            "{}-{}.{ext}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple()
        );
        self.store.put(&name, &upload.data).await?;
        self.set_online(true);

        let url = self.store.public_url(&name);
        tracing::info!(file = %upload.file_name, name = %name, "image uploaded");
        self.events.publish(SiteEvent::ImageUploaded {
            name: name.clone(),
            url: url.clone(),
        });
        Ok(UploadOutcome::Uploaded { name, url })
    }

    pub async fn pending(&self) -> Option<PendingUpload> {
        self.pending.lock().await.as_ref().map(|p| PendingUpload {
            file_name: p.file_name.clone(),
            size: p.data.len() as u64,
        })
    }

    /// The last pending file that a retry stored, with its public URL.
    pub async fn recovered(&self) -> Option<RecoveredUpload> {
        self.recovered.lock().await.clone()
    }

    /// Probe the store and record the result. Publishes on change.
    pub async fn check_connectivity(&self) -> bool {
        let online = self.store.probe().await.is_ok();
        self.set_online(online);
        online
    }

    /// Try the pending upload again. `None` when nothing is pending.
    ///
    /// A pending file that fails for connectivity reasons stays pending.
    pub async fn retry_pending(&self) -> Option<Result<UploadOutcome, UploadError>> {
        let mut pending = self.pending.lock().await;
        let upload = pending.take()?;

        let result = match self.validate(&upload) {
            Ok(ext) => self.store_file(&upload, ext).await,
            Err(err) => Err(err),
        };

        match &result {
            Ok(UploadOutcome::Uploaded { name, url }) => {
                self.events.notify(Notification::info(format!(
                    "Pending upload '{}' is now available at {url}.",
                    upload.file_name
                )));
                *self.recovered.lock().await = Some(RecoveredUpload {
                    file_name: upload.file_name.clone(),
                    name: name.clone(),
                    url: url.clone(),
                    uploaded_at: Utc::now(),
                });
            }
            Err(err) if err.is_connectivity() => {
                self.set_online(false);
                *pending = Some(upload);
            }
            Err(err) => {
                tracing::error!(file = %upload.file_name, error = %err, "pending upload dropped");
            }
            Ok(UploadOutcome::Queued { .. }) => {}
        }
        Some(result)
    }

    pub async fn list(&self) -> Result<Vec<StoredImage>, UploadError> {
        self.store.list().await
    }

    pub fn public_url(&self, name: &str) -> String {
        self.store.public_url(name)
    }

    fn set_online(&self, online: bool) {
        let was = self.online.swap(online, Ordering::SeqCst);
        if was != online {
            tracing::info!(online, "image storage connectivity changed");
            self.events.publish(SiteEvent::Connectivity { online });
        }
    }
}

/// Spawn a background task that probes the store periodically and retries
/// the pending upload once the store is reachable.
pub fn spawn_connectivity_monitor(
    uploader: Arc<Uploader>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if !uploader.check_connectivity().await {
                continue;
            }
            if let Some(Err(err)) = uploader.retry_pending().await {
                tracing::warn!(error = %err, "retry of pending upload failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    /// Bucket that can be switched offline.
    #[derive(Default)]
    struct FlakyStore {
        offline: AtomicBool,
        names: StdMutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageStore for FlakyStore {
        async fn probe(&self) -> Result<(), UploadError> {
            if self.offline.load(Ordering::SeqCst) {
                Err(UploadError::Unreachable("offline".into()))
            } else {
                Ok(())
            }
        }

        async fn put(&self, name: &str, _data: &[u8]) -> Result<(), UploadError> {
            self.names.lock().unwrap().push(name.to_string());
            Ok(())
        }

        async fn list(&self) -> Result<Vec<StoredImage>, UploadError> {
            Ok(Vec::new())
        }

        fn public_url(&self, name: &str) -> String {
            format!("/media/{name}")
        }
    }

    fn upload(name: &str, content_type: Option<&str>, len: usize) -> ImageUpload {
        ImageUpload {
            file_name: name.into(),
            content_type: content_type.map(str::to_string),
            data: vec![7u8; len],
        }
    }

    fn uploader(store: Arc<FlakyStore>) -> Uploader {
        Uploader::new(store, EventBus::new(16), 1024)
    }

    #[test]
    fn validation_checks_type_and_size() {
        let up = uploader(Arc::new(FlakyStore::default()));

        assert_eq!(up.validate(&upload("a.png", Some("image/png"), 10)).unwrap(), "png");
        assert_eq!(up.validate(&upload("photo.JPG", None, 10)).unwrap(), "jpg");
        assert!(matches!(
            up.validate(&upload("doc.pdf", Some("application/pdf"), 10)),
            Err(UploadError::UnsupportedType(_))
        ));
        assert!(matches!(
            up.validate(&upload("big.png", Some("image/png"), 2048)),
            Err(UploadError::TooLarge { actual: 2048, limit: 1024 })
        ));
        assert!(matches!(
            up.validate(&upload("empty.png", Some("image/png"), 0)),
            Err(UploadError::Empty)
        ));
    }

    #[tokio::test]
    async fn uploads_with_unique_names() {
        let store = Arc::new(FlakyStore::default());
        let up = uploader(store.clone());

        let first = up.upload(upload("a.png", Some("image/png"), 10)).await.unwrap();
        let second = up.upload(upload("a.png", Some("image/png"), 10)).await.unwrap();
        assert_ne!(first, second);

        match first {
            UploadOutcome::Uploaded { name, url } => {
                assert!(name.ends_with(".png"));
                assert_eq!(url, format!("/media/{name}"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(store.names.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn offline_upload_keeps_only_the_latest_pending_file() {
        let store = Arc::new(FlakyStore::default());
        store.offline.store(true, Ordering::SeqCst);
        let up = uploader(store.clone());

        let outcome = up.upload(upload("first.png", None, 10)).await.unwrap();
        assert_eq!(
            outcome,
            UploadOutcome::Queued {
                file_name: "first.png".into()
            }
        );
        up.upload(upload("second.gif", None, 10)).await.unwrap();
        assert!(!up.is_online());

        let pending = up.pending().await.unwrap();
        assert_eq!(pending.file_name, "second.gif");

        // Still offline: the file stays pending.
        assert!(up.retry_pending().await.unwrap().is_err());
        assert!(up.pending().await.is_some());

        store.offline.store(false, Ordering::SeqCst);
        assert!(up.check_connectivity().await);
        let retried = up.retry_pending().await.unwrap().unwrap();
        assert!(matches!(retried, UploadOutcome::Uploaded { ref name, .. } if name.ends_with(".gif")));
        assert!(up.pending().await.is_none());
        assert!(up.retry_pending().await.is_none());
        assert_eq!(store.names.lock().unwrap().len(), 1);

        let recovered = up.recovered().await.unwrap();
        assert_eq!(recovered.file_name, "second.gif");
        assert_eq!(recovered.url, format!("/media/{}", recovered.name));
    }

    #[tokio::test]
    async fn invalid_files_are_never_queued() {
        let store = Arc::new(FlakyStore::default());
        store.offline.store(true, Ordering::SeqCst);
        let up = uploader(store);

        assert!(up.upload(upload("x.txt", Some("text/plain"), 10)).await.is_err());
        assert!(up.pending().await.is_none());
    }
}
