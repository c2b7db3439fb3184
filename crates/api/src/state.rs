use std::sync::Arc;

use lodge_site_core::auth::AdminGate;
use lodge_site_core::content::ContentLoader;
use lodge_site_core::draft::DraftRegistry;
use lodge_site_core::events::EventBus;
use lodge_site_core::media::Uploader;
use lodge_site_core::store::{ActivityImageStore, ContentStore};

use crate::config::AppConfig;
use crate::notifications::NotificationLog;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    config: AppConfig,
    content: Arc<dyn ContentStore>,
    images: Arc<dyn ActivityImageStore>,
    loader: ContentLoader,
    drafts: DraftRegistry,
    uploader: Arc<Uploader>,
    gate: AdminGate,
    event_bus: EventBus,
    notifications: NotificationLog,
}

/// Everything the state is assembled from.
pub struct StateParts {
    pub config: AppConfig,
    pub content: Arc<dyn ContentStore>,
    pub images: Arc<dyn ActivityImageStore>,
    pub uploader: Arc<Uploader>,
    pub gate: AdminGate,
    pub event_bus: EventBus,
}

impl AppState {
    pub fn new(parts: StateParts) -> Self {
        let StateParts {
            config,
            content,
            images,
            uploader,
            gate,
            event_bus,
        } = parts;

        let loader = ContentLoader::new(content.clone(), event_bus.clone(), config.retry_policy());
        let drafts = DraftRegistry::new(loader.clone(), content.clone(), event_bus.clone());
        let notifications = NotificationLog::new(50);

        Self {
            inner: Arc::new(InnerState {
                config,
                content,
                images,
                loader,
                drafts,
                uploader,
                gate,
                event_bus,
                notifications,
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn content(&self) -> &Arc<dyn ContentStore> {
        &self.inner.content
    }

    pub fn images(&self) -> &Arc<dyn ActivityImageStore> {
        &self.inner.images
    }

    pub fn loader(&self) -> &ContentLoader {
        &self.inner.loader
    }

    pub fn drafts(&self) -> &DraftRegistry {
        &self.inner.drafts
    }

    pub fn uploader(&self) -> &Arc<Uploader> {
        &self.inner.uploader
    }

    pub fn gate(&self) -> &AdminGate {
        &self.inner.gate
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.event_bus
    }

    pub fn notifications(&self) -> &NotificationLog {
        &self.inner.notifications
    }
}
