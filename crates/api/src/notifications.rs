use std::collections::VecDeque;
use std::sync::Mutex;

use lodge_site_core::events::{Notification, NotificationLevel, SiteEvent};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::state::AppState;

/// Most recent notifications for the admin area, newest first.
pub struct NotificationLog {
    entries: Mutex<VecDeque<Notification>>,
    capacity: usize,
}

impl NotificationLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn push(&self, notification: Notification) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_front(notification);
        entries.truncate(self.capacity);
    }

    pub fn list(&self) -> Vec<Notification> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    /// Returns `true` if the notification was still there.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|n| n.id != id);
        entries.len() != before
    }
}

/// Spawn a background task that records bus notifications and logs the
/// remaining events.
pub fn spawn_collector(state: AppState) -> tokio::task::JoinHandle<()> {
    let mut rx = state.event_bus().subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(SiteEvent::Notification(notification)) => {
                    match notification.level {
                        NotificationLevel::Error => {
                            tracing::error!(message = %notification.message, "notification")
                        }
                        NotificationLevel::Warning => {
                            tracing::warn!(message = %notification.message, "notification")
                        }
                        NotificationLevel::Info => {
                            tracing::info!(message = %notification.message, "notification")
                        }
                    }
                    state.notifications().push(notification);
                }
                Ok(event) => tracing::debug!(?event, "site event"),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notification collector lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
