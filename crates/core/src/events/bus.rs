use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::{Notification, SiteEvent};

/// In-process event bus backed by `tokio::broadcast`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<SiteEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns the number of receivers; zero when nobody is listening.
    pub fn publish(&self, event: SiteEvent) -> usize {
        match self.sender.send(event) {
            Ok(n) => n,
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!(?event, "event dropped, no subscribers");
                0
            }
        }
    }

    /// Shorthand for publishing a [`SiteEvent::Notification`].
    pub fn notify(&self, notification: Notification) -> usize {
        self.publish(SiteEvent::Notification(notification))
    }

    /// Subscribe to the event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<SiteEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(SiteEvent::Connectivity { online: true });

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, SiteEvent::Connectivity { online: true }));
    }

    #[tokio::test]
    async fn multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.notify(Notification::info("saved")), 2);

        assert!(matches!(rx1.recv().await.unwrap(), SiteEvent::Notification(_)));
        assert!(matches!(rx2.recv().await.unwrap(), SiteEvent::Notification(_)));
    }

    #[test]
    fn publish_without_subscribers_is_not_an_error() {
        let bus = EventBus::new(4);
        assert_eq!(bus.publish(SiteEvent::Connectivity { online: false }), 0);
    }
}
