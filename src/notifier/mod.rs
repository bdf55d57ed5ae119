//! Best-effort event publishing.
//!
//! Publishing is never part of the consistency boundary: callers catch
//! `NotifierError` and downgrade it to a warning. Delivery is
//! at-least-once from the subscriber's point of view and may lag or drop
//! under backpressure.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

use crate::models::event::TicketEvent;

#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("no subscribers on topic '{0}'")]
    NoSubscribers(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        event: &TicketEvent,
        subject: &str,
    ) -> Result<(), NotifierError>;
}

/// In-process notifier over a tokio broadcast channel. One deployment
/// variant routes the processor's own completion events back over the
/// same channel, which is why consumers must treat `PriceChangeProcessed`
/// as a terminal no-op.
pub struct BroadcastNotifier {
    sender: broadcast::Sender<TicketEvent>,
}

impl BroadcastNotifier {
    pub fn channel(capacity: usize) -> (Self, broadcast::Receiver<TicketEvent>) {
        let (sender, receiver) = broadcast::channel(capacity);
        (Self { sender }, receiver)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TicketEvent> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl Notifier for BroadcastNotifier {
    async fn publish(
        &self,
        topic: &str,
        event: &TicketEvent,
        subject: &str,
    ) -> Result<(), NotifierError> {
        self.sender
            .send(event.clone())
            .map_err(|_| NotifierError::NoSubscribers(topic.to_string()))?;
        debug!(topic, subject, "published event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_delivers_to_subscribers() {
        let (notifier, mut receiver) = BroadcastNotifier::channel(8);
        notifier
            .publish("price-changes", &TicketEvent::Unknown, "test subject")
            .await
            .unwrap();
        assert_eq!(receiver.recv().await.unwrap(), TicketEvent::Unknown);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_an_error() {
        let (notifier, receiver) = BroadcastNotifier::channel(8);
        drop(receiver);
        let result = notifier
            .publish("price-changes", &TicketEvent::Unknown, "test subject")
            .await;
        assert!(matches!(result, Err(NotifierError::NoSubscribers(_))));
    }
}
