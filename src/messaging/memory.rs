//! In-process message transport built on broadcast channels

use crate::messaging::error::{MessagingError, MessagingResult};
use crate::messaging::traits::{MessageConsumer, MessageProducer, MessageStream};
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Topic-keyed broadcast channels shared by producers and consumers in one process.
///
/// Payloads published while a topic has no subscriber are discarded.
pub struct InMemoryBroker {
    topics: DashMap<String, broadcast::Sender<String>>,
    capacity: usize,
}

impl InMemoryBroker {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<String> {
        self.topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    /// Number of live subscriptions on a topic
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .get(topic)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl MessageProducer for InMemoryBroker {
    async fn publish(&self, topic: &str, payload: &str) -> MessagingResult<()> {
        if self.sender(topic).send(payload.to_string()).is_err() {
            tracing::debug!(topic, "No subscribers; message discarded");
        }
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        true
    }

    async fn close(&self) -> MessagingResult<()> {
        // Dropping the senders ends every open stream
        self.topics.clear();
        Ok(())
    }
}

#[async_trait]
impl MessageConsumer for InMemoryBroker {
    async fn subscribe(&self, topic: &str) -> MessagingResult<Box<dyn MessageStream>> {
        let receiver = self.sender(topic).subscribe();
        Ok(Box::new(InMemoryStream {
            topic: topic.to_string(),
            receiver,
        }))
    }

    async fn is_connected(&self) -> bool {
        true
    }

    async fn close(&self) -> MessagingResult<()> {
        Ok(())
    }
}

/// Receiving end of an in-memory topic
pub struct InMemoryStream {
    topic: String,
    receiver: broadcast::Receiver<String>,
}

#[async_trait]
impl MessageStream for InMemoryStream {
    async fn next(&mut self) -> MessagingResult<Option<String>> {
        match self.receiver.recv().await {
            Ok(payload) => Ok(Some(payload)),
            Err(RecvError::Closed) => Ok(None),
            Err(RecvError::Lagged(skipped)) => Err(MessagingError::ConsumeFailed(format!(
                "subscriber on {} lagged, {} messages skipped",
                self.topic, skipped
            ))),
        }
    }

    async fn ack(&mut self) -> MessagingResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let broker = InMemoryBroker::default();
        let mut stream = broker.subscribe("houses").await.unwrap();

        broker.publish("houses", "hello").await.unwrap();
        broker.publish("other", "ignored").await.unwrap();

        assert_eq!(stream.next().await.unwrap(), Some("hello".to_string()));
        assert_eq!(broker.subscriber_count("houses"), 1);
    }

    #[tokio::test]
    async fn test_close_ends_streams() {
        let broker = InMemoryBroker::default();
        let mut stream = broker.subscribe("houses").await.unwrap();

        MessageProducer::close(&broker).await.unwrap();
        assert_eq!(stream.next().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lagging_subscriber_reports_error() {
        let broker = InMemoryBroker::new(1);
        let mut stream = broker.subscribe("houses").await.unwrap();

        broker.publish("houses", "a").await.unwrap();
        broker.publish("houses", "b").await.unwrap();

        assert!(stream.next().await.is_err());
        assert_eq!(stream.next().await.unwrap(), Some("b".to_string()));
    }
}
