//! NATS message queue implementation

use crate::messaging::config::NatsConfig;
use crate::messaging::error::{MessagingError, MessagingResult};
use crate::messaging::traits::{MessageConsumer, MessageProducer, MessageStream};
use async_nats::Client;
use async_trait::async_trait;
use futures::StreamExt;

async fn connect(config: &NatsConfig) -> MessagingResult<Client> {
    let server = config.servers.first().ok_or_else(|| {
        MessagingError::ConfigurationError("NATS requires at least one server".to_string())
    })?;

    let client = async_nats::ConnectOptions::new()
        .name(config.connection_name.as_str())
        .connect(server.as_str())
        .await
        .map_err(|e| MessagingError::ConnectionFailed(format!("NATS connection failed: {}", e)))?;

    tracing::info!(server = %server, "Connected to NATS");
    Ok(client)
}

/// NATS producer
pub struct NatsProducer {
    client: Client,
}

impl NatsProducer {
    /// Create a new NATS producer
    pub async fn new(config: &NatsConfig) -> MessagingResult<Self> {
        Ok(Self {
            client: connect(config).await?,
        })
    }
}

#[async_trait]
impl MessageProducer for NatsProducer {
    async fn publish(&self, topic: &str, payload: &str) -> MessagingResult<()> {
        self.client
            .publish(topic.to_string(), payload.to_owned().into_bytes().into())
            .await
            .map_err(|e| MessagingError::PublishFailed(format!("NATS publish failed: {}", e)))?;

        Ok(())
    }

    async fn is_connected(&self) -> bool {
        // The client reconnects on its own; treat an existing client as connected
        true
    }

    async fn close(&self) -> MessagingResult<()> {
        self.client
            .flush()
            .await
            .map_err(|e| MessagingError::PublishFailed(format!("NATS flush failed: {}", e)))
    }
}

/// NATS consumer
pub struct NatsConsumer {
    client: Client,
}

impl NatsConsumer {
    /// Create a new NATS consumer
    pub async fn new(config: &NatsConfig) -> MessagingResult<Self> {
        Ok(Self {
            client: connect(config).await?,
        })
    }
}

#[async_trait]
impl MessageConsumer for NatsConsumer {
    async fn subscribe(&self, topic: &str) -> MessagingResult<Box<dyn MessageStream>> {
        let subscriber = self
            .client
            .subscribe(topic.to_string())
            .await
            .map_err(|e| MessagingError::SubscribeFailed(format!("NATS subscribe failed: {}", e)))?;

        Ok(Box::new(NatsMessageStream { subscriber }))
    }

    async fn is_connected(&self) -> bool {
        true
    }

    async fn close(&self) -> MessagingResult<()> {
        Ok(())
    }
}

/// NATS message stream
pub struct NatsMessageStream {
    subscriber: async_nats::Subscriber,
}

#[async_trait]
impl MessageStream for NatsMessageStream {
    async fn next(&mut self) -> MessagingResult<Option<String>> {
        match self.subscriber.next().await {
            Some(msg) => String::from_utf8(msg.payload.to_vec())
                .map(Some)
                .map_err(|e| MessagingError::InvalidMessage(e.to_string())),
            None => Ok(None),
        }
    }

    async fn ack(&mut self) -> MessagingResult<()> {
        // Core NATS has no acknowledgements
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nats_config() {
        let config = NatsConfig::default();
        assert!(!config.servers.is_empty());
        assert_eq!(config.connection_name, "house-search");
    }

    #[tokio::test]
    async fn test_connect_requires_server() {
        let config = NatsConfig {
            servers: vec![],
            ..Default::default()
        };
        assert!(matches!(
            NatsProducer::new(&config).await,
            Err(MessagingError::ConfigurationError(_))
        ));
    }
}
