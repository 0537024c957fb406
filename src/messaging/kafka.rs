//! Kafka message queue implementation

use crate::messaging::config::KafkaConfig;
use crate::messaging::error::{MessagingError, MessagingResult};
use crate::messaging::traits::{MessageConsumer, MessageProducer, MessageStream};
use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::Message;
use std::sync::Arc;
use std::time::Duration;

fn apply_sasl(client_config: &mut ClientConfig, config: &KafkaConfig) {
    if !config.enable_sasl {
        return;
    }

    if let (Some(mechanism), Some(username), Some(password)) = (
        &config.sasl_mechanism,
        &config.sasl_username,
        &config.sasl_password,
    ) {
        client_config
            .set("security.protocol", "SASL_SSL")
            .set("sasl.mechanism", mechanism)
            .set("sasl.username", username)
            .set("sasl.password", password);
    } else {
        tracing::warn!("SASL enabled but credentials are incomplete; connecting without SASL");
    }
}

/// Kafka producer
pub struct KafkaProducer {
    producer: Arc<FutureProducer>,
    config: KafkaConfig,
}

impl KafkaProducer {
    /// Create a new Kafka producer
    pub fn new(config: KafkaConfig) -> MessagingResult<Self> {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("client.id", &config.client_id)
            .set("compression.type", &config.compression_type)
            .set("message.timeout.ms", config.message_timeout_ms.to_string())
            .set("retries", config.retries.to_string());
        apply_sasl(&mut client_config, &config);

        let producer: FutureProducer = client_config.create().map_err(|e| {
            MessagingError::ConnectionFailed(format!("Kafka producer creation failed: {}", e))
        })?;

        tracing::info!(servers = %config.bootstrap_servers, "Kafka producer created");

        Ok(Self {
            producer: Arc::new(producer),
            config,
        })
    }
}

#[async_trait]
impl MessageProducer for KafkaProducer {
    async fn publish(&self, topic: &str, payload: &str) -> MessagingResult<()> {
        let record: FutureRecord<'_, str, str> = FutureRecord::to(topic).payload(payload);

        self.producer
            .send(record, Duration::from_millis(self.config.message_timeout_ms))
            .await
            .map_err(|(e, _)| MessagingError::PublishFailed(format!("Kafka publish failed: {}", e)))?;

        Ok(())
    }

    async fn is_connected(&self) -> bool {
        // librdkafka reconnects internally; there is no connected flag to read
        true
    }

    async fn close(&self) -> MessagingResult<()> {
        self.producer
            .flush(Duration::from_millis(self.config.message_timeout_ms))
            .map_err(|e| MessagingError::PublishFailed(format!("Kafka flush failed: {}", e)))
    }
}

/// Kafka consumer
pub struct KafkaConsumer {
    config: KafkaConfig,
}

impl KafkaConsumer {
    /// Validate the consumer configuration; one group member is created per subscription
    pub fn new(config: KafkaConfig) -> MessagingResult<Self> {
        if config.group_id.trim().is_empty() {
            return Err(MessagingError::ConfigurationError(
                "Kafka consumer requires a group_id".to_string(),
            ));
        }
        Ok(Self { config })
    }

    fn create_consumer(&self) -> MessagingResult<StreamConsumer> {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &self.config.bootstrap_servers)
            .set("group.id", &self.config.group_id)
            .set("client.id", &self.config.client_id)
            .set("enable.auto.commit", self.config.enable_auto_commit.to_string())
            .set(
                "auto.commit.interval.ms",
                self.config.auto_commit_interval_ms.to_string(),
            )
            .set("session.timeout.ms", self.config.session_timeout_ms.to_string());
        apply_sasl(&mut client_config, &self.config);

        client_config.create().map_err(|e| {
            MessagingError::ConnectionFailed(format!("Kafka consumer creation failed: {}", e))
        })
    }
}

#[async_trait]
impl MessageConsumer for KafkaConsumer {
    async fn subscribe(&self, topic: &str) -> MessagingResult<Box<dyn MessageStream>> {
        let consumer = self.create_consumer()?;
        consumer
            .subscribe(&[topic])
            .map_err(|e| MessagingError::SubscribeFailed(format!("Kafka subscribe failed: {}", e)))?;

        tracing::info!(topic, group = %self.config.group_id, "Kafka subscription started");

        Ok(Box::new(KafkaMessageStream {
            consumer: Arc::new(consumer),
            manual_commit: !self.config.enable_auto_commit,
        }))
    }

    async fn is_connected(&self) -> bool {
        true
    }

    async fn close(&self) -> MessagingResult<()> {
        Ok(())
    }
}

/// Kafka message stream
pub struct KafkaMessageStream {
    consumer: Arc<StreamConsumer>,
    manual_commit: bool,
}

#[async_trait]
impl MessageStream for KafkaMessageStream {
    async fn next(&mut self) -> MessagingResult<Option<String>> {
        let message = self
            .consumer
            .recv()
            .await
            .map_err(|e| MessagingError::ConsumeFailed(format!("Kafka recv failed: {}", e)))?;

        match message.payload_view::<str>() {
            Some(Ok(text)) => Ok(Some(text.to_string())),
            Some(Err(e)) => Err(MessagingError::InvalidMessage(format!(
                "non UTF-8 payload at offset {}: {}",
                message.offset(),
                e
            ))),
            // Tombstones carry no command
            None => Ok(Some(String::new())),
        }
    }

    async fn ack(&mut self) -> MessagingResult<()> {
        if !self.manual_commit {
            return Ok(());
        }
        self.consumer
            .commit_consumer_state(CommitMode::Async)
            .map_err(|e| MessagingError::ConsumeFailed(format!("Kafka commit failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kafka_config() {
        let config = KafkaConfig::default();
        assert_eq!(config.client_id, "house-search");
        assert_eq!(config.compression_type, "snappy");
    }

    #[test]
    fn test_consumer_requires_group() {
        let config = KafkaConfig {
            group_id: " ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            KafkaConsumer::new(config),
            Err(MessagingError::ConfigurationError(_))
        ));
    }
}
