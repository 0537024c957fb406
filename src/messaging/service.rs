//! Main messaging service

use crate::messaging::config::{MessagingBackend, MessagingConfig};
use crate::messaging::error::{MessagingError, MessagingResult};
use crate::messaging::kafka::{KafkaConsumer, KafkaProducer};
use crate::messaging::memory::InMemoryBroker;
use crate::messaging::metrics::MESSAGING_METRICS;
use crate::messaging::nats::{NatsConsumer, NatsProducer};
use crate::messaging::traits::{MessageConsumer, MessageHandler, MessageProducer};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;

/// Running subscription; dropping the handle stops it as well
pub struct SubscriptionHandle {
    topic: String,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop receiving and wait for in-flight handlers to complete
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::error!(topic = %self.topic, error = %e, "Subscription task failed");
        }
    }
}

/// Unified access to the configured message transport
pub struct MessagingService {
    config: MessagingConfig,
    producer: Option<Arc<dyn MessageProducer>>,
    consumer: Option<Arc<dyn MessageConsumer>>,
}

impl MessagingService {
    /// Connect to the backend selected by the configuration
    pub async fn new(config: MessagingConfig) -> MessagingResult<Self> {
        if !config.enabled {
            tracing::warn!("Messaging disabled; index commands will not be delivered");
            return Ok(Self {
                config,
                producer: None,
                consumer: None,
            });
        }

        let (producer, consumer): (Arc<dyn MessageProducer>, Arc<dyn MessageConsumer>) =
            match config.backend {
                MessagingBackend::Nats => (
                    Arc::new(NatsProducer::new(&config.nats).await?),
                    Arc::new(NatsConsumer::new(&config.nats).await?),
                ),
                MessagingBackend::Kafka => (
                    Arc::new(KafkaProducer::new(config.kafka.clone())?),
                    Arc::new(KafkaConsumer::new(config.kafka.clone())?),
                ),
                MessagingBackend::InMemory => {
                    let broker = Arc::new(InMemoryBroker::new(config.memory_capacity));
                    (broker.clone(), broker)
                }
            };

        if config.enable_metrics {
            crate::messaging::metrics::init_messaging_metrics();
        }

        tracing::info!(backend = ?config.backend, "Messaging service started");

        Ok(Self {
            config,
            producer: Some(producer),
            consumer: Some(consumer),
        })
    }

    /// Build a service over already constructed transport endpoints
    pub fn with_transport(
        config: MessagingConfig,
        producer: Arc<dyn MessageProducer>,
        consumer: Arc<dyn MessageConsumer>,
    ) -> Self {
        Self {
            config,
            producer: Some(producer),
            consumer: Some(consumer),
        }
    }

    pub fn config(&self) -> &MessagingConfig {
        &self.config
    }

    fn backend_name(&self) -> String {
        format!("{:?}", self.config.backend)
    }

    /// Register a handler for every payload arriving on `topic`.
    ///
    /// Each payload runs in its own task; at most `max_in_flight` run at once.
    /// Handler outcomes never stop the subscription.
    pub async fn subscribe(
        &self,
        topic: &str,
        handler: Arc<dyn MessageHandler>,
    ) -> MessagingResult<SubscriptionHandle> {
        let consumer = self
            .consumer
            .as_ref()
            .ok_or_else(|| MessagingError::BackendUnavailable("Messaging disabled".to_string()))?;

        let full_topic = self.config.full_topic(topic);
        let mut stream = consumer.subscribe(&full_topic).await?;

        let max_in_flight = self.config.max_in_flight.max(1);
        let semaphore = Arc::new(Semaphore::new(max_in_flight));
        let backoff = Duration::from_millis(self.config.error_backoff_ms);
        let record_metrics = self.config.enable_metrics;
        let backend = self.backend_name();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        tracing::info!(topic = %full_topic, max_in_flight, "Subscription registered");

        let loop_topic = full_topic.clone();
        let task = tokio::spawn(async move {
            loop {
                let next = tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    next = stream.next() => next,
                };

                match next {
                    Ok(Some(payload)) => {
                        if record_metrics {
                            MESSAGING_METRICS
                                .messages_consumed
                                .with_label_values(&[loop_topic.as_str(), backend.as_str()])
                                .inc();
                        }

                        let permit = match semaphore.clone().acquire_owned().await {
                            Ok(permit) => permit,
                            Err(_) => break,
                        };

                        let handler = handler.clone();
                        let handler_topic = loop_topic.clone();
                        tokio::spawn(async move {
                            let gauge = MESSAGING_METRICS
                                .handlers_in_flight
                                .with_label_values(&[handler_topic.as_str()]);
                            gauge.inc();
                            handler.handle(payload).await;
                            gauge.dec();
                            drop(permit);
                        });

                        if let Err(e) = stream.ack().await {
                            tracing::warn!(topic = %loop_topic, error = %e, "Failed to acknowledge message");
                        }
                    }
                    Ok(None) => {
                        tracing::info!(topic = %loop_topic, "Message stream ended");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(topic = %loop_topic, error = %e, "Failed to receive message");
                        if record_metrics {
                            MESSAGING_METRICS
                                .consume_failures
                                .with_label_values(&[loop_topic.as_str(), backend.as_str()])
                                .inc();
                        }
                        tokio::time::sleep(backoff).await;
                    }
                }
            }

            // Wait for handlers still running
            let _ = semaphore.acquire_many(max_in_flight as u32).await;
            tracing::info!(topic = %loop_topic, "Subscription stopped");
        });

        Ok(SubscriptionHandle {
            topic: full_topic,
            shutdown: shutdown_tx,
            task,
        })
    }
}

#[async_trait]
impl MessageProducer for MessagingService {
    async fn publish(&self, topic: &str, payload: &str) -> MessagingResult<()> {
        let producer = self
            .producer
            .as_ref()
            .ok_or_else(|| MessagingError::BackendUnavailable("Messaging disabled".to_string()))?;

        let full_topic = self.config.full_topic(topic);
        let start = Instant::now();
        let result = producer.publish(&full_topic, payload).await;

        if self.config.enable_metrics {
            let backend_name = self.backend_name();
            let duration = start.elapsed().as_secs_f64();

            if result.is_ok() {
                MESSAGING_METRICS
                    .messages_published
                    .with_label_values(&[full_topic.as_str(), backend_name.as_str()])
                    .inc();

                MESSAGING_METRICS
                    .publish_latency
                    .with_label_values(&[full_topic.as_str(), backend_name.as_str()])
                    .observe(duration);

                MESSAGING_METRICS
                    .message_size
                    .with_label_values(&[full_topic.as_str(), backend_name.as_str()])
                    .observe(payload.len() as f64);
            } else {
                MESSAGING_METRICS
                    .publish_failures
                    .with_label_values(&[full_topic.as_str(), backend_name.as_str()])
                    .inc();
            }
        }

        if let Err(ref e) = result {
            tracing::error!(topic = %full_topic, error = %e, "Publish failed");
        }

        result
    }

    async fn is_connected(&self) -> bool {
        match self.producer {
            Some(ref producer) => producer.is_connected().await,
            None => false,
        }
    }

    async fn close(&self) -> MessagingResult<()> {
        if let Some(ref producer) = self.producer {
            producer.close().await?;
        }

        if let Some(ref consumer) = self.consumer {
            consumer.close().await?;
        }

        Ok(())
    }
}
