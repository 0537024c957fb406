//! Message transport for index commands
//!
//! Producers publish text payloads to topics; subscriptions are registered
//! explicitly with [`MessagingService::subscribe`] and dispatch every payload
//! to a [`MessageHandler`].
//!
//! ```text
//!  MessageProducer ──► Kafka | NATS | in-memory ──► MessageStream
//!                                                        │
//!                                  MessagingService::subscribe loop
//!                                                        │
//!                                            MessageHandler::handle
//! ```

mod config;
mod error;
mod kafka;
mod memory;
mod metrics;
mod nats;
mod service;
mod traits;

pub use config::{KafkaConfig, MessagingBackend, MessagingConfig, NatsConfig};
pub use error::{MessagingError, MessagingResult};
pub use kafka::{KafkaConsumer, KafkaProducer};
pub use memory::InMemoryBroker;
pub use metrics::{init_messaging_metrics, MESSAGING_METRICS};
pub use nats::{NatsConsumer, NatsProducer};
pub use service::{MessagingService, SubscriptionHandle};
pub use traits::{MessageConsumer, MessageHandler, MessageProducer, MessageStream};
