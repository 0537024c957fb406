//! Messaging trait abstractions
//!
//! Payloads travel as UTF-8 text; encoding is the caller's concern.

use crate::messaging::error::MessagingResult;
use async_trait::async_trait;

/// Message producer trait
#[async_trait]
pub trait MessageProducer: Send + Sync {
    /// Publish a text payload to a topic
    async fn publish(&self, topic: &str, payload: &str) -> MessagingResult<()>;

    /// Check if the producer is connected
    async fn is_connected(&self) -> bool;

    /// Close the producer connection
    async fn close(&self) -> MessagingResult<()>;
}

/// Message consumer trait
#[async_trait]
pub trait MessageConsumer: Send + Sync {
    /// Subscribe to a topic and receive its payloads
    async fn subscribe(&self, topic: &str) -> MessagingResult<Box<dyn MessageStream>>;

    /// Check if the consumer is connected
    async fn is_connected(&self) -> bool;

    /// Close the consumer connection
    async fn close(&self) -> MessagingResult<()>;
}

/// Message stream trait for consuming messages
#[async_trait]
pub trait MessageStream: Send {
    /// Next payload; `None` once the stream has ended
    async fn next(&mut self) -> MessagingResult<Option<String>>;

    /// Acknowledge message processing
    async fn ack(&mut self) -> MessagingResult<()>;
}

/// Receives payloads dispatched by a subscription
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, payload: String);
}
