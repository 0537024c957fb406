//! Publication of index commands after store mutations

use crate::indexing::command::IndexCommand;
use crate::messaging::{MessageProducer, MessagingResult};
use std::sync::Arc;

/// Turns store mutations into index commands on the index topic.
///
/// Publishing only hands the command to the transport; it does not wait for
/// the index to change.
#[derive(Clone)]
pub struct IndexEventProducer {
    producer: Arc<dyn MessageProducer>,
    topic: String,
}

impl IndexEventProducer {
    pub fn new(producer: Arc<dyn MessageProducer>, topic: impl Into<String>) -> Self {
        Self {
            producer,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Ask for the house to be (re)indexed from current store state
    pub async fn request_index(&self, house_id: u64) -> MessagingResult<()> {
        self.send(IndexCommand::index(house_id)).await
    }

    /// Ask for the house to be removed from the index
    pub async fn request_delete(&self, house_id: u64) -> MessagingResult<()> {
        self.send(IndexCommand::delete(house_id)).await
    }

    async fn send(&self, command: IndexCommand) -> MessagingResult<()> {
        let payload = command.to_json()?;

        self.producer.publish(&self.topic, &payload).await?;

        tracing::debug!(
            house_id = command.id,
            operation = %command.operation,
            topic = %self.topic,
            "Index command published"
        );
        Ok(())
    }
}
