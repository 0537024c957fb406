//! Consumption of index commands

use crate::indexing::command::{IndexCommand, IndexOperation};
use crate::indexing::error::IndexingError;
use crate::indexing::mapper::ProjectionMapper;
use crate::indexing::metrics::INDEXING_METRICS;
use crate::indexing::writer::HouseIndexWriter;
use crate::messaging::MessageHandler;
use crate::search::SuggestionBuilder;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Instant;
use strum::Display;
use tokio::sync::mpsc;

/// Point a command reached before it finished or failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ProcessingStage {
    Received,
    Parsed,
    Mapped,
    MapFailed,
    Written,
    WriteFailed,
}

/// Record sent to the error channel for every failed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexingFailure {
    pub house_id: u64,
    pub operation: IndexOperation,
    pub attempt: u32,
    pub stage: ProcessingStage,
    pub error: IndexingError,
    pub occurred_at: DateTime<Utc>,
}

/// Result of handling one payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    Indexed(u64),
    Deleted(u64),
    /// Payload was not a command
    Dropped,
    /// Command carried an operation this consumer does not execute
    Rejected(u64),
    Failed {
        house_id: u64,
        stage: ProcessingStage,
        error: IndexingError,
    },
}

impl ConsumeOutcome {
    fn label(&self) -> &'static str {
        match self {
            ConsumeOutcome::Indexed(_) => "indexed",
            ConsumeOutcome::Deleted(_) => "deleted",
            ConsumeOutcome::Dropped => "dropped",
            ConsumeOutcome::Rejected(_) => "rejected",
            ConsumeOutcome::Failed { .. } => "failed",
        }
    }
}

/// Applies index commands: projects, adds suggestions and writes documents
pub struct IndexEventConsumer {
    mapper: ProjectionMapper,
    suggester: SuggestionBuilder,
    writer: HouseIndexWriter,
    failures: Option<mpsc::UnboundedSender<IndexingFailure>>,
}

impl IndexEventConsumer {
    pub fn new(
        mapper: ProjectionMapper,
        suggester: SuggestionBuilder,
        writer: HouseIndexWriter,
    ) -> Self {
        Self {
            mapper,
            suggester,
            writer,
            failures: None,
        }
    }

    /// Report failed commands on `failures`
    pub fn with_failure_channel(mut self, failures: mpsc::UnboundedSender<IndexingFailure>) -> Self {
        self.failures = Some(failures);
        self
    }

    /// Decode a payload and apply the command it carries.
    ///
    /// Never panics or returns an error; every problem becomes an outcome.
    pub async fn handle_payload(&self, payload: &str) -> ConsumeOutcome {
        let start = Instant::now();
        tracing::trace!(stage = %ProcessingStage::Received, bytes = payload.len(), "Index command received");

        let command = match IndexCommand::from_json(payload) {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(payload = %payload, error = %e, "Dropping malformed index command");
                INDEXING_METRICS
                    .failures_total
                    .with_label_values(&[ProcessingStage::Received.to_string().as_str(), e.kind()])
                    .inc();
                return self.finish("unknown", start, ConsumeOutcome::Dropped);
            }
        };

        tracing::debug!(
            stage = %ProcessingStage::Parsed,
            house_id = command.id,
            operation = %command.operation,
            attempt = command.attempt,
            "Index command parsed"
        );

        let operation = command.operation.to_string();
        let outcome = match command.operation {
            IndexOperation::Index => self.apply_index(&command).await,
            IndexOperation::Delete => self.apply_delete(&command).await,
            IndexOperation::Unknown => {
                tracing::warn!(house_id = command.id, "Rejecting index command with unknown operation");
                ConsumeOutcome::Rejected(command.id)
            }
        };

        self.finish(&operation, start, outcome)
    }

    async fn apply_index(&self, command: &IndexCommand) -> ConsumeOutcome {
        let mut document = match self.mapper.project(command.id).await {
            Ok(document) => document,
            Err(e) => return self.fail(command, ProcessingStage::MapFailed, e),
        };
        tracing::debug!(stage = %ProcessingStage::Mapped, house_id = command.id, "House mapped");

        self.suggester.apply(&mut document);

        if let Err(e) = self.writer.upsert(&document).await {
            return self.fail(command, ProcessingStage::WriteFailed, e);
        }

        tracing::info!(stage = %ProcessingStage::Written, house_id = command.id, "House indexed");
        ConsumeOutcome::Indexed(command.id)
    }

    async fn apply_delete(&self, command: &IndexCommand) -> ConsumeOutcome {
        if let Err(e) = self.writer.delete(command.id).await {
            return self.fail(command, ProcessingStage::WriteFailed, e);
        }

        tracing::info!(stage = %ProcessingStage::Written, house_id = command.id, "House removed from index");
        ConsumeOutcome::Deleted(command.id)
    }

    fn fail(
        &self,
        command: &IndexCommand,
        stage: ProcessingStage,
        error: IndexingError,
    ) -> ConsumeOutcome {
        tracing::error!(
            house_id = command.id,
            operation = %command.operation,
            stage = %stage,
            error = %error,
            "Index command failed"
        );

        INDEXING_METRICS
            .failures_total
            .with_label_values(&[stage.to_string().as_str(), error.kind()])
            .inc();

        if let Some(ref failures) = self.failures {
            let failure = IndexingFailure {
                house_id: command.id,
                operation: command.operation,
                attempt: command.attempt,
                stage,
                error: error.clone(),
                occurred_at: Utc::now(),
            };
            if failures.send(failure).is_err() {
                tracing::warn!(house_id = command.id, "Failure channel closed");
            }
        }

        ConsumeOutcome::Failed {
            house_id: command.id,
            stage,
            error,
        }
    }

    fn finish(&self, operation: &str, start: Instant, outcome: ConsumeOutcome) -> ConsumeOutcome {
        INDEXING_METRICS
            .commands_total
            .with_label_values(&[operation, outcome.label()])
            .inc();
        INDEXING_METRICS
            .processing_latency
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());
        outcome
    }
}

#[async_trait]
impl MessageHandler for IndexEventConsumer {
    async fn handle(&self, payload: String) {
        self.handle_payload(&payload).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{SearchIndex, TantivySearchIndex};
    use crate::state::InMemoryHouseStore;
    use std::sync::Arc;

    fn consumer() -> (IndexEventConsumer, Arc<TantivySearchIndex>) {
        let index = Arc::new(TantivySearchIndex::in_memory().unwrap());
        let consumer = IndexEventConsumer::new(
            ProjectionMapper::new(Arc::new(InMemoryHouseStore::new())),
            SuggestionBuilder::new(),
            HouseIndexWriter::new(index.clone()),
        );
        (consumer, index)
    }

    #[tokio::test]
    async fn test_malformed_payload_dropped() {
        let (consumer, index) = consumer();

        assert_eq!(consumer.handle_payload("{oops").await, ConsumeOutcome::Dropped);
        assert_eq!(index.document_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_operation_rejected() {
        let (consumer, _) = consumer();

        let outcome = consumer
            .handle_payload(r#"{"id":3,"operation":"PURGE","attempt":0}"#)
            .await;
        assert_eq!(outcome, ConsumeOutcome::Rejected(3));
    }

    #[tokio::test]
    async fn test_missing_house_reported_on_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let (consumer, _) = consumer();
        let consumer = consumer.with_failure_channel(tx);

        let outcome = consumer
            .handle_payload(r#"{"id":11,"operation":"INDEX","attempt":1}"#)
            .await;

        assert_eq!(
            outcome,
            ConsumeOutcome::Failed {
                house_id: 11,
                stage: ProcessingStage::MapFailed,
                error: IndexingError::EntityNotFound(11),
            }
        );

        let failure = rx.recv().await.unwrap();
        assert_eq!(failure.house_id, 11);
        assert_eq!(failure.attempt, 1);
        assert_eq!(failure.stage, ProcessingStage::MapFailed);
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(ProcessingStage::MapFailed.to_string(), "map_failed");
        assert_eq!(ProcessingStage::Written.to_string(), "written");
    }
}
