//! Asynchronous indexing pipeline
//!
//! Store mutations publish [`IndexCommand`]s; the [`IndexEventConsumer`]
//! re-reads the house, builds the document with its suggestions and writes it
//! to the index, keyed by house id so replays and reordering are harmless.
//!
//! ```text
//! IndexEventProducer ──► topic ──► IndexEventConsumer
//!                                     │
//!                   ProjectionMapper ─┼─ SuggestionBuilder ─► HouseIndexWriter
//!                                     │
//!                          failures ──► mpsc::UnboundedSender<IndexingFailure>
//! ```

mod command;
mod consumer;
mod error;
mod mapper;
mod metrics;
mod producer;
mod writer;

pub use command::{IndexCommand, IndexOperation};
pub use consumer::{ConsumeOutcome, IndexEventConsumer, IndexingFailure, ProcessingStage};
pub use error::{IndexingError, IndexingResult};
pub use mapper::ProjectionMapper;
pub use metrics::{init_indexing_metrics, INDEXING_METRICS};
pub use producer::IndexEventProducer;
pub use writer::HouseIndexWriter;
