//! Error taxonomy of the indexing pipeline

use crate::error::AppError;
use crate::search::SearchError;

/// Result type for indexing operations
pub type IndexingResult<T> = std::result::Result<T, IndexingError>;

/// Errors raised while turning a command into an index change
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexingError {
    /// The house no longer exists in the store
    #[error("House {0} not found")]
    EntityNotFound(u64),

    /// The house exists but has no detail row
    #[error("Detail for house {0} not found")]
    DetailNotFound(u64),

    /// Delete requested for a house that is not indexed
    #[error("No indexed document for house {0}")]
    DocumentNotFound(u64),

    /// Payload could not be decoded into a command
    #[error("Malformed index command: {0}")]
    MalformedCommand(String),

    /// The search index rejected or failed the operation
    #[error("Search index unavailable: {0}")]
    IndexUnavailable(String),

    /// The house store failed
    #[error("House store error: {0}")]
    Store(String),
}

impl IndexingError {
    /// Stable label used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            IndexingError::EntityNotFound(_) => "entity_not_found",
            IndexingError::DetailNotFound(_) => "detail_not_found",
            IndexingError::DocumentNotFound(_) => "document_not_found",
            IndexingError::MalformedCommand(_) => "malformed_command",
            IndexingError::IndexUnavailable(_) => "index_unavailable",
            IndexingError::Store(_) => "store",
        }
    }
}

impl From<SearchError> for IndexingError {
    fn from(err: SearchError) -> Self {
        IndexingError::IndexUnavailable(err.to_string())
    }
}

impl From<AppError> for IndexingError {
    fn from(err: AppError) -> Self {
        IndexingError::Store(err.to_string())
    }
}

impl From<IndexingError> for AppError {
    fn from(err: IndexingError) -> Self {
        match err {
            IndexingError::EntityNotFound(_)
            | IndexingError::DetailNotFound(_)
            | IndexingError::DocumentNotFound(_) => AppError::NotFound(err.to_string()),
            IndexingError::MalformedCommand(msg) => AppError::Validation(msg),
            IndexingError::IndexUnavailable(msg) => AppError::IndexUnavailable(msg),
            IndexingError::Store(msg) => AppError::Database(msg),
        }
    }
}
