//! Wire format of index commands

use crate::indexing::error::{IndexingError, IndexingResult};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Operation carried by an [`IndexCommand`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IndexOperation {
    Index,
    Delete,
    /// Any tag this version does not know; never executed
    #[serde(other)]
    Unknown,
}

/// Request to (re)index or remove one house.
///
/// Carries no house data; the consumer re-reads the store when it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexCommand {
    pub id: u64,
    pub operation: IndexOperation,
    #[serde(default)]
    pub attempt: u32,
}

impl IndexCommand {
    pub fn index(id: u64) -> Self {
        Self {
            id,
            operation: IndexOperation::Index,
            attempt: 0,
        }
    }

    pub fn delete(id: u64) -> Self {
        Self {
            id,
            operation: IndexOperation::Delete,
            attempt: 0,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(payload: &str) -> IndexingResult<Self> {
        serde_json::from_str(payload).map_err(|e| IndexingError::MalformedCommand(e.to_string()))
    }
}
