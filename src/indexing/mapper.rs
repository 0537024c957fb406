//! Projection of stored houses into search documents

use crate::indexing::error::{IndexingError, IndexingResult};
use crate::search::HouseDocument;
use crate::state::HouseStore;
use std::sync::Arc;

/// Reads a house with its detail and tags and merges them into one document
#[derive(Clone)]
pub struct ProjectionMapper {
    store: Arc<dyn HouseStore>,
}

impl ProjectionMapper {
    pub fn new(store: Arc<dyn HouseStore>) -> Self {
        Self { store }
    }

    /// Build the document for a house from the current store state.
    ///
    /// Fails without a partial result when the house or its detail is missing.
    pub async fn project(&self, house_id: u64) -> IndexingResult<HouseDocument> {
        let house = self
            .store
            .get_house(house_id)
            .await?
            .ok_or(IndexingError::EntityNotFound(house_id))?;

        let detail = self
            .store
            .get_detail_by_house_id(house_id)
            .await?
            .ok_or(IndexingError::DetailNotFound(house_id))?;

        let tags = self.store.get_tags_by_house_id(house_id).await?;

        tracing::debug!(house_id, tag_count = tags.len(), "House projected");

        Ok(HouseDocument::from_parts(&house, &detail, &tags))
    }
}
