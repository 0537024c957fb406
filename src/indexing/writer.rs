//! Index writes keyed by house id

use crate::indexing::error::{IndexingError, IndexingResult};
use crate::search::{HouseDocument, SearchIndex};
use std::sync::Arc;

/// Upserts and deletes house documents
#[derive(Clone)]
pub struct HouseIndexWriter {
    index: Arc<dyn SearchIndex>,
}

impl HouseIndexWriter {
    pub fn new(index: Arc<dyn SearchIndex>) -> Self {
        Self { index }
    }

    /// Replace whatever is indexed for this house with `document`
    pub async fn upsert(&self, document: &HouseDocument) -> IndexingResult<()> {
        self.index.upsert_document(document).await?;
        Ok(())
    }

    /// Remove the document of a house; `DocumentNotFound` when none is indexed
    pub async fn delete(&self, house_id: u64) -> IndexingResult<()> {
        if self.index.delete_document(house_id).await? {
            Ok(())
        } else {
            Err(IndexingError::DocumentNotFound(house_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::TantivySearchIndex;

    #[tokio::test]
    async fn test_delete_missing_document() {
        let writer = HouseIndexWriter::new(Arc::new(TantivySearchIndex::in_memory().unwrap()));

        assert_eq!(
            writer.delete(77).await.unwrap_err(),
            IndexingError::DocumentNotFound(77)
        );
    }
}
