//! Search and autocomplete over the house index

use crate::models::{MultiResult, SearchRequest};
use crate::search::config::SearchConfig;
use crate::search::document::keys;
use crate::search::error::SearchResult;
use crate::search::index::{SearchIndex, SuggestEntry};
use crate::search::query::{QueryBuilder, StructuredQuery};
use std::collections::HashSet;
use std::sync::Arc;

/// Client-facing search operations
#[derive(Clone)]
pub struct SearchService {
    index: Arc<dyn SearchIndex>,
    config: SearchConfig,
}

impl SearchService {
    pub fn new(index: Arc<dyn SearchIndex>, config: SearchConfig) -> Self {
        Self { index, config }
    }

    pub fn index(&self) -> &Arc<dyn SearchIndex> {
        &self.index
    }

    /// Run a filtered, sorted, paginated search and return matching house ids
    pub async fn search(&self, request: &SearchRequest) -> SearchResult<MultiResult<u64>> {
        let start_time = std::time::Instant::now();

        let mut query = QueryBuilder::build(request);
        self.clamp_window(&mut query);

        let page = self.index.query(&query).await?;
        let ids: Vec<u64> = page.documents.iter().map(|doc| doc.house_id).collect();

        tracing::debug!(
            city = %request.city_en_name,
            total = page.total,
            returned = ids.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "House search executed"
        );

        Ok(MultiResult::new(page.total, ids))
    }

    /// Cap the page size and keep `offset + limit` inside `max_results`.
    ///
    /// A page past the window becomes a count-only query: the total is still
    /// reported, the page is empty.
    fn clamp_window(&self, query: &mut StructuredQuery) {
        let max_results = self.config.max_results;
        let page_index = if query.limit == 0 { 0 } else { query.offset / query.limit };

        query.limit = query.limit.min(max_results);
        query.offset = page_index.saturating_mul(query.limit);

        if query.offset.saturating_add(query.limit) > max_results {
            tracing::debug!(
                offset = query.offset,
                limit = query.limit,
                max_results,
                "Requested page beyond result window"
            );
            query.offset = 0;
            query.limit = 0;
        }
    }

    /// Autocomplete with the configured default size
    pub async fn suggest(&self, prefix: &str) -> SearchResult<MultiResult<String>> {
        self.suggest_with_size(prefix, self.config.default_suggest_size)
            .await
    }

    /// Up to `size` distinct completion phrases for a prefix, in no particular order
    pub async fn suggest_with_size(
        &self,
        prefix: &str,
        size: usize,
    ) -> SearchResult<MultiResult<String>> {
        if size == 0 {
            return Ok(MultiResult::empty());
        }

        let fetch = size.saturating_mul(self.config.suggest_overfetch.max(1));
        let entries = self
            .index
            .suggest_completions(keys::SUGGEST, prefix, fetch)
            .await?;

        let mut phrases = HashSet::new();
        'entries: for entry in entries {
            let options = match entry {
                SuggestEntry::Completion(options) => options,
                SuggestEntry::Term(_) | SuggestEntry::Phrase(_) => continue,
            };

            for option in options {
                phrases.insert(option.text);
                if phrases.len() >= size {
                    break 'entries;
                }
            }
        }

        let results: Vec<String> = phrases.into_iter().collect();
        Ok(MultiResult::new(results.len(), results))
    }
}
