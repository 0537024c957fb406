//! Search index abstraction and its Tantivy implementation

use crate::search::config::SearchConfig;
use crate::search::document::{build_house_schema, HouseDocument, HouseFields};
use crate::search::error::{SearchError, SearchResult};
use crate::search::query::{FilterClause, SortOrder, StructuredQuery, TermValue};
use async_trait::async_trait;
use std::ops::Bound;
use std::sync::Arc;
use tantivy::collector::{Count, TopDocs};
use tantivy::directory::MmapDirectory;
use tantivy::query::{
    BooleanQuery, EmptyQuery, Occur, Query, QueryParser, RangeQuery, RegexQuery, TermQuery,
};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::{DocAddress, Index, IndexReader, IndexWriter, Order, ReloadPolicy, Searcher};
use tantivy::{TantivyDocument, Term};
use tokio::sync::RwLock;

/// One page of query results plus the total hit count
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPage {
    pub total: usize,
    pub documents: Vec<HouseDocument>,
}

/// A completion candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOption {
    pub text: String,
    pub weight: u32,
}

/// Suggestion entries an index can return.
///
/// Only `Completion` entries are used for prefix autocomplete; the other
/// shapes come from term and phrase suggesters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuggestEntry {
    Completion(Vec<CompletionOption>),
    Term(Vec<String>),
    Phrase(Vec<String>),
}

/// Storage and retrieval of house documents
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Insert a document, replacing any document with the same house id
    async fn upsert_document(&self, document: &HouseDocument) -> SearchResult<()>;

    /// Remove a document; returns whether one existed
    async fn delete_document(&self, house_id: u64) -> SearchResult<bool>;

    async fn get_document(&self, house_id: u64) -> SearchResult<Option<HouseDocument>>;

    async fn document_count(&self) -> SearchResult<u64>;

    async fn query(&self, query: &StructuredQuery) -> SearchResult<QueryPage>;

    /// Completion candidates whose phrase starts with `prefix`
    async fn suggest_completions(
        &self,
        field: &str,
        prefix: &str,
        size: usize,
    ) -> SearchResult<Vec<SuggestEntry>>;
}

/// Embedded Tantivy index
pub struct TantivySearchIndex {
    index: Index,
    fields: HouseFields,
    writer: Arc<RwLock<IndexWriter>>,
    reader: IndexReader,
}

impl TantivySearchIndex {
    /// Open or create the index described by the configuration
    pub fn new(config: &SearchConfig) -> SearchResult<Self> {
        let schema = build_house_schema();

        let index = match &config.index_path {
            Some(path) => {
                std::fs::create_dir_all(path).map_err(|e| {
                    SearchError::IndexInitFailed(format!(
                        "Failed to create index directory: {}",
                        e
                    ))
                })?;
                let directory = MmapDirectory::open(path)?;
                Index::open_or_create(directory, schema).map_err(|e| {
                    SearchError::IndexInitFailed(format!("Failed to open index: {}", e))
                })?
            }
            None => Index::create_in_ram(schema),
        };

        let fields = HouseFields::resolve(&index.schema())?;

        let writer = index
            .writer(config.writer_heap_size)
            .map_err(|e| SearchError::IndexInitFailed(format!("Failed to create writer: {}", e)))?;

        // Reloaded explicitly after every commit so writes are visible at once
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::IndexInitFailed(format!("Failed to create reader: {}", e)))?;

        tracing::info!(
            path = ?config.index_path,
            "Initialized house search index"
        );

        Ok(Self {
            index,
            fields,
            writer: Arc::new(RwLock::new(writer)),
            reader,
        })
    }

    /// In-RAM index with default settings
    pub fn in_memory() -> SearchResult<Self> {
        Self::new(&SearchConfig::default())
    }

    fn field(&self, name: &str) -> SearchResult<Field> {
        self.index
            .schema()
            .get_field(name)
            .map_err(|e| SearchError::SchemaError(format!("unknown field {}: {}", name, e)))
    }

    fn id_term(&self, house_id: u64) -> Term {
        Term::from_field_u64(self.fields.house_id, house_id)
    }

    /// Drop every operation staged since the last commit
    fn discard_staged(&self, writer: &mut IndexWriter) {
        if let Err(rollback) = writer.rollback() {
            tracing::error!(error = %rollback, "Failed to roll back index writer");
        }
    }

    fn commit(&self, writer: &mut IndexWriter) -> SearchResult<()> {
        if let Err(e) = writer.commit() {
            self.discard_staged(writer);
            return Err(SearchError::IndexingFailed(format!("Failed to commit: {}", e)));
        }

        self.reader.reload()?;
        Ok(())
    }

    fn load(&self, searcher: &Searcher, address: DocAddress) -> SearchResult<HouseDocument> {
        let doc: TantivyDocument = searcher
            .doc(address)
            .map_err(|e| SearchError::SearchFailed(format!("Failed to retrieve doc: {}", e)))?;

        let house_id = doc
            .get_first(self.fields.house_id)
            .and_then(|v| v.as_u64())
            .unwrap_or_default();

        let source = doc
            .get_first(self.fields.source)
            .and_then(|v| v.as_str())
            .ok_or_else(|| SearchError::CorruptDocument {
                id: house_id,
                reason: "missing source".to_string(),
            })?;

        serde_json::from_str(source).map_err(|e| SearchError::CorruptDocument {
            id: house_id,
            reason: e.to_string(),
        })
    }

    fn translate(&self, query: &StructuredQuery) -> SearchResult<Box<dyn Query>> {
        // A blank keyword matches nothing
        if query.keyword.text.trim().is_empty() {
            return Ok(Box::new(EmptyQuery));
        }

        let keyword_fields = query
            .keyword
            .fields
            .iter()
            .map(|name| self.field(name))
            .collect::<SearchResult<Vec<_>>>()?;

        let parser = QueryParser::for_index(&self.index, keyword_fields);
        let (keyword_query, errors) = parser.parse_query_lenient(&query.keyword.text);
        if !errors.is_empty() {
            tracing::debug!(
                keyword = %query.keyword.text,
                errors = errors.len(),
                "Keyword parsed leniently"
            );
        }

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Must, keyword_query)];

        for filter in &query.filters {
            match filter {
                FilterClause::Term { field, value } => {
                    let field = self.field(field)?;
                    let term = match value {
                        TermValue::Text(text) => Term::from_field_text(field, text),
                        TermValue::Int(number) => Term::from_field_i64(field, *number),
                    };
                    clauses.push((
                        Occur::Must,
                        Box::new(TermQuery::new(term, IndexRecordOption::Basic)),
                    ));
                }
                FilterClause::Range { field, gte, lte } => {
                    // Every document carries the numeric fields, so an open range is a no-op
                    if gte.is_none() && lte.is_none() {
                        continue;
                    }
                    let lower = gte.map_or(Bound::Unbounded, Bound::Included);
                    let upper = lte.map_or(Bound::Unbounded, Bound::Included);
                    clauses.push((
                        Occur::Must,
                        Box::new(RangeQuery::new_i64_bounds(field.to_string(), lower, upper)),
                    ));
                }
            }
        }

        Ok(Box::new(BooleanQuery::new(clauses)))
    }
}

#[async_trait]
impl SearchIndex for TantivySearchIndex {
    async fn upsert_document(&self, document: &HouseDocument) -> SearchResult<()> {
        let tantivy_doc = self.fields.to_tantivy_doc(document)?;

        let mut writer = self.writer.write().await;
        // The staged delete must not reach a commit without its replacement
        writer.delete_term(self.id_term(document.house_id));
        if let Err(e) = writer.add_document(tantivy_doc) {
            self.discard_staged(&mut writer);
            return Err(SearchError::IndexingFailed(format!(
                "Failed to add document: {}",
                e
            )));
        }
        self.commit(&mut writer)?;

        tracing::debug!(house_id = document.house_id, "Document upserted");
        Ok(())
    }

    async fn delete_document(&self, house_id: u64) -> SearchResult<bool> {
        let mut writer = self.writer.write().await;

        let term_query = TermQuery::new(self.id_term(house_id), IndexRecordOption::Basic);
        let existing = self
            .reader
            .searcher()
            .search(&term_query, &Count)
            .map_err(|e| SearchError::DeletionFailed(e.to_string()))?;

        if existing == 0 {
            return Ok(false);
        }

        writer.delete_term(self.id_term(house_id));
        self.commit(&mut writer)
            .map_err(|e| SearchError::DeletionFailed(e.to_string()))?;

        tracing::debug!(house_id, "Document deleted");
        Ok(true)
    }

    async fn get_document(&self, house_id: u64) -> SearchResult<Option<HouseDocument>> {
        let searcher = self.reader.searcher();
        let term_query = TermQuery::new(self.id_term(house_id), IndexRecordOption::Basic);

        let hits = searcher
            .search(&term_query, &TopDocs::with_limit(1))
            .map_err(|e| SearchError::SearchFailed(e.to_string()))?;

        hits.into_iter()
            .next()
            .map(|(_, address)| self.load(&searcher, address))
            .transpose()
    }

    async fn document_count(&self) -> SearchResult<u64> {
        Ok(self.reader.searcher().num_docs())
    }

    async fn query(&self, query: &StructuredQuery) -> SearchResult<QueryPage> {
        let tantivy_query = self.translate(query)?;
        let searcher = self.reader.searcher();

        if query.limit == 0 {
            let total = searcher
                .search(&*tantivy_query, &Count)
                .map_err(|e| SearchError::SearchFailed(format!("Count failed: {}", e)))?;
            return Ok(QueryPage {
                total,
                documents: Vec::new(),
            });
        }

        let order = match query.sort.order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };
        let top_docs = TopDocs::with_limit(query.limit)
            .and_offset(query.offset)
            .order_by_fast_field::<i64>(query.sort.field.index_field(), order);

        let (total, hits) = searcher
            .search(&*tantivy_query, &(Count, top_docs))
            .map_err(|e| SearchError::SearchFailed(format!("Search execution failed: {}", e)))?;

        let documents = hits
            .into_iter()
            .map(|(_, address)| self.load(&searcher, address))
            .collect::<SearchResult<Vec<_>>>()?;

        Ok(QueryPage { total, documents })
    }

    async fn suggest_completions(
        &self,
        field: &str,
        prefix: &str,
        size: usize,
    ) -> SearchResult<Vec<SuggestEntry>> {
        if size == 0 {
            return Ok(Vec::new());
        }

        let prefix = prefix.to_lowercase();
        let pattern = format!("{}.*", regex::escape(&prefix));
        let regex_query = RegexQuery::from_pattern(&pattern, self.field(field)?)
            .map_err(|e| SearchError::QueryParsingFailed(e.to_string()))?;

        let searcher = self.reader.searcher();
        let hits = searcher
            .search(&regex_query, &TopDocs::with_limit(size))
            .map_err(|e| SearchError::SearchFailed(e.to_string()))?;

        let mut options = Vec::new();
        for (_, address) in hits {
            let document = self.load(&searcher, address)?;
            options.extend(
                document
                    .suggests
                    .into_iter()
                    .filter(|entry| {
                        !entry.input.trim().is_empty()
                            && entry.input.to_lowercase().starts_with(&prefix)
                    })
                    .map(|entry| CompletionOption {
                        text: entry.input,
                        weight: entry.weight,
                    }),
            );
        }

        options.sort_by(|a, b| b.weight.cmp(&a.weight));
        options.truncate(size);

        Ok(vec![SuggestEntry::Completion(options)])
    }
}
