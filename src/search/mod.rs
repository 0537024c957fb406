//! House search backed by an embedded Tantivy index
//!
//! - **Documents**: denormalized [`HouseDocument`]s keyed by house id
//! - **Suggestions**: weighted completion phrases built per document
//! - **Queries**: client requests translated into [`StructuredQuery`] values
//!   and executed through the [`SearchIndex`] trait
//!
//! ```text
//! SearchRequest ──► QueryBuilder ──► StructuredQuery ──► SearchIndex::query
//! prefix ─────────► SearchService::suggest ─────────────► SearchIndex::suggest_completions
//! ```

mod config;
mod document;
mod error;
mod index;
mod query;
mod service;
mod suggest;

pub use config::{SearchConfig, SearchConfigBuilder};
pub use document::{build_house_schema, keys, HouseDocument, HouseFields, SuggestionEntry};
pub use error::{SearchError, SearchResult};
pub use index::{CompletionOption, QueryPage, SearchIndex, SuggestEntry, TantivySearchIndex};
pub use query::{
    FilterClause, HouseSortField, KeywordMatch, QueryBuilder, SortOrder, SortSpec,
    StructuredQuery, TermValue,
};
pub use service::SearchService;
pub use suggest::{
    SimpleTokenizer, SuggestionBuilder, TermTokenizer, Token, DISTRICT_WEIGHT,
    SUBWAY_LINE_WEIGHT, SUBWAY_STATION_WEIGHT, TITLE_WEIGHT, TOKEN_WEIGHT,
};
