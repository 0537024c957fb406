//! Autocomplete phrase generation for house documents

use crate::search::config::SearchConfig;
use crate::search::document::{HouseDocument, SuggestionEntry};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;

pub const TITLE_WEIGHT: u32 = 30;
pub const DISTRICT_WEIGHT: u32 = 20;
pub const SUBWAY_LINE_WEIGHT: u32 = 15;
pub const SUBWAY_STATION_WEIGHT: u32 = 15;
pub const TOKEN_WEIGHT: u32 = 10;

lazy_static! {
    static ref WORD_PATTERN: Regex =
        Regex::new(r"[\p{L}\p{N}]+").expect("word pattern is a valid regex");
}

/// A term produced by a tokenizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub term: String,
    pub numeric: bool,
}

impl Token {
    pub fn new(term: impl Into<String>, numeric: bool) -> Self {
        Self {
            term: term.into(),
            numeric,
        }
    }
}

/// Splits free text into terms
pub trait TermTokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Lowercasing word tokenizer based on Unicode letter/digit runs
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTokenizer;

impl TermTokenizer for SimpleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        WORD_PATTERN
            .find_iter(&text.to_lowercase())
            .map(|m| {
                let term = m.as_str();
                Token::new(term, term.chars().all(char::is_numeric))
            })
            .collect()
    }
}

/// Derives weighted completion phrases from a document
#[derive(Clone, Default)]
pub struct SuggestionBuilder {
    tokenizer: Option<Arc<dyn TermTokenizer>>,
}

impl SuggestionBuilder {
    /// Builder producing only the four fixed phrases
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder that also appends tokens from the descriptive fields
    pub fn with_tokenizer(tokenizer: Arc<dyn TermTokenizer>) -> Self {
        Self {
            tokenizer: Some(tokenizer),
        }
    }

    /// Fixed phrases only, unless `tokenize_suggestions` is set
    pub fn from_config(config: &SearchConfig) -> Self {
        if config.tokenize_suggestions {
            Self::with_tokenizer(Arc::new(SimpleTokenizer))
        } else {
            Self::new()
        }
    }

    /// Compute the phrases for a document.
    ///
    /// The first four entries are always title, district, subway line and
    /// subway station, in that order, even when a phrase is empty.
    pub fn build(&self, doc: &HouseDocument) -> Vec<SuggestionEntry> {
        let mut entries = vec![
            SuggestionEntry::new(doc.title.clone(), TITLE_WEIGHT),
            SuggestionEntry::new(doc.district.clone(), DISTRICT_WEIGHT),
            SuggestionEntry::new(doc.subway_line_name.clone(), SUBWAY_LINE_WEIGHT),
            SuggestionEntry::new(doc.subway_station_name.clone(), SUBWAY_STATION_WEIGHT),
        ];

        if let Some(tokenizer) = &self.tokenizer {
            let mut seen = HashSet::new();
            let sources = [
                &doc.title,
                &doc.layout_desc,
                &doc.round_service,
                &doc.description,
            ];

            for text in sources {
                for token in tokenizer.tokenize(text) {
                    if token.numeric
                        || token.term.trim().is_empty()
                        || token.term.chars().count() <= 2
                    {
                        continue;
                    }
                    if seen.insert(token.term.clone()) {
                        entries.push(SuggestionEntry::new(token.term, TOKEN_WEIGHT));
                    }
                }
            }
        }

        entries
    }

    /// Replace the document's phrases with freshly computed ones
    pub fn apply(&self, doc: &mut HouseDocument) {
        doc.suggests = self.build(doc);
    }
}

impl std::fmt::Debug for SuggestionBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionBuilder")
            .field("tokenizer", &self.tokenizer.is_some())
            .finish()
    }
}
