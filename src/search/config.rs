//! Search configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Search index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Path to the index directory; `None` keeps the index in RAM
    pub index_path: Option<PathBuf>,

    /// Index writer heap size in bytes (default: 50MB)
    pub writer_heap_size: usize,

    /// Deepest hit a query may reach; `offset + limit` never exceeds it
    pub max_results: usize,

    /// Number of completions returned when the caller gives no size
    pub default_suggest_size: usize,

    /// Candidates requested per wanted completion, to survive deduplication
    pub suggest_overfetch: usize,

    /// Append tokens from descriptive text after the four fixed phrases
    pub tokenize_suggestions: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_path: None,
            writer_heap_size: 50_000_000,
            max_results: 1000,
            default_suggest_size: 5,
            suggest_overfetch: 4,
            tokenize_suggestions: false,
        }
    }
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn index_path(mut self, path: PathBuf) -> Self {
        self.config.index_path = Some(path);
        self
    }

    pub fn in_memory(mut self) -> Self {
        self.config.index_path = None;
        self
    }

    pub fn writer_heap_size(mut self, size: usize) -> Self {
        self.config.writer_heap_size = size;
        self
    }

    pub fn max_results(mut self, max: usize) -> Self {
        self.config.max_results = max;
        self
    }

    pub fn default_suggest_size(mut self, size: usize) -> Self {
        self.config.default_suggest_size = size;
        self
    }

    pub fn suggest_overfetch(mut self, factor: usize) -> Self {
        self.config.suggest_overfetch = factor.max(1);
        self
    }

    pub fn tokenize_suggestions(mut self, enabled: bool) -> Self {
        self.config.tokenize_suggestions = enabled;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let config = SearchConfigBuilder::new()
            .index_path(PathBuf::from("/tmp/houses"))
            .suggest_overfetch(0)
            .default_suggest_size(8)
            .build();

        assert_eq!(config.index_path, Some(PathBuf::from("/tmp/houses")));
        assert_eq!(config.suggest_overfetch, 1);
        assert_eq!(config.default_suggest_size, 8);
    }

    #[test]
    fn test_defaults_keep_index_in_ram() {
        let config = SearchConfig::default();
        assert!(config.index_path.is_none());
        assert_eq!(config.default_suggest_size, 5);
    }
}
