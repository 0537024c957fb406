//! Messaging configuration

use serde::{Deserialize, Serialize};

/// Messaging backend type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessagingBackend {
    /// NATS - lightweight, high-performance messaging
    Nats,
    /// Kafka - distributed event streaming platform
    Kafka,
    /// In-process broadcast channels (single node, development and tests)
    InMemory,
}

/// NATS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NatsConfig {
    /// NATS server URLs; the first one is used
    pub servers: Vec<String>,

    /// Connection name
    pub connection_name: String,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            connection_name: "house-search".to_string(),
        }
    }
}

/// Kafka configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    /// Kafka bootstrap servers
    pub bootstrap_servers: String,

    /// Client ID
    pub client_id: String,

    /// Consumer group ID
    pub group_id: String,

    /// Enable auto commit
    pub enable_auto_commit: bool,

    /// Auto commit interval in milliseconds
    pub auto_commit_interval_ms: u64,

    /// Session timeout in milliseconds
    pub session_timeout_ms: u64,

    /// Enable SASL authentication
    pub enable_sasl: bool,

    /// SASL mechanism (PLAIN, SCRAM-SHA-256, SCRAM-SHA-512)
    pub sasl_mechanism: Option<String>,

    pub sasl_username: Option<String>,

    pub sasl_password: Option<String>,

    /// Compression type (none, gzip, snappy, lz4, zstd)
    pub compression_type: String,

    /// Message timeout in milliseconds
    pub message_timeout_ms: u64,

    /// Number of retries
    pub retries: u32,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: "localhost:9092".to_string(),
            client_id: "house-search".to_string(),
            group_id: "house-search-indexer".to_string(),
            enable_auto_commit: true,
            auto_commit_interval_ms: 5000,
            session_timeout_ms: 30000,
            enable_sasl: false,
            sasl_mechanism: None,
            sasl_username: None,
            sasl_password: None,
            compression_type: "snappy".to_string(),
            message_timeout_ms: 30000,
            retries: 3,
        }
    }
}

/// Main messaging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Backend to use
    pub backend: MessagingBackend,

    pub nats: NatsConfig,

    pub kafka: KafkaConfig,

    /// Enable messaging system
    pub enabled: bool,

    /// Prefix prepended to every topic; empty for none
    pub topic_prefix: String,

    /// Topic carrying index/delete commands
    pub index_topic: String,

    /// Maximum handler invocations running at once per subscription
    pub max_in_flight: usize,

    /// Buffered messages per in-memory topic
    pub memory_capacity: usize,

    /// Pause after a failed receive before polling again
    pub error_backoff_ms: u64,

    /// Enable metrics
    pub enable_metrics: bool,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            backend: MessagingBackend::InMemory,
            nats: NatsConfig::default(),
            kafka: KafkaConfig::default(),
            enabled: true,
            topic_prefix: String::new(),
            index_topic: "house-index".to_string(),
            max_in_flight: 16,
            memory_capacity: 1024,
            error_backoff_ms: 500,
            enable_metrics: true,
        }
    }
}

impl MessagingConfig {
    /// Get full topic name with prefix
    pub fn full_topic(&self, topic: &str) -> String {
        if self.topic_prefix.is_empty() {
            topic.to_string()
        } else {
            format!("{}.{}", self.topic_prefix, topic)
        }
    }
}
