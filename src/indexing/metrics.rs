//! Prometheus metrics for the indexing pipeline

use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

pub struct IndexingMetrics {
    /// Commands handled, by operation and outcome
    pub commands_total: CounterVec,

    /// Failed commands, by stage and error kind
    pub failures_total: CounterVec,

    /// Time from receipt to outcome
    pub processing_latency: HistogramVec,
}

lazy_static! {
    pub static ref INDEXING_METRICS: IndexingMetrics = IndexingMetrics {
        commands_total: register_counter_vec!(
            "indexing_commands_total",
            "Total number of index commands handled",
            &["operation", "outcome"]
        )
        .unwrap(),

        failures_total: register_counter_vec!(
            "indexing_failures_total",
            "Total number of failed index commands",
            &["stage", "kind"]
        )
        .unwrap(),

        processing_latency: register_histogram_vec!(
            "indexing_processing_latency_seconds",
            "Index command processing latency in seconds",
            &["operation"]
        )
        .unwrap(),
    };
}

/// Initialize indexing metrics
pub fn init_indexing_metrics() {
    lazy_static::initialize(&INDEXING_METRICS);
}
