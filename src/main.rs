use anyhow::Context;
use house_search::{
    api::{build_router, AppState},
    config::Config,
    indexing::{
        init_indexing_metrics, HouseIndexWriter, IndexEventConsumer, IndexEventProducer,
        IndexingFailure, ProjectionMapper,
    },
    messaging::{MessageProducer, MessagingService},
    search::{SearchIndex, SearchService, SuggestionBuilder, TantivySearchIndex},
    state::create_store,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower_http::timeout::TimeoutLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    init_tracing(&config);

    tracing::info!("Starting house-search v{}", env!("CARGO_PKG_VERSION"));

    if config.observability.prometheus_enabled {
        init_indexing_metrics();
        tracing::info!("Prometheus metrics initialized");
    }

    // House store
    tracing::info!(backend = ?config.state.backend, "Initializing house store");
    let store = create_store(&config.state).context("house store")?;

    // Search index
    let index: Arc<dyn SearchIndex> =
        Arc::new(TantivySearchIndex::new(&config.search).context("search index")?);
    let search = Arc::new(SearchService::new(index.clone(), config.search.clone()));
    tracing::info!(
        documents = index.document_count().await.unwrap_or_default(),
        "Search index ready"
    );

    // Messaging
    let messaging = Arc::new(
        MessagingService::new(config.messaging.clone())
            .await
            .context("messaging")?,
    );
    let index_topic = config.messaging.index_topic.clone();
    let producer = IndexEventProducer::new(messaging.clone(), index_topic.clone());

    // Indexing pipeline
    let (failure_tx, failure_rx) = mpsc::unbounded_channel();
    let consumer = IndexEventConsumer::new(
        ProjectionMapper::new(store),
        SuggestionBuilder::from_config(&config.search),
        HouseIndexWriter::new(index),
    )
    .with_failure_channel(failure_tx);
    tokio::spawn(report_failures(failure_rx));

    let subscription = if config.messaging.enabled {
        let handle = messaging.subscribe(&index_topic, Arc::new(consumer)).await?;
        tracing::info!(topic = %handle.topic(), "Index consumer subscribed");
        Some(handle)
    } else {
        tracing::warn!("Messaging disabled; index consumer not started");
        None
    };

    // HTTP API
    let app_state = AppState::new(search, producer).with_messaging(messaging.clone());
    let app = build_router(app_state).layer(TimeoutLayer::new(Duration::from_secs(
        config.server.request_timeout_secs,
    )));

    let http_addr = config.http_addr();
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Search: http://{}/v1/houses/search", http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down gracefully...");

    if let Some(handle) = subscription {
        handle.shutdown().await;
    }
    if let Err(e) = messaging.close().await {
        tracing::warn!(error = %e, "Failed to close messaging");
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "house_search={},tower_http=info",
            config.observability.log_level
        ))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn report_failures(mut failures: mpsc::UnboundedReceiver<IndexingFailure>) {
    while let Some(failure) = failures.recv().await {
        tracing::warn!(
            house_id = failure.house_id,
            operation = %failure.operation,
            attempt = failure.attempt,
            stage = %failure.stage,
            kind = failure.error.kind(),
            occurred_at = %failure.occurred_at,
            "Index command not applied"
        );
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
