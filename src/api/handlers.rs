use crate::api::AppState;
use crate::error::Result;
use crate::indexing::IndexOperation;
use crate::messaging::MessageProducer;
use crate::models::{MultiResult, SearchRequest};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let documents = state.search.index().document_count().await?;

    let messaging_connected = match state.messaging {
        Some(ref messaging) => messaging.is_connected().await,
        None => false,
    };

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        documents,
        messaging_connected,
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub documents: u64,
    pub messaging_connected: bool,
}

/// Search houses; responds with the total hit count and one page of house ids
pub async fn search_houses(
    State(state): State<AppState>,
    Query(request): Query<SearchRequest>,
) -> Result<Json<MultiResult<u64>>> {
    request.validate()?;

    let result = state.search.search(&request).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    pub prefix: String,
    pub size: Option<usize>,
}

/// Autocomplete phrases for a prefix
pub async fn suggest(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> Result<Json<MultiResult<String>>> {
    let result = match params.size {
        Some(size) => state.search.suggest_with_size(&params.prefix, size).await?,
        None => state.search.suggest(&params.prefix).await?,
    };
    Ok(Json(result))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IndexRequestAccepted {
    pub house_id: u64,
    pub operation: IndexOperation,
}

/// Queue a (re)index of one house
pub async fn request_index(
    State(state): State<AppState>,
    Path(house_id): Path<u64>,
) -> Result<(StatusCode, Json<IndexRequestAccepted>)> {
    state.producer.request_index(house_id).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(IndexRequestAccepted {
            house_id,
            operation: IndexOperation::Index,
        }),
    ))
}

/// Queue the removal of one house from the index
pub async fn request_delete(
    State(state): State<AppState>,
    Path(house_id): Path<u64>,
) -> Result<(StatusCode, Json<IndexRequestAccepted>)> {
    state.producer.request_delete(house_id).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(IndexRequestAccepted {
            house_id,
            operation: IndexOperation::Delete,
        }),
    ))
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics() -> (StatusCode, String) {
    (StatusCode::OK, gather_metrics())
}

/// Encode every registered metric family in the text exposition format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
