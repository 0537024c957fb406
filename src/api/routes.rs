use crate::api::{handlers, AppState};
use axum::{
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health and metrics
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // Queries
        .route("/v1/houses/search", get(handlers::search_houses))
        .route("/v1/houses/suggest", get(handlers::suggest))
        // Index maintenance
        .route(
            "/v1/houses/:id/index",
            put(handlers::request_index).delete(handlers::request_delete),
        )
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}
