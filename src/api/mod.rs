pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::indexing::IndexEventProducer;
use crate::messaging::MessagingService;
use crate::search::SearchService;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
    pub producer: IndexEventProducer,
    pub messaging: Option<Arc<MessagingService>>,
}

impl AppState {
    pub fn new(search: Arc<SearchService>, producer: IndexEventProducer) -> Self {
        Self {
            search,
            producer,
            messaging: None,
        }
    }

    /// Report transport connectivity from this service on `/health`
    pub fn with_messaging(mut self, messaging: Arc<MessagingService>) -> Self {
        self.messaging = Some(messaging);
        self
    }
}
