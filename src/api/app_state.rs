use crate::observability::AppMetrics;
use crate::services::ask::AskService;
use crate::services::fetcher::DirectoryFetcher;
use std::sync::Arc;

/// Application state containing all shared services
#[derive(Clone)]
pub struct AppState {
    /// Question answering pipeline
    pub ask_service: Arc<dyn AskService>,
    /// Member directory fetcher (cached) and raw page passthrough
    pub fetcher: Arc<dyn DirectoryFetcher>,
    /// Request and upstream counters
    pub metrics: Arc<AppMetrics>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("ask_service", &"Arc<dyn AskService>")
            .field("fetcher", &self.fetcher.source_description())
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl AppState {
    /// Create new application state
    pub fn new(
        ask_service: Box<dyn AskService>,
        fetcher: Arc<dyn DirectoryFetcher>,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            ask_service: Arc::from(ask_service),
            fetcher,
            metrics,
        }
    }
}
