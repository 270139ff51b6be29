use std::sync::Arc;

use tokio::sync::RwLock;

use crate::db::ModelStore;
use crate::services::providers::ArticleSource;
use crate::services::Recommender;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Engine behind a single-writer / multi-reader lock
    pub engine: Arc<RwLock<Recommender>>,
    pub source: Arc<dyn ArticleSource>,
    pub store: Arc<dyn ModelStore>,
    /// Reload articles from the source before each query
    pub refresh_on_request: bool,
}

impl AppState {
    /// Creates state around an empty engine
    pub fn new(
        source: Arc<dyn ArticleSource>,
        store: Arc<dyn ModelStore>,
        refresh_on_request: bool,
    ) -> Self {
        Self {
            engine: Arc::new(RwLock::new(Recommender::new())),
            source,
            store,
            refresh_on_request,
        }
    }
}
