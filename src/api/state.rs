use std::sync::Arc;

use crate::application::{DocumentService, IndexService, SearchService};
use crate::domain::ports::{DocumentStore, Embedder, IndexLifecycle};
use crate::infrastructure::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<DocumentService>,
    pub search: Arc<SearchService>,
    pub index: Arc<IndexService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn DocumentStore>,
        lifecycle: Arc<dyn IndexLifecycle>,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            documents: Arc::new(DocumentService::new(embedder.clone(), store.clone())),
            search: Arc::new(SearchService::new(
                embedder,
                store,
                config.search.default_top_k,
            )),
            index: Arc::new(IndexService::new(lifecycle)),
            config,
        }
    }
}
