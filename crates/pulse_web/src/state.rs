use pulse_core::{ArticleStore, IngestStatus};
use pulse_ingest::Ingestor;
use std::sync::Arc;
use tokio::sync::RwLock;

pub struct AppState {
    pub store: Arc<dyn ArticleStore>,
    pub ingestor: Arc<Ingestor>,
    pub status: Arc<RwLock<IngestStatus>>,
}

impl AppState {
    pub fn new(store: Arc<dyn ArticleStore>, ingestor: Arc<Ingestor>) -> Self {
        Self {
            store,
            ingestor,
            status: Arc::new(RwLock::new(IngestStatus::Idle)),
        }
    }
}
