use crate::store::EntryStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub ingest_key: Arc<str>,
    pub store: Arc<dyn EntryStore>,
}

impl AppState {
    pub fn new(ingest_key: impl Into<Arc<str>>, store: Arc<dyn EntryStore>) -> Self {
        Self {
            ingest_key: ingest_key.into(),
            store,
        }
    }
}
