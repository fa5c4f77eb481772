use crate::handlers;
use crate::state::AppState;
use axum::{routing::any, Router};

pub const INGEST_PATH: &str = "/api/health";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(INGEST_PATH, any(handlers::ingest))
        .with_state(state)
}
