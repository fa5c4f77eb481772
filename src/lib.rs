pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod samples;
pub mod state;
pub mod store;

pub use app::{router, INGEST_PATH};
pub use config::Config;
pub use state::AppState;
pub use store::{EntryStore, GraphQlStore, StoreError};
