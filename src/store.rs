//! Outbound writes to the GraphQL document store.

use crate::models::DailyEntry;
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    StatusCode,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const ADD_ENTRY_MUTATION: &str = r#"
mutation ($entries: [EntryInput]) {
  addEntry(entries: $entries) {
    heartRate {
      value
      timestamp
    }
    steps {
      value
      timestamp
    }
    date
  }
}
"#;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store rejected the entry: {}", .messages.join("; "))]
    Rejected { messages: Vec<String> },
    #[error("store responded with HTTP {status}")]
    Status { status: u16, body: String },
    #[error("store request timed out")]
    Timeout,
    #[error("store request failed: {0}")]
    Transport(String),
    #[error("store response could not be decoded: {0}")]
    Decode(String),
    #[error("store client misconfigured: {0}")]
    Configuration(String),
}

impl StoreError {
    /// Message shown to the caller; the first upstream error when there is one.
    pub fn client_message(&self) -> String {
        match self {
            Self::Rejected { messages } if !messages.is_empty() => messages[0].clone(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn add_entry(&self, entry: &DailyEntry) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct GraphQlStore {
    client: reqwest::Client,
    endpoint: String,
}

impl GraphQlStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|err| StoreError::Configuration(format!("invalid store key: {err}")))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| StoreError::Configuration(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl EntryStore for GraphQlStore {
    async fn add_entry(&self, entry: &DailyEntry) -> Result<(), StoreError> {
        let payload = json!({
            "query": ADD_ENTRY_MUTATION,
            "variables": { "entries": [entry] },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_transport_error)?;
        debug!(status = status.as_u16(), "store responded");

        interpret_response(status, &body)
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// GraphQL servers report failures in an `errors` list, often with a 200.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<(), StoreError> {
    let parsed = serde_json::from_str::<GraphQlResponse>(body);

    if let Ok(GraphQlResponse { errors: Some(errors) }) = &parsed {
        if !errors.is_empty() {
            return Err(StoreError::Rejected {
                messages: errors.iter().map(|error| error.message.clone()).collect(),
            });
        }
    }

    if !status.is_success() {
        return Err(StoreError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    parsed
        .map(|_| ())
        .map_err(|err| StoreError::Decode(err.to_string()))
}

fn map_transport_error(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout
    } else {
        StoreError::Transport(err.to_string())
    }
}
