use crate::errors::AppError;
use crate::models::{DailyEntry, IngestRequest, IngestResponse, IngestSummary};
use crate::samples::{anchor_date, normalize, to_iso, SampleError};
use crate::state::AppState;
use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::{HeaderMap, Method},
    Json,
};
use tracing::{debug, error, info};

pub const KEY_HEADER: &str = "x-key";
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Validates one sync from the device and writes it to the store as a daily entry.
///
/// The body is only read once the method and key have been accepted.
pub async fn ingest(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<IngestResponse>, AppError> {
    if method != Method::POST {
        debug!(%method, "rejected ingest: method not allowed");
        return Err(AppError::bad_request("Bad request"));
    }

    if !is_authorized(&headers, &state.ingest_key) {
        debug!("rejected ingest: bad {KEY_HEADER} header");
        return Err(AppError::unauthorized());
    }

    let body = to_bytes(body, MAX_BODY_BYTES).await.map_err(|err| {
        debug!("rejected ingest: unreadable body: {err}");
        AppError::bad_request(format!("Bad request: {err}"))
    })?;
    let payload: IngestRequest = serde_json::from_slice(&body).map_err(|err| {
        debug!("rejected ingest: malformed body: {err}");
        AppError::bad_request(format!("Bad request: {err}"))
    })?;

    let entry = build_entry(&payload).map_err(|err| {
        debug!("rejected ingest: {err}");
        AppError::from(err)
    })?;

    let response = to_response(&entry);
    info!("steps: {} items", response.response.steps);
    info!("heart rate: {}", response.response.heart);
    debug!(?entry, "daily entry");

    if let Err(err) = state.store.add_entry(&entry).await {
        error!("failed to write daily entry to store: {err:?}");
        return Err(err.into());
    }
    info!(date = %entry.date, "transferred heart rate and steps to store");

    Ok(Json(response))
}

fn is_authorized(headers: &HeaderMap, ingest_key: &str) -> bool {
    headers
        .get(KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|key| key == ingest_key)
}

fn build_entry(payload: &IngestRequest) -> Result<DailyEntry, SampleError> {
    let steps = normalize(&payload.steps)?;
    let heart_rate = normalize(&payload.heart)?;
    let date = anchor_date(&payload.date)?;

    Ok(DailyEntry {
        heart_rate,
        steps,
        date: to_iso(date),
    })
}

// Zero-step samples are stored but not counted as activity.
fn to_response(entry: &DailyEntry) -> IngestResponse {
    let active_steps = entry.steps.iter().filter(|sample| sample.value != 0).count();

    IngestResponse {
        response: IngestSummary {
            date: entry.date.clone(),
            heart: format!("{} items", entry.heart_rate.len()),
            steps: active_steps.to_string(),
        },
    }
}
