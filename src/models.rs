use serde::{Deserialize, Serialize};

/// Newline-delimited values and timestamps, aligned by position.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RawSample {
    pub values: String,
    pub timestamps: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    pub value: i64,
    pub timestamp: String,
}

/// One day of readings as written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    pub heart_rate: Vec<Sample>,
    pub steps: Vec<Sample>,
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub heart: RawSample,
    pub steps: RawSample,
    pub date: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestSummary {
    pub date: String,
    pub heart: String,
    pub steps: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub response: IngestSummary,
}
