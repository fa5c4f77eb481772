use crate::samples::SampleError;
use crate::store::StoreError;
use axum::{http::StatusCode, Json};
use serde_json::{Map, Value};

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    /// Body key the message is reported under: `error` or `response`.
    pub key: &'static str,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            key: "error",
        }
    }

    pub fn unauthorized() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: "Unauthorized".to_string(),
            key: "error",
        }
    }

    pub fn unprocessable(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: err.to_string(),
            key: "error",
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
            key: "response",
        }
    }
}

impl From<SampleError> for AppError {
    fn from(err: SampleError) -> Self {
        Self::unprocessable(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::upstream(err.client_message())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let mut body = Map::new();
        body.insert(self.key.to_string(), Value::String(self.message));
        (self.status, Json(Value::Object(body))).into_response()
    }
}
