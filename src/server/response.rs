//! Response envelope shared by every REST endpoint
//!
//! Successful calls answer `{"code": 0, "message": "OK", "data": ...}`.
//! Failures use the HTTP status as `code`, the error text as `message` and
//! `{"error": "<ERROR_CODE>"}` as `data`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Envelope wrapped around every response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Wrap a successful payload
    pub fn ok(data: T) -> Self {
        Self {
            code: 0,
            message: "OK".to_string(),
            data: Some(data),
        }
    }
}

impl ApiResponse<Value> {
    /// Build a failure envelope
    pub fn failure(status: StatusCode, error_code: &str, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            data: Some(json!({ "error": error_code })),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Payload of a list call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub list: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total: u64,
}

/// Payload of a delete call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub id: String,
}
