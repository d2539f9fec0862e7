//! Typed errors returned by the engine
//!
//! Bad filter or order input is never an error: those clauses are dropped
//! by the parser and the predicate builder. Only the cases below surface
//! to callers.
//!
//! # Example
//!
//! ```rust,ignore
//! match service.delete_by_id("42").await {
//!     Ok(()) => {}
//!     Err(CrudError::NotFound { id, .. }) => println!("nothing to delete for {}", id),
//!     Err(e) => eprintln!("delete failed: {}", e),
//! }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;
use thiserror::Error;

use crate::server::response::ApiResponse;

/// The store call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Count,
    Fetch,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreOperation::Count => "count",
            StoreOperation::Fetch => "fetch",
            StoreOperation::Insert => "insert",
            StoreOperation::Update => "update",
            StoreOperation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by [`CrudOperations`](crate::core::service::CrudOperations)
#[derive(Debug, Error)]
pub enum CrudError {
    /// Missing id, absent record or unparseable pagination input
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A delete matched no row
    #[error("{resource} with id '{id}' not found")]
    NotFound { resource: String, id: String },

    /// The store rejected the call; never retried
    #[error("store {operation} failed: {source}")]
    Store {
        operation: StoreOperation,
        #[source]
        source: anyhow::Error,
    },
}

impl CrudError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CrudError::InvalidInput {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        CrudError::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn store(operation: StoreOperation, source: anyhow::Error) -> Self {
        CrudError::Store { operation, source }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CrudError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            CrudError::NotFound { .. } => StatusCode::NOT_FOUND,
            CrudError::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CrudError::InvalidInput { .. } => "INVALID_INPUT",
            CrudError::NotFound { .. } => "RECORD_NOT_FOUND",
            CrudError::Store { .. } => "STORE_FAILURE",
        }
    }
}

impl IntoResponse for CrudError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ApiResponse::failure(status, self.error_code(), self.to_string());
        (status, body).into_response()
    }
}
