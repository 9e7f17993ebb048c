//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for every backend and the facade.
#[derive(Error, Debug)]
pub enum CacheError {
    /// No backend is registered under the requested name
    #[error("The specified backend (\"{0}\") does not exist")]
    UnknownBackend(String),

    /// A runtime capability the backend depends on is missing
    #[error("Backend unavailable, missing {0}")]
    BackendUnavailable(String),

    /// A required option was not supplied
    #[error("Missing required option: {0}")]
    MissingOption(&'static str),

    /// A declared option carries a value of the wrong shape
    #[error("Invalid value for option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    /// The cache directory could not be created or accessed
    #[error("The cache directory {} does not exist and couldn't be created: {reason}", .path.display())]
    Directory { path: PathBuf, reason: String },

    /// The record could not be written
    #[error("Failed to write the cache record for \"{key}\": {reason}")]
    Write { key: String, reason: String },

    /// The record is stale or was never written
    #[error("The cache record for the key \"{0}\" is no longer valid")]
    ExpiredOrMissing(String),

    /// The key is empty or not present in a keyed store
    #[error("The key \"{0}\" is invalid")]
    InvalidKey(String),

    /// The stored envelope could not be deserialized
    #[error("The data for the key \"{key}\" could not be deserialized: {reason}")]
    CorruptRecord { key: String, reason: String },

    /// A record or file could not be removed
    #[error("{target} could not be removed: {reason}")]
    Delete { target: String, reason: String },

    /// Invalid request data (HTTP service only)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error (HTTP service only)
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::ExpiredOrMissing(_) | CacheError::InvalidKey(_) => StatusCode::NOT_FOUND,
            CacheError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;
