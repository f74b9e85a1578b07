//! Error types for the API client.
//!
//! # Design
//! A rejected status keeps the whole `HttpResponse` so callers decide whether
//! and how to read the error body (see `notify::ErrorPresenter`). Transport
//! failures carry the fetch capability's own error untouched.

use thiserror::Error;

use crate::http::HttpResponse;

/// Error type produced by `Fetch` implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by `ApiClient` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The fetch capability itself failed (network, TLS, token renewal, ...).
    #[error("transport failed: {0}")]
    Transport(#[source] BoxError),

    /// The server answered with a status the success policy rejects.
    #[error("unexpected HTTP status {}", .0.status)]
    Status(HttpResponse),

    /// A response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The client was built from an incomplete or invalid configuration.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl ApiError {
    /// The rejected response, if this is a status error.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            ApiError::Status(response) => Some(response),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.response().map(|response| response.status)
    }

    pub fn into_response(self) -> Result<HttpResponse, Self> {
        match self {
            ApiError::Status(response) => Ok(response),
            other => Err(other),
        }
    }
}
