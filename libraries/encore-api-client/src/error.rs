//! Error types for the Encore API client.

use thiserror::Error;

/// Errors that can occur when talking to the Encore API.
#[derive(Error, Debug)]
pub enum ApiClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Missing or rejected access token
    #[error("Authentication required")]
    AuthRequired,

    /// Track unknown to the server
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    /// Invalid base URL
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),
}

/// Result type for API client operations.
pub type Result<T> = std::result::Result<T, ApiClientError>;
