//! Error types for PostKit

use thiserror::Error;

/// Errors that can occur while resolving a post link
///
/// None of these are fatal: [`Resolver::resolve`](crate::Resolver::resolve)
/// turns every variant into `None`. They exist so callers that want a
/// diagnostic can use [`Resolver::try_resolve`](crate::Resolver::try_resolve).
#[derive(Debug, Error)]
pub enum ResolveError {
    /// URL does not match any supported post shape
    #[error("URL not recognized as a supported post link")]
    Unrecognized,

    /// Failed to build HTTP client
    #[error("Failed to create HTTP client")]
    ClientBuildError(#[source] reqwest::Error),

    /// Request did not complete within the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// Failed to connect to server
    #[error("Failed to connect to server")]
    ConnectError(#[source] reqwest::Error),

    /// Other request error
    #[error("Request failed: {0}")]
    RequestError(String),

    /// Response body exceeded the size cap
    #[error("Response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// API answered with a non-200 status
    #[error("Unexpected HTTP status {status}")]
    Status { status: u16 },

    /// API answered 200 but the body did not match the expected schema
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Every API version was tried and none produced a usable response
    #[error("No API version answered for {url}")]
    AllVersionsFailed { url: String },

    /// External transcoder could not convert a video
    #[error("Transcoding failed: {0}")]
    Transcode(String),
}

impl ResolveError {
    /// Create an error from a reqwest error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ResolveError::Timeout
        } else if err.is_connect() {
            ResolveError::ConnectError(err)
        } else {
            ResolveError::RequestError(err.to_string())
        }
    }

    /// True when the URL simply was not a post link (no I/O happened)
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, ResolveError::Unrecognized)
    }
}

impl From<serde_json::Error> for ResolveError {
    fn from(err: serde_json::Error) -> Self {
        ResolveError::Decode(err.to_string())
    }
}
