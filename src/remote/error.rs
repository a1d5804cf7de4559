//! Errors raised by remote data services.

use thiserror::Error;

/// A failed call to the remote data service.
///
/// The store hands these back to the caller unchanged and leaves local state
/// untouched.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request could not be sent or the connection failed.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{url} responded with {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body was not the expected entity.
    #[error("invalid response from {url}: {message}")]
    Decode { url: String, message: String },

    /// An endpoint URL could not be built from the base URL.
    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    /// The service is not reachable.
    #[error("remote service unavailable: {0}")]
    Unavailable(String),
}
