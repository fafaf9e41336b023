//! Errors raised at the fetch boundary
//!
//! Normalization and filtering never fail on missing data, so everything
//! here originates from the network or from an unparseable body.

use thiserror::Error;

/// A failed search or work fetch
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, connect, timeout, body read)
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The body was not the JSON structure we expected
    #[error("malformed payload from {url}: {source}")]
    MalformedPayload {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// URL of the request that failed
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::MalformedPayload { url, .. } => url,
        }
    }

    /// True for a 404 from the catalog
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 404, .. })
    }
}
