//! Feed client error types.

use std::fmt;
use std::sync::Arc;

/// Errors from fetching and decoding a remote gzip dataset.
#[derive(Debug)]
pub enum FeedError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// Server returned a non-success status code
    Status { status: u16, message: String },

    /// Gzip stream was corrupt or truncated
    Decompress(std::io::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// Failure from a fetch shared with other sessions through the cache
    Shared(Arc<FeedError>),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Http(e) => write!(f, "HTTP error: {e}"),
            FeedError::Status { status, message } => {
                write!(f, "feed returned {status}: {message}")
            }
            FeedError::Decompress(e) => write!(f, "gzip decode error: {e}"),
            FeedError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            FeedError::Shared(inner) => fmt::Display::fmt(inner, f),
        }
    }
}

impl std::error::Error for FeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeedError::Http(e) => Some(e),
            FeedError::Decompress(e) => Some(e),
            FeedError::Shared(inner) => std::error::Error::source(inner.as_ref()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        FeedError::Http(err)
    }
}

impl From<Arc<FeedError>> for FeedError {
    fn from(err: Arc<FeedError>) -> Self {
        FeedError::Shared(err)
    }
}
