//! Lookup error types.

use crate::feed::FeedError;

/// Errors that can occur while loading route and stop lookup data.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// A lookup table could not be read from disk
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A lookup table was not valid JSON of the expected shape
    #[error("failed to parse {path}: {message}")]
    Json { path: String, message: String },

    /// Downloading the stop registry failed
    #[error("stop registry unavailable: {0}")]
    Feed(#[from] FeedError),

    /// Cache operation failed
    #[error("cache error: {message}")]
    Cache { message: String },
}
