// Error types for gistview.
// Covers GitHub API failures, payload decoding, and configuration errors.

use std::sync::Arc;

use thiserror::Error;

/// Broad error category reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or transport failure (including HTTP error statuses).
    Fetch,
    /// Payload could not be parsed into a record or an image.
    Decode,
    /// Bad configuration or local I/O.
    Config,
}

#[derive(Error, Debug)]
pub enum GistError {
    #[error("GitHub API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error of a fetch whose outcome is shared by several waiters.
    #[error(transparent)]
    Shared(Arc<GistError>),

    #[error("{0}")]
    Other(String),
}

impl GistError {
    /// Classify this error as a fetch, decode, or config failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GistError::Api(e) if e.is_decode() => ErrorKind::Decode,
            GistError::Api(_)
            | GistError::InvalidUrl { .. }
            | GistError::NotFound(_)
            | GistError::RateLimited { .. }
            | GistError::Http { .. }
            | GistError::Other(_) => ErrorKind::Fetch,
            GistError::Json(_) | GistError::Image(_) => ErrorKind::Decode,
            GistError::Config(_) | GistError::Io(_) => ErrorKind::Config,
            GistError::Shared(inner) => inner.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GistError>;
