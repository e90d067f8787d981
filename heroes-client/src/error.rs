//! Client error types.
//!
//! These never reach callers of [`HeroClient`](crate::HeroClient): every
//! operation converts them into a fallback value and a notification.

use heroes_model::HeroId;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the remote collection.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote rejected request: {status} {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("hero not found: id={0}")]
    NotFound(HeroId),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network unreachable, timeout, connection reset.
    Transport,
    /// The remote answered with a non-success status.
    Rejection,
    /// The response body does not match the expected shape.
    Decode,
}

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::Http(e) if e.is_decode() => FailureKind::Decode,
            ClientError::Http(e) if e.status().is_some() => FailureKind::Rejection,
            ClientError::Http(_) | ClientError::Config(_) => FailureKind::Transport,
            ClientError::Status { .. } | ClientError::NotFound(_) => FailureKind::Rejection,
            ClientError::Decode(_) => FailureKind::Decode,
        }
    }

    /// Returns true if the remote reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        match self {
            ClientError::NotFound(_) => true,
            ClientError::Status { status, .. } => *status == reqwest::StatusCode::NOT_FOUND,
            ClientError::Http(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }
}
