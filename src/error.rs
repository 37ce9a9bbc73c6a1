//! Error taxonomy for the session layer.
//!
//! ERROR HANDLING
//! ==============
//! Expired access tokens are absorbed by the client when a refresh succeeds.
//! An unrecoverable session surfaces as `SessionInvalid`, wrapping the error
//! that ended it, so callers can still show a message. Everything else is
//! passed through untouched.

use crate::events::InvalidReason;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No response was received at all.
    #[error("transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a status the caller asked to treat as failure.
    #[error("unexpected status {status}")]
    Status { status: u16, body: String },

    /// The refresh endpoint rejected the refresh token.
    #[error("refresh exchange rejected: status {status}")]
    RefreshRejected { status: u16, body: String },

    /// A response body could not be decoded.
    #[error("response decode failed: {0}")]
    Decode(String),

    #[error("session store failed: {0}")]
    Store(#[from] StoreError),

    /// Session state was cleared; `source` is the failure that ended it.
    #[error("session invalidated ({reason}): {source}")]
    SessionInvalid {
        reason: InvalidReason,
        #[source]
        source: Box<SessionError>,
    },

    #[error("config parse failed: {0}")]
    Config(String),
}

impl SessionError {
    /// HTTP status carried by this error, looking through `SessionInvalid`.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::RefreshRejected { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::SessionInvalid { source, .. } => source.status(),
            Self::Decode(_) | Self::Store(_) | Self::Config(_) => None,
        }
    }

    #[must_use]
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, Self::SessionInvalid { .. })
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
