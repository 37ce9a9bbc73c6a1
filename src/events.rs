//! Session lifecycle signal.
//!
//! SYSTEM CONTEXT
//! ==============
//! The HTTP layer never navigates. When a session becomes unrecoverable it
//! clears the store, emits `SessionEvent::Invalidated`, and returns an error.
//! The application shell subscribes and performs the redirect.

use std::fmt;

use tokio::sync::broadcast;

const DEFAULT_EVENT_CAPACITY: usize = 16;

/// Why a session could not be recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// A 401 arrived and no refresh token was stored.
    MissingRefresh,
    /// The refresh exchange itself failed.
    RefreshFailed,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRefresh => f.write_str("no refresh token stored"),
            Self::RefreshFailed => f.write_str("refresh exchange failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new credential pair was stored.
    Established,
    /// The access token was replaced after a refresh exchange.
    Refreshed,
    /// Session state was cleared because it could not be recovered.
    Invalidated(InvalidReason),
    /// The user logged out explicitly.
    LoggedOut,
}

impl SessionEvent {
    /// Events after which the user must be sent to the login view.
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Invalidated(_) | Self::LoggedOut)
    }
}

/// Broadcast hub shared by every clone of the session client.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_EVENT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
