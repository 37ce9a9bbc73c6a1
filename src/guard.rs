//! Route guard: presence-based gate evaluated before a view mounts.
//!
//! SYSTEM CONTEXT
//! ==============
//! The guard reads the store synchronously and never touches the network.
//! It checks that an access token is present, not that it is valid: an
//! expired token passes here and is recovered later by the session client's
//! refresh-on-401. Adding expiry checks here would duplicate that path.

use tracing::trace;

use crate::routes::{HOME_PATH, LOGIN_PATH};
use crate::store::SessionStore;

/// Which variant of the guard wraps a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// Requires an access token; anonymous users go to `/login`.
    Protected,
    /// Anonymous only (landing, login, signup); signed-in users go to `/app`.
    PublicOnly,
    /// Rendered for everyone without a check.
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Redirect, replacing the current history entry.
    Redirect(&'static str),
}

/// Pure decision table for one navigation.
#[must_use]
pub fn decide(access: RouteAccess, has_access_token: bool) -> GuardDecision {
    match (access, has_access_token) {
        (RouteAccess::Protected, false) => GuardDecision::Redirect(LOGIN_PATH),
        (RouteAccess::PublicOnly, true) => GuardDecision::Redirect(HOME_PATH),
        _ => GuardDecision::Allow,
    }
}

/// Per-navigation guard state. `Allowed` and `Redirected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Unknown,
    Checking,
    Allowed,
    Redirected { to: &'static str },
}

impl GuardState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Allowed | Self::Redirected { .. })
    }
}

/// One run of the guard for one navigation target.
#[derive(Debug, Clone)]
pub struct GuardCheck {
    access: RouteAccess,
    state: GuardState,
}

impl GuardCheck {
    #[must_use]
    pub fn new(access: RouteAccess) -> Self {
        Self { access, state: GuardState::Unknown }
    }

    #[must_use]
    pub fn access(&self) -> RouteAccess {
        self.access
    }

    #[must_use]
    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Drive the check to a terminal state. Once terminal, later calls return
    /// the same state without reading the store again.
    pub fn run(&mut self, store: &dyn SessionStore) -> GuardState {
        if self.state.is_terminal() {
            return self.state;
        }
        self.state = GuardState::Checking;
        let has_access_token = store.access().is_some();
        self.state = match decide(self.access, has_access_token) {
            GuardDecision::Allow => GuardState::Allowed,
            GuardDecision::Redirect(to) => GuardState::Redirected { to },
        };
        trace!(access = ?self.access, has_access_token, state = ?self.state, "route guard evaluated");
        self.state
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
