//! Guarded navigation over a history stack.
//!
//! DESIGN
//! ======
//! Every entry that becomes current (push, back, forward) is run through a
//! fresh `GuardCheck`. A redirect replaces the entry that failed the check,
//! so going back never lands on a page the guard refused. Redirect targets
//! are guarded too; the hop limit only matters if the route table ever makes
//! two guards point at each other.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::guard::{GuardCheck, GuardState};
use crate::history::History;
use crate::routes::route_access;
use crate::store::SessionStore;

const MAX_REDIRECT_HOPS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// The requested path renders.
    Rendered { path: String },
    /// The requested path was replaced by `to`.
    Redirected { from: String, to: String },
}

impl NavigationOutcome {
    /// Path that ended up current.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Rendered { path } => path,
            Self::Redirected { to, .. } => to,
        }
    }
}

pub struct Navigator {
    store: Arc<dyn SessionStore>,
    history: Mutex<History>,
}

impl Navigator {
    /// Start at `initial`, guarding it like any other navigation.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>, initial: &str) -> Self {
        let navigator = Self { store, history: Mutex::new(History::new(initial)) };
        {
            let mut history = navigator.lock();
            navigator.settle(&mut history);
        }
        navigator
    }

    /// Path currently rendered.
    #[must_use]
    pub fn current(&self) -> String {
        self.lock().current().to_owned()
    }

    /// Snapshot of the history stack.
    #[must_use]
    pub fn history(&self) -> History {
        self.lock().clone()
    }

    /// Navigate to `path`, pushing a new history entry.
    pub fn navigate(&self, path: &str) -> NavigationOutcome {
        let mut history = self.lock();
        history.push(path);
        self.settle(&mut history)
    }

    /// Go back one entry. Returns `None` at the start of history.
    pub fn back(&self) -> Option<NavigationOutcome> {
        let mut history = self.lock();
        history.back()?;
        Some(self.settle(&mut history))
    }

    /// Go forward one entry. Returns `None` at the end of history.
    pub fn forward(&self) -> Option<NavigationOutcome> {
        let mut history = self.lock();
        history.forward()?;
        Some(self.settle(&mut history))
    }

    fn lock(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Guard the current entry, replacing it until a guard allows it.
    fn settle(&self, history: &mut History) -> NavigationOutcome {
        let requested = history.current().to_owned();
        for _ in 0..MAX_REDIRECT_HOPS {
            let current = history.current().to_owned();
            let mut check = GuardCheck::new(route_access(&current));
            match check.run(self.store.as_ref()) {
                GuardState::Redirected { to } => {
                    debug!(from = %current, to, "navigation redirected");
                    history.replace(to);
                }
                _ => break,
            }
        }

        let landed = history.current().to_owned();
        if landed == requested {
            NavigationOutcome::Rendered { path: landed }
        } else {
            NavigationOutcome::Redirected { from: requested, to: landed }
        }
    }
}

#[cfg(test)]
#[path = "navigator_test.rs"]
mod tests;
