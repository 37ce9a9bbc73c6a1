//! Application shell: wires the session client to navigation.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session client reports an unrecoverable session on `SessionEvents`
//! and never navigates on its own. The shell owns the one listener that
//! turns `Invalidated` and `LoggedOut` into a redirect to `/login`.
//!
//! If the listener falls behind the channel, the skipped events are gone.
//! It then reads the store instead: no access token means the session ended
//! somewhere in the gap, and the redirect happens anyway.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::client::SessionClient;
use crate::navigator::{NavigationOutcome, Navigator};
use crate::routes::LOGIN_PATH;

pub struct AppShell {
    client: SessionClient,
    navigator: Arc<Navigator>,
}

impl AppShell {
    /// Build a shell whose navigator starts at `initial_path`.
    #[must_use]
    pub fn new(client: SessionClient, initial_path: &str) -> Self {
        let navigator = Arc::new(Navigator::new(client.store().clone(), initial_path));
        Self { client, navigator }
    }

    #[must_use]
    pub fn client(&self) -> &SessionClient {
        &self.client
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    /// Shortcut for [`Navigator::navigate`].
    pub fn navigate(&self, path: &str) -> NavigationOutcome {
        self.navigator.navigate(path)
    }

    /// Spawn the session listener. The subscription is taken before this
    /// returns, so no event emitted afterwards is missed. The task exits when
    /// every sender is dropped.
    #[must_use]
    pub fn spawn_session_listener(&self) -> JoinHandle<()> {
        let mut rx = self.client.events().subscribe();
        let navigator = self.navigator.clone();
        let store = self.client.store().clone();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) if event.requires_login() => {
                        info!(?event, "session ended, redirecting to login");
                        navigator.navigate(LOGIN_PATH);
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "session listener lagged");
                        if store.access().is_none() && navigator.current() != LOGIN_PATH {
                            info!("no session after lag, redirecting to login");
                            navigator.navigate(LOGIN_PATH);
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;
