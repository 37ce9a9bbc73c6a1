//! Credential-pair lifecycle: login, establishing a session from another
//! flow, and logout.
//!
//! SYSTEM CONTEXT
//! ==============
//! Login, signup OTP verification, and OAuth code exchange all end with the
//! backend handing over an `{access, refresh}` pair. `login` covers the
//! password flow directly; the other flows call `establish` with the pair they
//! received. These calls go straight to the HTTP client: a 401 here means bad
//! credentials, not an expired session.

use serde::Serialize;
use tracing::info;

use crate::client::{SessionClient, decode_json, ensure_success};
use crate::error::SessionError;
use crate::events::SessionEvent;
use crate::store::CredentialPair;

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl SessionClient {
    /// Exchange email/password for a credential pair and store it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Status`] if the backend rejects the
    /// credentials (the store is left untouched), [`SessionError::Transport`]
    /// on network failure, or [`SessionError::Store`] if the pair cannot be
    /// persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<CredentialPair, SessionError> {
        let response = self
            .http
            .post(self.config.login_url())
            .json(&LoginRequest { email, password })
            .send()
            .await?;

        let pair: CredentialPair = decode_json(ensure_success(response).await?).await?;
        self.establish(&pair)?;
        Ok(pair)
    }

    /// Store a pair obtained from any sign-in flow.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the pair cannot be persisted.
    pub fn establish(&self, pair: &CredentialPair) -> Result<(), SessionError> {
        self.store.set_pair(pair)?;
        info!("session established");
        self.events.emit(SessionEvent::Established);
        Ok(())
    }

    /// Drop the session locally.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the store cannot be cleared.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.store.clear()?;
        info!("session logged out");
        self.events.emit(SessionEvent::LoggedOut);
        Ok(())
    }

    /// Whether an access token is currently stored. Presence only; expiry is
    /// discovered by the next request.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.access().is_some()
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
