//! Session client: bearer attachment and one-shot refresh on 401.
//!
//! ARCHITECTURE
//! ============
//! Every page-level fetch goes through `SessionClient::send`. The access token
//! is read from the store at dispatch time, so a retry always carries the most
//! recently stored value. A 401 triggers at most one refresh exchange per
//! original request; the decision lives in `retry::should_retry`.
//!
//! TRADE-OFFS
//! ==========
//! Refreshes are not coalesced. Two requests that hit 401 together each run
//! their own exchange and the last successful one wins the store. The refresh
//! endpoint is idempotent, so the duplicate costs one round trip.
//!
//! ERROR HANDLING
//! ==============
//! Non-401 responses, and a 401 that survives the retry, come back as
//! `Ok(response)` untouched. A session that cannot be recovered clears the
//! store, emits `SessionEvent::Invalidated`, and returns
//! `SessionError::SessionInvalid` wrapping the error that ended it.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::events::{InvalidReason, SessionEvent, SessionEvents};
use crate::retry::should_retry;
use crate::store::SessionStore;

// =============================================================================
// REQUEST
// =============================================================================

/// Description of one outbound call. Rebuilt into a fresh HTTP request on
/// every attempt.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub id: Uuid,
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), method, path: path.into(), body: None }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Decode`] if `body` cannot be serialized.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, SessionError> {
        let value = serde_json::to_value(body).map_err(|e| SessionError::Decode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(serde::Deserialize)]
struct RefreshResponse {
    access: String,
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP dispatch with credential attachment and refresh-on-401.
///
/// Cheap to clone; clones share the HTTP connection pool, the store, and the
/// event hub.
#[derive(Clone)]
pub struct SessionClient {
    pub(crate) http: reqwest::Client,
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) store: Arc<dyn SessionStore>,
    pub(crate) events: SessionEvents,
}

impl SessionClient {
    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the HTTP client cannot be built.
    pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>, events: SessionEvents) -> Result<Self, SessionError> {
        let http = config.http_client()?;
        Ok(Self { http, config: Arc::new(config), store, events })
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    #[must_use]
    pub fn events(&self) -> &SessionEvents {
        &self.events
    }

    /// Dispatch `request`, refreshing the access token once on 401.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Transport`] when no response arrives.
    /// - [`SessionError::SessionInvalid`] when a 401 cannot be recovered; the
    ///   store has been cleared and `SessionEvent::Invalidated` emitted.
    pub async fn send(&self, request: ApiRequest) -> Result<Response, SessionError> {
        let mut attempt = 0;
        loop {
            let response = self.dispatch(&request, attempt).await?;
            let status = response.status();
            if !should_retry(attempt, status) {
                debug!(request_id = %request.id, attempt, status = status.as_u16(), "request complete");
                return Ok(response);
            }
            attempt += 1;

            let Some(refresh) = self.store.refresh() else {
                let original = status_error(response).await;
                return Err(self.invalidate(&request, InvalidReason::MissingRefresh, original));
            };

            match self.exchange_refresh(&refresh).await {
                Ok(access) => {
                    if let Err(e) = self.store.set_access(&access) {
                        return Err(self.invalidate(&request, InvalidReason::RefreshFailed, e.into()));
                    }
                    info!(request_id = %request.id, "access token refreshed");
                    self.events.emit(SessionEvent::Refreshed);
                }
                Err(e) => return Err(self.invalidate(&request, InvalidReason::RefreshFailed, e)),
            }
        }
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// Goes straight to the HTTP client, bypassing the 401 handling in
    /// [`SessionClient::send`], and leaves the store untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::RefreshRejected`] on a non-2xx answer,
    /// [`SessionError::Transport`] on network failure, or
    /// [`SessionError::Decode`] if the body has no usable `access` token.
    pub async fn exchange_refresh(&self, refresh: &str) -> Result<String, SessionError> {
        let response = self
            .http
            .post(self.config.refresh_url())
            .json(&RefreshRequest { refresh })
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(SessionError::RefreshRejected { status: status.as_u16(), body: text });
        }

        let parsed: RefreshResponse = serde_json::from_str(&text).map_err(|e| SessionError::Decode(e.to_string()))?;
        // The store reads an empty token as absent; storing one would send the retry unauthenticated.
        if parsed.access.trim().is_empty() {
            return Err(SessionError::Decode("refresh response carried an empty access token".to_owned()));
        }
        Ok(parsed.access)
    }

    // -------------------------------------------------------------------------
    // JSON helpers
    // -------------------------------------------------------------------------

    /// `GET path` and decode a 2xx JSON body.
    ///
    /// # Errors
    ///
    /// Everything [`SessionClient::send`] returns, plus
    /// [`SessionError::Status`] for non-2xx and [`SessionError::Decode`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SessionError> {
        let response = self.send(ApiRequest::get(path)).await?;
        decode_json(ensure_success(response).await?).await
    }

    /// `POST path` with a JSON body and decode a 2xx JSON reply.
    ///
    /// # Errors
    ///
    /// Same as [`SessionClient::get_json`].
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, SessionError> {
        let response = self.send(ApiRequest::post(path).json(body)?).await?;
        decode_json(ensure_success(response).await?).await
    }

    /// `PATCH path` with a JSON body and decode a 2xx JSON reply.
    ///
    /// # Errors
    ///
    /// Same as [`SessionClient::get_json`].
    pub async fn patch_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, SessionError> {
        let response = self.send(ApiRequest::patch(path).json(body)?).await?;
        decode_json(ensure_success(response).await?).await
    }

    /// `DELETE path`, ignoring any reply body.
    ///
    /// # Errors
    ///
    /// Everything [`SessionClient::send`] returns, plus
    /// [`SessionError::Status`] for non-2xx.
    pub async fn delete(&self, path: &str) -> Result<(), SessionError> {
        let response = self.send(ApiRequest::delete(path)).await?;
        ensure_success(response).await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // internals
    // -------------------------------------------------------------------------

    async fn dispatch(&self, request: &ApiRequest, attempt: u32) -> Result<Response, SessionError> {
        let url = self.config.endpoint(&request.path);
        let mut builder = self.http.request(request.method.clone(), &url);
        if let Some(access) = self.store.access() {
            builder = builder.header(AUTHORIZATION, format!("Bearer {access}"));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        debug!(request_id = %request.id, attempt, method = %request.method, path = %request.path, "dispatch");
        Ok(builder.send().await?)
    }

    fn invalidate(&self, request: &ApiRequest, reason: InvalidReason, source: SessionError) -> SessionError {
        warn!(request_id = %request.id, %reason, error = %source, "session invalidated");
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear session store");
        }
        self.events.emit(SessionEvent::Invalidated(reason));
        SessionError::SessionInvalid { reason, source: Box::new(source) }
    }
}

/// Consume a response into `SessionError::Status`.
async fn status_error(response: Response) -> SessionError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    SessionError::Status { status, body }
}

/// Return the response on 2xx, otherwise a `Status` error with the body.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, SessionError> {
    if response.status().is_success() {
        return Ok(response);
    }
    Err(status_error(response).await)
}

pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, SessionError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| SessionError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
