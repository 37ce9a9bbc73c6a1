//! In-process REST backend for client tests.
//!
//! Mirrors the contract the session client relies on:
//! - `POST /auth/token/` trades email/password for a credential pair
//! - `POST /auth/token/refresh/` trades a refresh token for a new access token
//! - `/resource` (GET, POST, PATCH, DELETE) answers 401 unless the bearer was
//!   issued by this backend; POST and PATCH echo the JSON body they received
//!
//! Every issued access token is unique (`access-1`, `access-2`, ...), so tests
//! can tell which exchange produced the token a request carried.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};
use tokio::sync::Barrier;

use crate::config::ClientConfig;

pub(crate) const VALID_REFRESH: &str = "refresh-valid";
pub(crate) const VALID_PASSWORD: &str = "correct horse";

#[derive(Default)]
pub(crate) struct MockState {
    pub(crate) refresh_calls: AtomicUsize,
    pub(crate) login_calls: AtomicUsize,
    pub(crate) resource_calls: AtomicUsize,
    /// Authorization header of every `/resource` and `/public` hit, in order.
    pub(crate) seen_auth: Mutex<Vec<Option<String>>>,
    /// JSON body of every POST/PATCH `/resource` hit, in order.
    pub(crate) seen_bodies: Mutex<Vec<Value>>,
    pub(crate) issued: Mutex<HashSet<String>>,
    pub(crate) issued_count: AtomicUsize,
    /// `/resource` answers 401 regardless of the bearer.
    pub(crate) always_unauthorized: AtomicBool,
    /// `/auth/token/refresh/` answers 401 regardless of the token.
    pub(crate) refresh_fails: AtomicBool,
    /// `/auth/token/refresh/` answers 200 with `{"access": ""}`.
    pub(crate) refresh_returns_empty: AtomicBool,
    /// Stale-token hits on `/resource` wait here before answering.
    pub(crate) stale_barrier: Option<Barrier>,
}

impl MockState {
    fn issue_access(&self) -> String {
        let n = self.issued_count.fetch_add(1, Ordering::SeqCst) + 1;
        let token = format!("access-{n}");
        self.issued.lock().unwrap().insert(token.clone());
        token
    }

    fn is_issued(&self, token: &str) -> bool {
        self.issued.lock().unwrap().contains(token)
    }

    pub(crate) fn seen_auth(&self) -> Vec<Option<String>> {
        self.seen_auth.lock().unwrap().clone()
    }

    pub(crate) fn seen_bodies(&self) -> Vec<Value> {
        self.seen_bodies.lock().unwrap().clone()
    }

    pub(crate) fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn resource_calls(&self) -> usize {
        self.resource_calls.load(Ordering::SeqCst)
    }
}

pub(crate) struct MockBackend {
    pub(crate) addr: SocketAddr,
    pub(crate) state: Arc<MockState>,
}

impl MockBackend {
    pub(crate) async fn start() -> Self {
        Self::start_with(MockState::default()).await
    }

    pub(crate) async fn start_with(state: MockState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/auth/token/", post(login))
            .route("/auth/token/refresh/", post(refresh))
            .route("/resource", get(resource).post(resource_write).patch(resource_write).delete(resource_delete))
            .route("/public", get(public))
            .route("/forbidden", get(forbidden))
            .route("/broken", get(broken))
            .route("/agent", get(agent))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    pub(crate) fn config(&self) -> ClientConfig {
        ClientConfig::new(&format!("http://{}", self.addr)).unwrap()
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers.get("authorization").and_then(|v| v.to_str().ok()).map(str::to_owned)
}

fn unauthorized(detail: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "detail": detail }))).into_response()
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    if body["password"] != VALID_PASSWORD {
        return unauthorized("No active account found with the given credentials");
    }
    state.login_calls.fetch_add(1, Ordering::SeqCst);
    let access = state.issue_access();
    Json(json!({ "access": access, "refresh": VALID_REFRESH })).into_response()
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    if state.refresh_fails.load(Ordering::SeqCst) || body["refresh"] != VALID_REFRESH {
        return unauthorized("Token is invalid or expired");
    }
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if state.refresh_returns_empty.load(Ordering::SeqCst) {
        return Json(json!({ "access": "" })).into_response();
    }
    let access = state.issue_access();
    Json(json!({ "access": access })).into_response()
}

/// Record a `/resource` hit and resolve its bearer to an issued token.
async fn authorize(state: &MockState, headers: &HeaderMap) -> Result<String, Response> {
    let auth = bearer(headers);
    state.resource_calls.fetch_add(1, Ordering::SeqCst);
    state.seen_auth.lock().unwrap().push(auth.clone());

    let token = auth.as_deref().and_then(|h| h.strip_prefix("Bearer ")).unwrap_or_default();
    if !state.always_unauthorized.load(Ordering::SeqCst) && state.is_issued(token) {
        return Ok(token.to_owned());
    }
    if let Some(barrier) = &state.stale_barrier {
        barrier.wait().await;
    }
    Err(unauthorized("Given token not valid for any token type"))
}

async fn resource(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    match authorize(&state, &headers).await {
        Ok(token) => Json(json!({ "ok": true, "token": token })).into_response(),
        Err(resp) => resp,
    }
}

async fn resource_write(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.seen_bodies.lock().unwrap().push(body.clone());
    match authorize(&state, &headers).await {
        Ok(token) => Json(json!({ "ok": true, "token": token, "echo": body })).into_response(),
        Err(resp) => resp,
    }
}

async fn resource_delete(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    match authorize(&state, &headers).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(resp) => resp,
    }
}

async fn public(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.seen_auth.lock().unwrap().push(bearer(&headers));
    Json(json!({ "plans": ["free", "team"] })).into_response()
}

async fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, Json(json!({ "detail": "not a workspace member" }))).into_response()
}

async fn broken() -> Response {
    (StatusCode::OK, "not json").into_response()
}

async fn agent(headers: HeaderMap) -> Response {
    let agent = headers.get("user-agent").and_then(|v| v.to_str().ok()).unwrap_or_default().to_owned();
    Json(json!({ "user_agent": agent })).into_response()
}
