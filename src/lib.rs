//! Session plumbing for the structra.cloud client.
//!
//! SYSTEM CONTEXT
//! ==============
//! Two pieces share one persisted credential pair:
//! - `client::SessionClient` attaches the access token to every request and
//!   performs a single silent refresh when the backend answers 401.
//! - `guard` decides, synchronously and from local state only, whether a
//!   navigation target may render or must redirect.
//!
//! They never call each other. The HTTP layer announces an unrecoverable
//! session on `events::SessionEvents`; `shell::AppShell` owns the listener
//! that turns that signal into navigation.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod guard;
pub mod history;
pub mod navigator;
pub mod retry;
pub mod routes;
pub mod shell;
pub mod store;

#[cfg(test)]
pub(crate) mod mock_backend;

pub use client::{ApiRequest, SessionClient};
pub use config::ClientConfig;
pub use error::SessionError;
pub use events::{InvalidReason, SessionEvent, SessionEvents};
pub use guard::{GuardCheck, GuardDecision, GuardState, RouteAccess};
pub use navigator::{NavigationOutcome, Navigator};
pub use shell::AppShell;
pub use store::{CredentialPair, FileStore, MemoryStore, SessionStore, StoreError};
