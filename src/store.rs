//! Persistent session state: the access/refresh credential pair.
//!
//! DESIGN
//! ======
//! Consumers never read ambient storage. The HTTP client, the route guard and
//! the shell all receive an `Arc<dyn SessionStore>`, so tests swap in
//! `MemoryStore` and the binary uses `FileStore`.
//!
//! TRADE-OFFS
//! ==========
//! There is no locking discipline across operations: last writer wins. Both
//! values are opaque bearer strings that can be replaced wholesale, so a lost
//! update only costs one extra refresh.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

pub const ACCESS_KEY: &str = "access";
pub const REFRESH_KEY: &str = "refresh";

// =============================================================================
// TYPES
// =============================================================================

/// Tokens produced by login, signup, or an OAuth exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    pub access: String,
    pub refresh: String,
}

/// Errors raised by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("session file io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Process-wide credential storage.
///
/// Reads return `None` for both missing and empty values.
pub trait SessionStore: Send + Sync {
    /// Current access token, if any.
    fn access(&self) -> Option<String>;

    /// Current refresh token, if any.
    fn refresh(&self) -> Option<String>;

    /// Replace the access token only. The refresh token is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot persist the value.
    fn set_access(&self, token: &str) -> Result<(), StoreError>;

    /// Store a complete credential pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot persist the values.
    fn set_pair(&self, pair: &CredentialPair) -> Result<(), StoreError>;

    /// Drop all session state.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot persist the removal.
    fn clear(&self) -> Result<(), StoreError>;
}

type Slots = HashMap<String, String>;

fn non_empty(slots: &Slots, key: &str) -> Option<String> {
    slots.get(key).filter(|v| !v.is_empty()).cloned()
}

fn read_slots(lock: &RwLock<Slots>) -> RwLockReadGuard<'_, Slots> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_slots(lock: &RwLock<Slots>) -> RwLockWriteGuard<'_, Slots> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-memory store. Lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<Slots>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with an existing pair.
    #[must_use]
    pub fn with_pair(pair: &CredentialPair) -> Self {
        let store = Self::new();
        {
            let mut slots = write_slots(&store.slots);
            slots.insert(ACCESS_KEY.to_owned(), pair.access.clone());
            slots.insert(REFRESH_KEY.to_owned(), pair.refresh.clone());
        }
        store
    }
}

impl SessionStore for MemoryStore {
    fn access(&self) -> Option<String> {
        non_empty(&read_slots(&self.slots), ACCESS_KEY)
    }

    fn refresh(&self) -> Option<String> {
        non_empty(&read_slots(&self.slots), REFRESH_KEY)
    }

    fn set_access(&self, token: &str) -> Result<(), StoreError> {
        write_slots(&self.slots).insert(ACCESS_KEY.to_owned(), token.to_owned());
        Ok(())
    }

    fn set_pair(&self, pair: &CredentialPair) -> Result<(), StoreError> {
        let mut slots = write_slots(&self.slots);
        slots.insert(ACCESS_KEY.to_owned(), pair.access.clone());
        slots.insert(REFRESH_KEY.to_owned(), pair.refresh.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        write_slots(&self.slots).clear();
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Key/value store persisted as a flat JSON object on disk.
///
/// Reads are served from memory. Every mutation rewrites the file through a
/// sibling temp file and a rename, so a crash leaves either the old or the new
/// contents.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    slots: RwLock<Slots>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let slots = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Slots::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Slots::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, slots: RwLock::new(slots) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, slots: &Slots) -> Result<(), StoreError> {
        let body = serde_json::to_vec_pretty(slots)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, body)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn access(&self) -> Option<String> {
        non_empty(&read_slots(&self.slots), ACCESS_KEY)
    }

    fn refresh(&self) -> Option<String> {
        non_empty(&read_slots(&self.slots), REFRESH_KEY)
    }

    fn set_access(&self, token: &str) -> Result<(), StoreError> {
        let mut slots = write_slots(&self.slots);
        slots.insert(ACCESS_KEY.to_owned(), token.to_owned());
        self.persist(&slots)
    }

    fn set_pair(&self, pair: &CredentialPair) -> Result<(), StoreError> {
        let mut slots = write_slots(&self.slots);
        slots.insert(ACCESS_KEY.to_owned(), pair.access.clone());
        slots.insert(REFRESH_KEY.to_owned(), pair.refresh.clone());
        self.persist(&slots)
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut slots = write_slots(&self.slots);
        slots.remove(ACCESS_KEY);
        slots.remove(REFRESH_KEY);
        self.persist(&slots)
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
