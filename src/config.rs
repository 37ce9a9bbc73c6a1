//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::SessionError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_REFRESH_PATH: &str = "/auth/token/refresh/";
pub const DEFAULT_LOGIN_PATH: &str = "/auth/token/";
pub const DEFAULT_SESSION_FILE: &str = ".structra-session.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root without a trailing slash, e.g. `https://api.structra.cloud/api`.
    pub base_url: String,
    pub refresh_path: String,
    pub login_path: String,
    pub session_file: PathBuf,
    /// `None` leaves the request unbounded.
    pub request_timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
}

impl ClientConfig {
    /// Config pointing at `base_url` with every other field defaulted.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, SessionError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            refresh_path: DEFAULT_REFRESH_PATH.to_owned(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            request_timeout_secs: None,
            connect_timeout_secs: None,
        })
    }

    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `STRUCTRA_API_BASE_URL`: default `http://localhost:8000/api`
    /// - `STRUCTRA_REFRESH_PATH`: default `/auth/token/refresh/`
    /// - `STRUCTRA_LOGIN_PATH`: default `/auth/token/`
    /// - `STRUCTRA_SESSION_FILE`: default `.structra-session.json`
    /// - `STRUCTRA_REQUEST_TIMEOUT_SECS`: unset means no timeout
    /// - `STRUCTRA_CONNECT_TIMEOUT_SECS`: unset means no timeout
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the base URL is malformed.
    pub fn from_env() -> Result<Self, SessionError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the base URL is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SessionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup("STRUCTRA_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let mut config = Self::new(&base_url)?;

        if let Some(path) = lookup("STRUCTRA_REFRESH_PATH") {
            config.refresh_path = normalize_path(&path);
        }
        if let Some(path) = lookup("STRUCTRA_LOGIN_PATH") {
            config.login_path = normalize_path(&path);
        }
        if let Some(file) = lookup("STRUCTRA_SESSION_FILE").filter(|f| !f.trim().is_empty()) {
            config.session_file = PathBuf::from(file);
        }
        config.request_timeout_secs = lookup("STRUCTRA_REQUEST_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok());
        config.connect_timeout_secs = lookup("STRUCTRA_CONNECT_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok());

        Ok(config)
    }

    /// Absolute URL for an API path. Absolute URLs are returned unchanged.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        if is_http_url(path) {
            return path.to_owned();
        }
        format!("{}{}", self.base_url, normalize_path(path))
    }

    #[must_use]
    pub fn refresh_url(&self) -> String {
        self.endpoint(&self.refresh_path)
    }

    #[must_use]
    pub fn login_url(&self) -> String {
        self.endpoint(&self.login_path)
    }

    /// Build the reqwest client these settings describe.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] if the HTTP client cannot be built.
    pub fn http_client(&self) -> Result<reqwest::Client, SessionError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = self.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        builder
            .build()
            .map_err(|e| SessionError::Config(format!("http client build failed: {e}")))
    }
}

fn is_http_url(raw: &str) -> bool {
    raw.starts_with("http://") || raw.starts_with("https://")
}

fn normalize_base_url(raw: &str) -> Result<String, SessionError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let Some(rest) = trimmed.strip_prefix("http://").or_else(|| trimmed.strip_prefix("https://")) else {
        return Err(SessionError::Config(format!("STRUCTRA_API_BASE_URL must be an http(s) URL, got '{raw}'")));
    };
    if rest.is_empty() || rest.starts_with('/') {
        return Err(SessionError::Config(format!("STRUCTRA_API_BASE_URL is missing a host: '{raw}'")));
    }
    Ok(trimmed.to_owned())
}

fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('/') { trimmed.to_owned() } else { format!("/{trimmed}") }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
