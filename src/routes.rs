//! Application route table.
//!
//! Public-only routes are matched exactly. Protected routes are matched by
//! prefix on whole path segments, so `/app` covers `/app/workspace/42` but not
//! `/apples`. Anything unlisted (pricing, legal pages, docs, unknown paths)
//! is open.

use crate::guard::RouteAccess;

pub const LANDING_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const SIGNUP_PATH: &str = "/signup";
/// Authenticated home.
pub const HOME_PATH: &str = "/app";

const PUBLIC_ONLY: &[&str] = &[LANDING_PATH, LOGIN_PATH, SIGNUP_PATH];

const PROTECTED_PREFIXES: &[&str] =
    &[HOME_PATH, "/onboarding", "/profile", "/workspace", "/settings", "/canvas", "/evaluation"];

/// Strip query and fragment, and a trailing slash on anything but the root.
#[must_use]
pub fn normalize(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() { LANDING_PATH } else { trimmed }
}

fn has_segment_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix).is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Which guard variant applies to `path`.
#[must_use]
pub fn route_access(path: &str) -> RouteAccess {
    let path = normalize(path);
    if PUBLIC_ONLY.contains(&path) {
        return RouteAccess::PublicOnly;
    }
    if PROTECTED_PREFIXES.iter().any(|prefix| has_segment_prefix(path, prefix)) {
        return RouteAccess::Protected;
    }
    RouteAccess::Open
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
