//! Retry decision for 401 responses.
//!
//! `attempt` counts retries already performed for one original request, so
//! the first dispatch is attempt 0. Only 401 is eligible; every other status,
//! including 403, passes straight through to the caller.

use reqwest::StatusCode;

/// Maximum refresh-and-retry cycles per original request.
pub const MAX_REFRESH_RETRIES: u32 = 1;

/// Whether a response with `status` on attempt `attempt` should trigger a
/// refresh exchange followed by a retry.
#[must_use]
pub fn should_retry(attempt: u32, status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED && attempt < MAX_REFRESH_RETRIES
}

#[cfg(test)]
#[path = "retry_test.rs"]
mod tests;
