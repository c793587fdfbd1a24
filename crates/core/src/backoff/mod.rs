//! Rate-limit backoff.
//!
//! Tracks consecutive rate-limited downloads and yields how long to wait
//! before the next attempt. [`BackoffState`] transitions are pure; the caller
//! does the sleeping.

mod state;

pub use state::{delay_for, BackoffConfig, BackoffState};

/// Substrings that identify an upstream rate-limit response.
pub const RATE_LIMIT_MARKERS: &[&str] = &["rate-limited", "rate limit", "try again later"];

/// Whether a provider failure message reports rate limiting.
///
/// Matching is case-insensitive against [`RATE_LIMIT_MARKERS`].
pub fn is_rate_limited(message: &str) -> bool {
    let message = message.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|marker| message.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_messages() {
        assert!(is_rate_limited(
            "ERROR: [youtube] abc: This content isn't available, try again later."
        ));
        assert!(is_rate_limited(
            "ERROR: Your IP is likely being blocked. You have been RATE-LIMITED"
        ));
        assert!(is_rate_limited("HTTP Error 429: rate limit exceeded"));
    }

    #[test]
    fn test_other_failures_not_rate_limited() {
        assert!(!is_rate_limited("ERROR: Video unavailable"));
        assert!(!is_rate_limited("HTTP Error 403: Forbidden"));
        assert!(!is_rate_limited(""));
    }
}
