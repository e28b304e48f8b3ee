use serde::{Deserialize, Serialize};

/// Status code that aborts retrying immediately (429 Too Many Requests).
pub const RATE_LIMITED: u16 = 429;

/// Backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    /// Retry immediately.
    Disabled,
    /// First retry waits `min` seconds; each later retry doubles the wait, capped at `max`.
    /// Set both to the same value for a constant interval.
    Exponential { min: f64, max: f64 },
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Exponential { min: 0.1, max: 5.0 }
    }
}

/// Retry policy for one request (optional section in a caller's config).
///
/// Every `Default::default()` call builds its own `expected_status_codes`
/// vector, so callers never share a mutable default between requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Status codes accepted as success. Anything else is retried or reported.
    pub expected_status_codes: Vec<u16>,
    /// Maximum number of attempts (including the first).
    pub max_tries: u32,
    /// Upper bound in seconds of the random delay added to each backoff.
    pub jitter: f64,
    /// Delay progression between attempts.
    pub backoff: Backoff,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            expected_status_codes: vec![200],
            max_tries: 3,
            jitter: 0.05,
            backoff: Backoff::default(),
        }
    }
}

impl ResilienceConfig {
    /// True if `code` is one of the accepted status codes.
    pub fn accepts(&self, code: u16) -> bool {
        self.expected_status_codes.contains(&code)
    }
}
