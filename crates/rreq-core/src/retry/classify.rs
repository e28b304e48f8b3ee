//! Classify one attempt's result against the configured policy.

use crate::config::{ResilienceConfig, RATE_LIMITED};

/// A response that carries an HTTP status code.
pub trait StatusResponse {
    fn status_code(&self) -> u16;
}

impl StatusResponse for u16 {
    fn status_code(&self) -> u16 {
        *self
    }
}

/// What a single attempt produced, as seen by the retry loop.
#[derive(Debug)]
pub enum Outcome<R, E> {
    /// Status code is in the expected set.
    Accepted(R),
    /// Unexpected status code; worth another try.
    RetryableStatus(u16),
    /// Rate-limit sentinel (429); retrying stops.
    NonRetryableStatus(u16),
    /// The operation failed before producing a status (timeout, connection, DNS).
    TransportFailure(E),
}

/// Classify the result of one attempt.
///
/// Acceptance is checked first, so a caller that expects 429 gets it back as a
/// normal response.
pub fn classify<R: StatusResponse, E>(
    result: Result<R, E>,
    config: &ResilienceConfig,
) -> Outcome<R, E> {
    match result {
        Err(e) => Outcome::TransportFailure(e),
        Ok(r) => {
            let code = r.status_code();
            if config.accepts(code) {
                Outcome::Accepted(r)
            } else if code == RATE_LIMITED {
                Outcome::NonRetryableStatus(code)
            } else {
                Outcome::RetryableStatus(code)
            }
        }
    }
}
