//! Error type for rejected resilience configs.

use thiserror::Error;

/// Why a `ResilienceConfig` was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("expected_status_codes must contain at least one status code")]
    NoExpectedStatusCodes,

    #[error("max_tries must be more than 0")]
    ZeroMaxTries,

    #[error("backoff was {{min: {min}, max: {max}}}, but it must satisfy 0 <= min <= max with finite values")]
    InvalidBackoff { min: f64, max: f64 },

    #[error("jitter was {0}, but it must be a finite number >= 0")]
    InvalidJitter(f64),
}
