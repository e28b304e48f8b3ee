use crate::config::{Backoff, ResilienceConfig};

use super::error::ConfigurationError;

/// Validate a resilience config. Pure: returns the first problem found.
pub fn validate(config: &ResilienceConfig) -> Result<(), ConfigurationError> {
    if config.expected_status_codes.is_empty() {
        return Err(ConfigurationError::NoExpectedStatusCodes);
    }
    if config.max_tries == 0 {
        return Err(ConfigurationError::ZeroMaxTries);
    }
    if let Backoff::Exponential { min, max } = config.backoff {
        let ok = min.is_finite() && max.is_finite() && min >= 0.0 && max >= min;
        if !ok {
            return Err(ConfigurationError::InvalidBackoff { min, max });
        }
    }
    if !config.jitter.is_finite() || config.jitter < 0.0 {
        return Err(ConfigurationError::InvalidJitter(config.jitter));
    }
    Ok(())
}

impl ResilienceConfig {
    /// See [`validate`].
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        validate(self)
    }
}
