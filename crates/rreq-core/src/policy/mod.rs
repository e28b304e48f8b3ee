//! Policy validation.
//!
//! Checks a `ResilienceConfig` once, before the first attempt, so that a bad
//! policy never reaches the network.

mod error;
mod validate;

pub use error::ConfigurationError;
pub use validate::validate;
