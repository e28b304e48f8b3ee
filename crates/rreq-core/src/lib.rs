//! Retry, backoff and status-code policy for outbound HTTP requests.
//!
//! The core is [`retry::RetryExecutor`]: give it a [`config::ResilienceConfig`]
//! and an operation that performs one attempt, and it validates the policy,
//! retries unexpected status codes and transport failures with capped
//! exponential backoff, stops immediately on 429, and reports a typed
//! [`retry::ResilienceError`] when it gives up. [`http`] wraps libcurl
//! requests in that executor.

pub mod cancel;
pub mod config;
pub mod http;
pub mod logging;
pub mod policy;
pub mod retry;

pub use cancel::{CancelToken, Cancelled};
pub use config::{Backoff, ResilienceConfig};
pub use policy::ConfigurationError;
pub use retry::{AsyncRetryExecutor, ResilienceError, RetryExecutor, StatusResponse};
