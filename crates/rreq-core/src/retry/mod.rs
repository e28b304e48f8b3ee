//! Retry and backoff execution.
//!
//! This module owns the attempt / backoff / termination state machine:
//! classify each attempt, remember the status codes seen so far, stop on 429
//! or when the try budget is spent, and otherwise sleep with capped
//! exponential backoff plus additive jitter before trying again.

mod backoff;
mod classify;
mod error;
mod run;
mod run_async;
mod state;

pub use backoff::{jitter_secs, next_delay, BackoffProgress};
pub use classify::{classify, Outcome, StatusResponse};
pub use error::ResilienceError;
pub use run::{run_with_retry, RetryExecutor, Sleeper, ThreadSleeper};
pub use run_async::AsyncRetryExecutor;
