//! Blocking retry loop: run an operation until it is accepted or the policy says stop.

use std::fmt;
use std::time::Duration;

use crate::cancel::{CancelToken, Cancelled};
use crate::config::ResilienceConfig;
use crate::policy;

use super::classify::{classify, StatusResponse};
use super::error::ResilienceError;
use super::state::{AttemptState, Step};

/// Suspends the calling thread between attempts.
pub trait Sleeper {
    /// Sleep for `duration`, returning early with `Cancelled` if `cancel` fires.
    fn sleep(&self, duration: Duration, cancel: Option<&CancelToken>) -> Result<(), Cancelled>;
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration, cancel: Option<&CancelToken>) -> Result<(), Cancelled> {
        (**self).sleep(duration, cancel)
    }
}

/// Sleeps on the current OS thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration, cancel: Option<&CancelToken>) -> Result<(), Cancelled> {
        match cancel {
            Some(token) => {
                if token.wait_timeout(duration) {
                    Err(Cancelled)
                } else {
                    Ok(())
                }
            }
            None => {
                if !duration.is_zero() {
                    std::thread::sleep(duration);
                }
                Ok(())
            }
        }
    }
}

/// Drives the attempt / backoff loop for blocking operations.
///
/// Holds no per-request state, so one executor can serve any number of
/// concurrent invocations.
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor<S = ThreadSleeper> {
    sleeper: S,
    cancel: Option<CancelToken>,
}

impl RetryExecutor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Sleeper> RetryExecutor<S> {
    pub fn with_sleeper(sleeper: S) -> Self {
        Self {
            sleeper,
            cancel: None,
        }
    }

    /// Stop the loop (before the next attempt or during a backoff sleep) once `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Run `operation` until it returns an expected status code.
    ///
    /// The config is validated once, before the first attempt. A 429 ends the
    /// loop immediately; otherwise the loop ends after `max_tries` attempts with
    /// either the last transport error or a status mismatch.
    pub fn execute<R, E, F>(
        &self,
        config: &ResilienceConfig,
        mut operation: F,
    ) -> Result<R, ResilienceError<E>>
    where
        F: FnMut() -> Result<R, E>,
        R: StatusResponse,
        E: fmt::Display,
    {
        policy::validate(config)?;
        let mut state = AttemptState::new();
        loop {
            self.check_cancel()?;
            let attempt = state.begin_attempt();
            tracing::debug!(attempt, max_tries = config.max_tries, "starting attempt");
            match state.record(classify(operation(), config), config) {
                Step::Accept(r) => return Ok(r),
                Step::Fail(e) => return Err(e),
                Step::Retry => {}
            }
            let delay = state.next_delay(config);
            tracing::debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                last = state.last_message(),
                "backing off"
            );
            self.sleeper.sleep(delay, self.cancel.as_ref())?;
        }
    }

    fn check_cancel(&self) -> Result<(), Cancelled> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => Err(Cancelled),
            _ => Ok(()),
        }
    }
}

/// Runs `operation` under `config` with the default thread-sleeping executor.
pub fn run_with_retry<R, E, F>(
    config: &ResilienceConfig,
    operation: F,
) -> Result<R, ResilienceError<E>>
where
    F: FnMut() -> Result<R, E>,
    R: StatusResponse,
    E: fmt::Display,
{
    RetryExecutor::new().execute(config, operation)
}
