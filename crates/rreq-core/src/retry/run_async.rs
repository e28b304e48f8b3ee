//! Cooperative retry loop for async operations; backoff yields to the tokio runtime.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::cancel::{CancelToken, Cancelled};
use crate::config::ResilienceConfig;
use crate::policy;

use super::classify::{classify, StatusResponse};
use super::error::ResilienceError;
use super::state::{AttemptState, Step};

/// Async counterpart of [`RetryExecutor`](super::RetryExecutor), sleeping with `tokio::time::sleep`.
#[derive(Debug, Clone, Default)]
pub struct AsyncRetryExecutor {
    cancel: Option<CancelToken>,
}

impl AsyncRetryExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Same state machine as the blocking executor; one attempt in flight at a time.
    pub async fn execute<R, E, F, Fut>(
        &self,
        config: &ResilienceConfig,
        mut operation: F,
    ) -> Result<R, ResilienceError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        R: StatusResponse,
        E: fmt::Display,
    {
        policy::validate(config)?;
        let mut state = AttemptState::new();
        loop {
            if self.cancel.as_ref().is_some_and(CancelToken::is_cancelled) {
                return Err(ResilienceError::Cancelled);
            }
            let attempt = state.begin_attempt();
            tracing::debug!(attempt, max_tries = config.max_tries, "starting attempt");
            let result = operation().await;
            match state.record(classify(result, config), config) {
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
            self.sleep(delay).await?;
        }
    }

    async fn sleep(&self, delay: Duration) -> Result<(), Cancelled> {
        match &self.cancel {
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(Cancelled),
                    _ = tokio::time::sleep(delay) => Ok(()),
                }
            }
        }
    }
}
