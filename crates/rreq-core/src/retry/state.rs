//! Per-invocation retry state and the transition taken after each attempt.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use crate::config::{ResilienceConfig, RATE_LIMITED};

use super::backoff::{self, BackoffProgress};
use super::classify::Outcome;
use super::error::ResilienceError;

/// What the loop does after recording an attempt.
#[derive(Debug)]
pub(crate) enum Step<R, E> {
    Accept(R),
    Fail(ResilienceError<E>),
    Retry,
}

/// Mutable state owned by exactly one executor invocation.
#[derive(Debug)]
pub(crate) struct AttemptState<E> {
    tries_so_far: u32,
    backoff: BackoffProgress,
    /// Only grows within an invocation.
    observed_status_codes: BTreeSet<u16>,
    last_transport_error: Option<E>,
    last_message: String,
}

impl<E> Default for AttemptState<E> {
    fn default() -> Self {
        Self {
            tries_so_far: 0,
            backoff: BackoffProgress::default(),
            observed_status_codes: BTreeSet::new(),
            last_transport_error: None,
            last_message: String::new(),
        }
    }
}

impl<E: fmt::Display> AttemptState<E> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn tries_so_far(&self) -> u32 {
        self.tries_so_far
    }

    #[cfg(test)]
    pub(crate) fn current_sleep_secs(&self) -> f64 {
        self.backoff.current_secs()
    }

    #[cfg(test)]
    pub(crate) fn observed_status_codes(&self) -> &BTreeSet<u16> {
        &self.observed_status_codes
    }

    #[cfg(test)]
    pub(crate) fn last_transport_error(&self) -> Option<&E> {
        self.last_transport_error.as_ref()
    }

    /// Short description of the most recent failed attempt.
    pub(crate) fn last_message(&self) -> &str {
        &self.last_message
    }

    /// Count a new attempt; returns its 1-based number.
    pub(crate) fn begin_attempt(&mut self) -> u32 {
        self.tries_so_far += 1;
        self.tries_so_far
    }

    /// Record the outcome of the current attempt and decide what happens next.
    pub(crate) fn record<R>(
        &mut self,
        outcome: Outcome<R, E>,
        config: &ResilienceConfig,
    ) -> Step<R, E> {
        let attempt = self.tries_so_far;
        match outcome {
            Outcome::Accepted(r) => {
                if attempt > 1 {
                    tracing::info!(attempt, "request accepted after {} attempts", attempt);
                }
                return Step::Accept(r);
            }
            Outcome::TransportFailure(e) => {
                tracing::warn!(
                    attempt,
                    max_tries = config.max_tries,
                    error = %e,
                    "attempt failed"
                );
                self.last_message = e.to_string();
                self.last_transport_error = Some(e);
            }
            Outcome::RetryableStatus(code) | Outcome::NonRetryableStatus(code) => {
                tracing::debug!(
                    attempt,
                    max_tries = config.max_tries,
                    status = code,
                    "unexpected status"
                );
                self.observed_status_codes.insert(code);
                self.last_transport_error = None;
                self.last_message = format!("HTTP {}", code);
            }
        }

        // Checked after every attempt, not only the one that returned 429.
        if self.observed_status_codes.contains(&RATE_LIMITED) {
            let message = self.rate_limited_message();
            tracing::warn!(attempt, "{}", message);
            self.last_message = message.clone();
            return Step::Fail(ResilienceError::TooManyRequests {
                observed: self.observed_status_codes.clone(),
                message,
            });
        }

        if attempt >= config.max_tries {
            if let Some(e) = self.last_transport_error.take() {
                tracing::warn!(attempt, error = %e, "giving up after transport failure");
                return Step::Fail(ResilienceError::Transport(e));
            }
            let message = self.status_mismatch_message(&config.expected_status_codes);
            tracing::warn!(attempt, "{}", message);
            self.last_message = message.clone();
            return Step::Fail(ResilienceError::StatusMismatch {
                observed: self.observed_status_codes.clone(),
                expected: config.expected_status_codes.clone(),
                message,
            });
        }

        Step::Retry
    }

    /// Advance the backoff and return how long to wait before the next attempt.
    pub(crate) fn next_delay(&mut self, config: &ResilienceConfig) -> Duration {
        backoff::next_delay(&mut self.backoff, config, &mut rand::thread_rng())
    }

    fn rate_limited_message(&self) -> String {
        let others: BTreeSet<u16> = self
            .observed_status_codes
            .iter()
            .copied()
            .filter(|&c| c != RATE_LIMITED)
            .collect();
        if others.is_empty() {
            "Got status code: 429 Too Many Requests".to_string()
        } else {
            format!(
                "Got status codes: {}, and 429 Too Many Requests",
                CodeSet(&others)
            )
        }
    }

    fn status_mismatch_message(&self, expected: &[u16]) -> String {
        match single(&self.observed_status_codes) {
            Some(code) => format!("Got status code: {}, expected: {:?}", code, expected),
            None => format!(
                "Got status codes: {}, expected: {:?}",
                CodeSet(&self.observed_status_codes),
                expected
            ),
        }
    }
}

fn single(codes: &BTreeSet<u16>) -> Option<u16> {
    if codes.len() == 1 {
        codes.iter().next().copied()
    } else {
        None
    }
}

/// Renders a set of codes as `{404, 500}`.
struct CodeSet<'a>(&'a BTreeSet<u16>);

impl fmt::Display for CodeSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, code) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", code)?;
        }
        write!(f, "}}")
    }
}
