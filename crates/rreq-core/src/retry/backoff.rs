use std::time::Duration;

use rand::Rng;

use crate::config::{Backoff, ResilienceConfig};

/// Running backoff value for one invocation, in seconds.
///
/// Starts at 0 ("unset"). The first advance sets it to `min`; every later
/// advance doubles it, capped at `max`. Never decreases.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BackoffProgress {
    current_secs: f64,
}

impl BackoffProgress {
    pub fn current_secs(&self) -> f64 {
        self.current_secs
    }

    /// Advance to the next base delay and return it (seconds, jitter excluded).
    pub fn advance(&mut self, backoff: &Backoff) -> f64 {
        match *backoff {
            Backoff::Disabled => 0.0,
            Backoff::Exponential { min, max } => {
                self.current_secs = if self.current_secs == 0.0 {
                    min
                } else {
                    (self.current_secs * 2.0).min(max)
                };
                self.current_secs
            }
        }
    }
}

/// Uniform extra delay in `[0, jitter)` seconds. Zero when `jitter` is 0.
pub fn jitter_secs<G: Rng + ?Sized>(jitter: f64, rng: &mut G) -> f64 {
    if jitter > 0.0 {
        rng.gen_range(0.0..jitter)
    } else {
        0.0
    }
}

/// Delay to sleep before the next attempt. Jitter is only added when backoff is enabled
/// and does not feed back into the doubling.
pub fn next_delay<G: Rng + ?Sized>(
    progress: &mut BackoffProgress,
    config: &ResilienceConfig,
    rng: &mut G,
) -> Duration {
    match config.backoff {
        Backoff::Disabled => Duration::ZERO,
        Backoff::Exponential { .. } => {
            let base = progress.advance(&config.backoff);
            secs_to_duration(base + jitter_secs(config.jitter, rng))
        }
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}
