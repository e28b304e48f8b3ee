//! Terminal errors of a retry loop.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::cancel::Cancelled;
use crate::policy::ConfigurationError;

/// Why a resilient request gave up.
///
/// `E` is the operation's own transport error type; it is returned as-is when
/// the final attempt failed at the transport level.
#[derive(Debug, Error)]
pub enum ResilienceError<E> {
    /// The policy was rejected before any attempt was made.
    #[error("invalid resilience config: {0}")]
    Configuration(#[from] ConfigurationError),

    /// A 429 was observed; no further attempts were made.
    #[error("{message}")]
    TooManyRequests {
        observed: BTreeSet<u16>,
        message: String,
    },

    /// The try budget ran out without an expected status code.
    #[error("{message}")]
    StatusMismatch {
        observed: BTreeSet<u16>,
        expected: Vec<u16>,
        message: String,
    },

    /// The final attempt failed before producing a status code.
    #[error(transparent)]
    Transport(E),

    /// The caller cancelled the request.
    #[error("request cancelled by caller")]
    Cancelled,
}

impl<E> From<Cancelled> for ResilienceError<E> {
    fn from(_: Cancelled) -> Self {
        ResilienceError::Cancelled
    }
}

impl<E> ResilienceError<E> {
    /// Distinct status codes seen before giving up, if the error kind records them.
    pub fn observed_status_codes(&self) -> Option<&BTreeSet<u16>> {
        match self {
            ResilienceError::TooManyRequests { observed, .. }
            | ResilienceError::StatusMismatch { observed, .. } => Some(observed),
            _ => None,
        }
    }

    /// The transport error, when the final attempt failed at the transport level.
    pub fn transport(&self) -> Option<&E> {
        match self {
            ResilienceError::Transport(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ResilienceError::TooManyRequests { .. })
    }
}
