//! Resilient HTTP verbs.
//!
//! Each verb performs single libcurl attempts (see [`send`]) under a
//! [`RetryExecutor`], so status-code checks, 429 handling and backoff follow
//! the given `ResilienceConfig`.

mod classify;
mod send;

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::config::ResilienceConfig;
use crate::retry::{ResilienceError, RetryExecutor, Sleeper, StatusResponse};

pub use classify::{classify_transport, TransportKind};
pub use send::send;

/// HTTP method of a resilient request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Delete,
    Head,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-attempt transport options.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Whole-transfer timeout for one attempt. A timeout is a transport error.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Extra request headers ("Name" -> "value").
    pub headers: HashMap<String, String>,
    pub follow_redirects: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(15),
            headers: HashMap::new(),
            follow_redirects: true,
        }
    }
}

/// Response of one attempt.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    /// Raw header lines of the final response, including the status line.
    pub headers: Vec<String>,
    pub body: Vec<u8>,
}

impl Response {
    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find_map(|line| {
            let (k, v) = line.split_once(':')?;
            k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
        })
    }
}

impl StatusResponse for Response {
    fn status_code(&self) -> u16 {
        self.status
    }
}

/// Sends `method url` under `executor`, retrying per `config`.
pub fn request<S: Sleeper>(
    executor: &RetryExecutor<S>,
    method: Method,
    url: &str,
    opts: &RequestOptions,
    config: &ResilienceConfig,
) -> Result<Response, ResilienceError<curl::Error>> {
    executor.execute(config, || send(method, url, opts))
}

/// Resilient GET with the default executor.
pub fn get(
    url: &str,
    opts: &RequestOptions,
    config: &ResilienceConfig,
) -> Result<Response, ResilienceError<curl::Error>> {
    request(&RetryExecutor::new(), Method::Get, url, opts, config)
}

/// Resilient PUT with the default executor. No request body is sent.
pub fn put(
    url: &str,
    opts: &RequestOptions,
    config: &ResilienceConfig,
) -> Result<Response, ResilienceError<curl::Error>> {
    request(&RetryExecutor::new(), Method::Put, url, opts, config)
}

/// Resilient DELETE with the default executor.
pub fn delete(
    url: &str,
    opts: &RequestOptions,
    config: &ResilienceConfig,
) -> Result<Response, ResilienceError<curl::Error>> {
    request(&RetryExecutor::new(), Method::Delete, url, opts, config)
}

/// Resilient HEAD with the default executor.
pub fn head(
    url: &str,
    opts: &RequestOptions,
    config: &ResilienceConfig,
) -> Result<Response, ResilienceError<curl::Error>> {
    request(&RetryExecutor::new(), Method::Head, url, opts, config)
}

/// Resilient OPTIONS with the default executor.
pub fn options(
    url: &str,
    opts: &RequestOptions,
    config: &ResilienceConfig,
) -> Result<Response, ResilienceError<curl::Error>> {
    request(&RetryExecutor::new(), Method::Options, url, opts, config)
}
