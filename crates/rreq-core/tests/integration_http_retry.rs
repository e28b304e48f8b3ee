//! Integration test: resilient HTTP verbs against a local scripted server.
//!
//! Each test starts a server answering with a fixed sequence of status codes
//! and checks how many requests the retry policy sent and what it reported.

mod common;

use std::time::Duration;

use common::status_server;
use rreq_core::config::{Backoff, ResilienceConfig};
use rreq_core::http::{self, Method, RequestOptions, TransportKind};
use rreq_core::retry::{ResilienceError, RetryExecutor};
use rreq_core::CancelToken;

/// Short backoff so retries finish quickly.
fn fast(max_tries: u32) -> ResilienceConfig {
    let _ = rreq_core::logging::try_init_logging_stderr();
    ResilienceConfig {
        max_tries,
        backoff: Backoff::Exponential {
            min: 0.01,
            max: 0.05,
        },
        jitter: 0.0,
        ..Default::default()
    }
}

#[test]
fn simple_get_returns_response() {
    let server = status_server::start(vec![200]);
    let resp = http::get(&server.url, &RequestOptions::default(), &fast(3)).expect("get");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, b"status 200");
    assert_eq!(resp.header("content-type"), Some("text/plain"));
    assert_eq!(server.hits(), 1);
}

#[test]
fn http_404_retried_then_reported() {
    let server = status_server::start(vec![404]);
    let err = http::get(&server.url, &RequestOptions::default(), &fast(2)).unwrap_err();
    assert_eq!(err.to_string(), "Got status code: 404, expected: [200]");
    assert_eq!(server.hits(), 2);
}

#[test]
fn http_429_not_retried() {
    let server = status_server::start(vec![429, 200]);
    let err = http::get(&server.url, &RequestOptions::default(), &fast(3)).unwrap_err();
    assert!(err.is_rate_limited());
    assert_eq!(err.to_string(), "Got status code: 429 Too Many Requests");
    assert_eq!(server.hits(), 1);
}

#[test]
fn timeout_on_every_attempt_surfaces_curl_error() {
    let server = status_server::start_silent();
    let opts = RequestOptions {
        timeout: Duration::from_millis(200),
        ..Default::default()
    };
    let err = http::get(&server.url, &opts, &fast(2)).unwrap_err();
    match err {
        ResilienceError::Transport(e) => {
            assert!(e.is_operation_timedout(), "unexpected curl error: {}", e);
            assert_eq!(http::classify_transport(&e), TransportKind::Timeout);
        }
        other => panic!("expected transport error, got {:?}", other),
    }
    assert_eq!(server.hits(), 2);
}

#[test]
fn connection_refused_surfaces_curl_error() {
    let url = status_server::refused_url();
    let cfg = ResilienceConfig {
        backoff: Backoff::Disabled,
        ..fast(2)
    };
    let err = http::get(&url, &RequestOptions::default(), &cfg).unwrap_err();
    let e = err.transport().expect("transport error");
    assert_eq!(http::classify_transport(e), TransportKind::Connection);
}

#[test]
fn expected_404_accepted() {
    let server = status_server::start(vec![404]);
    let cfg = ResilienceConfig {
        expected_status_codes: vec![404],
        ..fast(3)
    };
    let resp = http::get(&server.url, &RequestOptions::default(), &cfg).expect("404 accepted");
    assert_eq!(resp.status, 404);
    assert_eq!(server.hits(), 1);
}

#[test]
fn expected_404_but_got_200_rejected() {
    let server = status_server::start(vec![200]);
    let cfg = ResilienceConfig {
        expected_status_codes: vec![404],
        ..fast(2)
    };
    let err = http::get(&server.url, &RequestOptions::default(), &cfg).unwrap_err();
    assert!(matches!(err, ResilienceError::StatusMismatch { .. }));
    assert_eq!(server.hits(), 2);
}

#[test]
fn server_error_then_success() {
    let server = status_server::start(vec![500, 200]);
    let resp = http::get(&server.url, &RequestOptions::default(), &fast(3)).expect("second try");
    assert_eq!(resp.status, 200);
    assert_eq!(server.hits(), 2);
}

#[test]
fn every_verb_sends_its_method() {
    let server = status_server::start(vec![200]);
    let opts = RequestOptions::default();
    let cfg = fast(1);
    assert_eq!(http::get(&server.url, &opts, &cfg).unwrap().status, 200);
    assert_eq!(http::put(&server.url, &opts, &cfg).unwrap().status, 200);
    assert_eq!(http::delete(&server.url, &opts, &cfg).unwrap().status, 200);
    let head = http::head(&server.url, &opts, &cfg).unwrap();
    assert_eq!(head.status, 200);
    assert!(head.body.is_empty());
    assert_eq!(http::options(&server.url, &opts, &cfg).unwrap().status, 200);
    assert_eq!(
        server.methods(),
        vec!["GET", "PUT", "DELETE", "HEAD", "OPTIONS"]
    );
}

#[test]
fn custom_headers_and_shared_executor() {
    let server = status_server::start(vec![503, 200]);
    let mut opts = RequestOptions::default();
    opts.headers.insert("X-Request-Id".to_string(), "abc".to_string());
    let executor = RetryExecutor::new().with_cancel(CancelToken::new());
    let resp = http::request(&executor, Method::Get, &server.url, &opts, &fast(3)).unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(server.hits(), 2);
    // Every retry carries the caller's headers.
    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    for head in &requests {
        assert!(
            head.lines().any(|l| l.eq_ignore_ascii_case("x-request-id: abc")),
            "header missing from request:\n{}",
            head
        );
    }

    let resp = http::request(&executor, Method::Put, &server.url, &opts, &fast(3)).unwrap();
    assert_eq!(resp.status, 200);
    let put = server.requests().pop().unwrap();
    assert!(put.starts_with("PUT "));
    assert!(put.lines().any(|l| l == "X-Request-Id: abc"));
}

#[test]
fn invalid_config_sends_nothing() {
    let server = status_server::start(vec![200]);
    let cfg = ResilienceConfig {
        max_tries: 0,
        ..Default::default()
    };
    let err = http::get(&server.url, &RequestOptions::default(), &cfg).unwrap_err();
    assert!(matches!(err, ResilienceError::Configuration(_)));
    assert_eq!(server.hits(), 0);
}
