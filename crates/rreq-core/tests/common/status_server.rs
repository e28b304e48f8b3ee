//! Minimal HTTP/1.1 server answering every request with a scripted status code.
//!
//! Status codes are served in order; the last one repeats. Each request head
//! is recorded so tests can assert which verb and headers arrived and how often.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub struct StatusServer {
    /// Base URL, e.g. "http://127.0.0.1:12345/".
    pub url: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StatusServer {
    /// Number of requests received so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Methods of the requests received so far, in arrival order.
    pub fn methods(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|head| head.split_whitespace().next().map(str::to_string))
            .collect()
    }

    /// Raw request heads (request line plus header lines), in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts a server in a background thread answering with `statuses` in order.
/// The server runs until the process exits.
pub fn start(statuses: Vec<u16>) -> StatusServer {
    assert!(!statuses.is_empty());
    spawn(move |stream, index| respond(stream, statuses[index.min(statuses.len() - 1)]))
}

/// Starts a server that reads each request and never answers (for client timeouts).
pub fn start_silent() -> StatusServer {
    spawn(|stream, _| {
        thread::sleep(Duration::from_secs(5));
        drop(stream);
    })
}

/// Returns a URL on a port that nothing listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/", port)
}

fn spawn<H>(handler: H) -> StatusServer
where
    H: Fn(TcpStream, usize) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let handler = Arc::new(handler);
    {
        let hits = Arc::clone(&hits);
        let requests = Arc::clone(&requests);
        thread::spawn(move || {
            for mut stream in listener.incoming().flatten() {
                let Some(head) = read_request(&mut stream) else {
                    continue;
                };
                requests.lock().unwrap().push(head);
                let index = hits.fetch_add(1, Ordering::SeqCst);
                let handler = Arc::clone(&handler);
                thread::spawn(move || handler(stream, index));
            }
        });
    }
    StatusServer {
        url: format!("http://127.0.0.1:{}/", port),
        hits,
        requests,
    }
}

/// Reads the request head (everything before the blank line).
fn read_request(stream: &mut TcpStream) -> Option<String> {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
    }
    let end = data.windows(4).position(|w| w == b"\r\n\r\n")?;
    Some(String::from_utf8_lossy(&data[..end]).into_owned())
}

fn respond(mut stream: TcpStream, status: u16) {
    let body = format!("status {}", status);
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
