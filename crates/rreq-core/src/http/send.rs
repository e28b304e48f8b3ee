//! One HTTP attempt over libcurl, with no status interpretation.

use super::classify::classify_transport;
use super::{Method, RequestOptions, Response};

/// Performs a single request and returns whatever status the server sent.
///
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn send(method: Method, url: &str, opts: &RequestOptions) -> Result<Response, curl::Error> {
    let result = perform(method, url, opts);
    if let Err(e) = &result {
        tracing::debug!(
            %method,
            url,
            kind = ?classify_transport(e),
            "request failed: {}",
            e
        );
    }
    result
}

fn perform(method: Method, url: &str, opts: &RequestOptions) -> Result<Response, curl::Error> {
    let mut headers: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    match method {
        Method::Get => easy.get(true)?,
        Method::Head => easy.nobody(true)?,
        Method::Put | Method::Delete | Method::Options => easy.custom_request(method.as_str())?,
    }
    easy.follow_location(opts.follow_redirects)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.timeout)?;

    // Build curl list for custom headers (e.g. "Name: value").
    if !opts.headers.is_empty() {
        let mut list = curl::easy::List::new();
        for (k, v) in &opts.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        easy.http_headers(list)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            push_header_line(&mut headers, data);
            true
        })?;
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    Ok(Response {
        status: status_from_response_code(code, url),
        headers,
        body,
    })
}

/// Appends one raw header line; bytes that are not UTF-8 are replaced, not dropped.
fn push_header_line(headers: &mut Vec<String>, data: &[u8]) {
    let raw = String::from_utf8_lossy(data);
    let line = raw.trim_end();
    // A new status line starts the headers of the next (redirected) response.
    if line.starts_with("HTTP/") {
        headers.clear();
    }
    if !line.is_empty() {
        headers.push(line.to_string());
    }
}

fn status_from_response_code(code: u32, url: &str) -> u16 {
    u16::try_from(code).unwrap_or_else(|_| {
        tracing::warn!(url, code, "response code out of range, reporting {}", u16::MAX);
        u16::MAX
    })
}
