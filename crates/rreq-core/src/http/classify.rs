//! Classify curl errors for log fields.

/// Rough transport failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Network-level failure (connection refused/reset, DNS, etc.).
    Connection,
    Other,
}

/// Classify a curl error.
pub fn classify_transport(e: &curl::Error) -> TransportKind {
    if e.is_operation_timedout() {
        return TransportKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return TransportKind::Connection;
    }
    TransportKind::Other
}
