use bytes::Bytes;
use http::{Method, StatusCode};

use crate::headers::Headers;

#[derive(Debug, Clone)]
pub struct UpstreamHttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Bytes,
}

/// Fully collected upstream reply. Non-2xx replies are carried here too and relayed as-is.
#[derive(Debug, Clone)]
pub struct UpstreamHttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    ReadTimeout,
    Connect,
    Dns,
    Tls,
    Other,
}

impl TransportErrorKind {
    fn tag(self) -> Option<&'static str> {
        match self {
            TransportErrorKind::Timeout => Some("request timeout"),
            TransportErrorKind::ReadTimeout => Some("read timeout"),
            TransportErrorKind::Connect => Some("connect ECONNREFUSED"),
            TransportErrorKind::Dns => Some("getaddrinfo ENOTFOUND"),
            TransportErrorKind::Tls | TransportErrorKind::Other => None,
        }
    }
}

/// Transport-level failure (no HTTP response was received).
#[derive(Debug, Clone)]
pub struct TransportFailure {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportFailure {
    /// `detail` is the client's error text; the kind tag is prefixed so the message
    /// carries the markers [`status_for_transport_message`] looks for.
    pub fn new(kind: TransportErrorKind, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let message = match kind.tag() {
            Some(tag) => format!("{tag}: {detail}"),
            None => detail,
        };
        Self { kind, message }
    }

    pub fn status(&self) -> StatusCode {
        status_for_transport_message(&self.message)
    }
}

/// Maps transport error text to the status returned downstream.
///
/// "timeout" is checked first, so it wins over any other marker in the same text.
pub fn status_for_transport_message(message: &str) -> StatusCode {
    if message.contains("timeout") {
        StatusCode::GATEWAY_TIMEOUT
    } else if message.contains("ECONNREFUSED") || message.contains("ENOTFOUND") {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::BAD_GATEWAY
    }
}
