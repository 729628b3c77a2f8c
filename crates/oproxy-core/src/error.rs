use axum::body::Body;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use oproxy_provider_core::TransportFailure;
use serde_json::json;

pub const INVALID_BODY: &str = "Invalid request body";
pub const INVALID_JSON: &str = "Invalid JSON in request body";
pub const INVALID_PROVIDER_CONFIG: &str =
    "Invalid provider configuration - please specify baseUrl or a valid provider name";

/// Error answered by the gateway itself, always as a JSON body.
#[derive(Debug)]
pub struct ProxyError {
    pub status: StatusCode,
    pub body: Bytes,
}

impl ProxyError {
    fn message(status: StatusCode, message: impl AsRef<str>) -> Self {
        Self {
            status,
            body: Bytes::from(json!({ "error": message.as_ref() }).to_string()),
        }
    }

    pub fn bad_request(message: impl AsRef<str>) -> Self {
        Self::message(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl AsRef<str>) -> Self {
        Self::message(StatusCode::NOT_FOUND, message)
    }

    pub fn invalid_provider_config() -> Self {
        Self::message(StatusCode::INTERNAL_SERVER_ERROR, INVALID_PROVIDER_CONFIG)
    }

    pub fn transport(failure: &TransportFailure) -> Self {
        let status = failure.status();
        Self {
            status,
            body: Bytes::from(
                json!({
                    "error": "Proxy error",
                    "details": failure.message,
                    "status": status.as_u16(),
                })
                .to_string(),
            ),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let mut resp = Response::new(Body::from(self.body));
        *resp.status_mut() = self.status;
        resp.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        resp
    }
}
