use std::sync::Arc;
use std::time::Instant;

use axum::body::{Body, to_bytes};
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use oproxy_provider_core::{
    ResolveError, UpstreamHttpResponse, join_repeated, locate, resolve, transform,
};
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::CoreState;
use crate::error::{INVALID_BODY, INVALID_JSON, ProxyError};
use crate::forward::forward;

const REQUEST_ID_HEADER: &str = "x-oproxy-request-id";

/// `/v1/chat/*`: resolve the alias, locate the upstream, rewrite the body and relay.
pub async fn chat_handler(
    State(state): State<Arc<CoreState>>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> Response {
    let started_at = Instant::now();
    let trace_id = Uuid::new_v4().to_string();
    // Captured once: a reload during this request does not affect it.
    let snapshot = (state.snapshot)();

    let body = match to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(err) => {
            warn!(event = "downstream_rejected", trace_id = %trace_id, error = %err);
            return ProxyError::bad_request(INVALID_BODY).into_response();
        }
    };
    debug!(
        event = "downstream_request",
        trace_id = %trace_id,
        method = %method,
        headers = ?headers,
        body = %String::from_utf8_lossy(&body)
    );

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(event = "downstream_rejected", trace_id = %trace_id, error = %err);
            return ProxyError::bad_request(INVALID_JSON).into_response();
        }
    };

    let alias = match requested_alias(&payload) {
        Ok(alias) => alias,
        Err(label) => {
            info!(event = "downstream_rejected", trace_id = %trace_id, alias = %label, status = 404);
            let err = ResolveError::NotFound { alias: label };
            return ProxyError::not_found(err.to_string()).into_response();
        }
    };
    let profile = match resolve(&snapshot, &alias) {
        Ok(profile) => profile,
        Err(err) => {
            info!(event = "downstream_rejected", trace_id = %trace_id, alias = %alias, status = 404);
            return ProxyError::not_found(err.to_string()).into_response();
        }
    };

    let base_url = match locate(profile) {
        Ok(base_url) => base_url,
        Err(err) => {
            error!(event = "provider_misconfigured", trace_id = %trace_id, error = %err);
            return ProxyError::invalid_provider_config().into_response();
        }
    };

    info!(
        event = "downstream_received",
        trace_id = %trace_id,
        alias = %alias,
        upstream_model = %profile.upstream_model,
        base_url = %base_url,
        method = %method
    );

    let payload = transform(payload, profile);
    let result = forward(
        state.client.as_ref(),
        method,
        base_url,
        &payload,
        &headers,
        profile,
    )
    .await;

    match result {
        Ok(upstream) => {
            info!(
                event = "downstream_responded",
                trace_id = %trace_id,
                alias = %alias,
                status = upstream.status,
                elapsed_ms = started_at.elapsed().as_millis()
            );
            debug!(
                event = "upstream_response",
                trace_id = %trace_id,
                headers = ?upstream.headers,
                body = %String::from_utf8_lossy(&upstream.body)
            );
            relay_response(upstream, &trace_id)
        }
        Err(failure) => {
            let err = ProxyError::transport(&failure);
            warn!(
                event = "downstream_responded",
                trace_id = %trace_id,
                alias = %alias,
                status = err.status.as_u16(),
                error = %failure.message,
                elapsed_ms = started_at.elapsed().as_millis()
            );
            err.into_response()
        }
    }
}

/// The `model` field when it is a string. Otherwise the label reported in the 404:
/// `undefined` when absent, the JSON text for any other value.
fn requested_alias(payload: &Value) -> Result<String, String> {
    match payload.get("model") {
        Some(Value::String(alias)) => Ok(alias.clone()),
        Some(other) => Err(other.to_string()),
        None => Err("undefined".to_string()),
    }
}

fn relay_response(upstream: UpstreamHttpResponse, trace_id: &str) -> Response {
    let mut resp = Response::new(Body::from(upstream.body));
    *resp.status_mut() = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    for (name, value) in join_repeated(upstream.headers) {
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) else {
            continue;
        };
        resp.headers_mut().insert(name, value);
    }
    if let Ok(value) = HeaderValue::from_str(trace_id) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    resp
}
