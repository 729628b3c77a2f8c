use bytes::Bytes;
use http::{HeaderMap, Method};
use oproxy_common::ProviderProfile;
use oproxy_provider_core::{
    Headers, TransportFailure, UpstreamHttpRequest, UpstreamHttpResponse, chat_completions_url,
    outbound_headers,
};
use serde_json::Value;

use crate::upstream_client::UpstreamClient;

/// Sends the transformed chat request to `{base_url}/chat/completions` and waits for
/// the complete upstream reply.
pub async fn forward(
    client: &dyn UpstreamClient,
    method: Method,
    base_url: &str,
    body: &Value,
    inbound_headers: &HeaderMap,
    profile: &ProviderProfile,
) -> Result<UpstreamHttpResponse, TransportFailure> {
    let headers = outbound_headers(&headers_from_http(inbound_headers), &profile.api_key);
    let req = UpstreamHttpRequest {
        method,
        url: chat_completions_url(base_url),
        headers,
        body: Bytes::from(body.to_string()),
    };
    client.send(req).await
}

fn headers_from_http(map: &HeaderMap) -> Headers {
    map.iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}
