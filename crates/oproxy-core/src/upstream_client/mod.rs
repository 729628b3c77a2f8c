use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use oproxy_common::ServerConfig;
use oproxy_provider_core::{
    Headers, TransportErrorKind, TransportFailure, UpstreamHttpRequest, UpstreamHttpResponse,
};
use wreq::{Client, Proxy};

pub trait UpstreamClient: Send + Sync {
    fn send<'a>(
        &'a self,
        req: UpstreamHttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<UpstreamHttpResponse, TransportFailure>> + Send + 'a>>;
}

#[derive(Debug, Clone)]
pub struct UpstreamClientConfig {
    pub proxy: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Upstream certificates are accepted without validation unless this is set.
    pub verify_certificates: bool,
}

impl UpstreamClientConfig {
    pub fn from_server(server: &ServerConfig) -> Self {
        Self {
            proxy: normalize_proxy(server.proxy.clone()),
            connect_timeout: Duration::from_secs(server.connect_timeout_secs),
            request_timeout: Duration::from_secs(server.request_timeout_secs),
            verify_certificates: false,
        }
    }
}

impl Default for UpstreamClientConfig {
    fn default() -> Self {
        Self::from_server(&ServerConfig::default())
    }
}

#[derive(Clone)]
pub struct WreqUpstreamClient {
    client: Client,
}

impl WreqUpstreamClient {
    pub fn new(config: UpstreamClientConfig) -> Result<Self, wreq::Error> {
        Ok(Self {
            client: build_client(&config)?,
        })
    }
}

fn normalize_proxy(value: Option<String>) -> Option<String> {
    value
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
}

fn build_client(config: &UpstreamClientConfig) -> Result<Client, wreq::Error> {
    let mut builder = Client::builder()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .cert_verification(config.verify_certificates);

    if let Some(proxy) = config.proxy.as_deref() {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    builder.build()
}

impl UpstreamClient for WreqUpstreamClient {
    fn send<'a>(
        &'a self,
        req: UpstreamHttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<UpstreamHttpResponse, TransportFailure>> + Send + 'a>>
    {
        Box::pin(async move {
            let mut builder = self.client.request(req.method, &req.url);

            for (k, v) in &req.headers {
                builder = builder.header(k, v);
            }

            let resp = builder.body(req.body).send().await.map_err(map_wreq_error)?;
            let status = resp.status().as_u16();
            let headers = headers_from_wreq(resp.headers());
            let body = resp.bytes().await.map_err(map_wreq_error)?;
            Ok(UpstreamHttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}

fn headers_from_wreq(map: &wreq::header::HeaderMap) -> Headers {
    map.iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}

fn map_wreq_error(err: wreq::Error) -> TransportFailure {
    let detail = error_chain(&err);
    let kind = transport_kind(
        &detail,
        err.is_timeout(),
        err.is_connect() || err.is_connection_reset(),
    );
    TransportFailure::new(kind, detail)
}

/// Top-level message followed by each distinct source message.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}

/// Kind of a failed exchange, from the client's timeout/connect flags and the full
/// error chain text.
fn transport_kind(detail: &str, timed_out: bool, connect: bool) -> TransportErrorKind {
    let detail = detail.to_ascii_lowercase();
    let mentions = |needles: &[&str]| needles.iter().any(|needle| detail.contains(needle));

    if timed_out {
        if mentions(&["read", "idle"]) {
            TransportErrorKind::ReadTimeout
        } else {
            TransportErrorKind::Timeout
        }
    } else if mentions(&["tls", "ssl", "certificate"]) {
        TransportErrorKind::Tls
    } else if connect && mentions(&["dns", "resolve", "lookup"]) {
        TransportErrorKind::Dns
    } else if connect {
        TransportErrorKind::Connect
    } else {
        TransportErrorKind::Other
    }
}
