//! Provider-side building blocks for oproxy.
//!
//! This crate intentionally does **not** depend on axum or any concrete HTTP client.
//! It resolves aliases, locates upstream base URLs, rewrites request bodies and
//! describes the upstream call, while a higher layer performs IO.

pub mod errors;
pub mod headers;
pub mod locate;
pub mod provider;
pub mod resolve;
pub mod transform;

pub use errors::{LocateError, ResolveError};
pub use headers::{
    Headers, header_get, header_set, is_framing_header, join_repeated,
    outbound_headers,
};
pub use locate::{PROVIDER_BASE_URLS, chat_completions_url, locate, provider_base_url};
pub use provider::{
    TransportErrorKind, TransportFailure, UpstreamHttpRequest, UpstreamHttpResponse,
    status_for_transport_message,
};
pub use resolve::resolve;
pub use transform::transform;
