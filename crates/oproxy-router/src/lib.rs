//! HTTP surface of the gateway: Ollama-compatible metadata endpoints merged with the
//! chat pipeline routes from `oproxy-core`.

mod ollama;

use axum::Router;
use axum::http::StatusCode;
use oproxy_core::Core;

pub use ollama::ollama_router;

/// Full application router. Unknown paths, and known paths hit with an unsupported
/// method, answer `404 Not Found` as plain text.
pub fn gateway_router(core: &Core) -> Router {
    Router::new()
        .merge(ollama_router(core.state().snapshot.clone()))
        .merge(core.router())
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}
