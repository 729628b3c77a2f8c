use std::sync::Arc;

use axum::Router;
use axum::routing::any;
use oproxy_common::ConfigSnapshot;

use crate::handler::chat_handler;
use crate::upstream_client::UpstreamClient;

/// Returns the snapshot current at call time. Handlers call it once per request.
pub type SnapshotLoader = Arc<dyn Fn() -> Arc<ConfigSnapshot> + Send + Sync>;

pub struct CoreState {
    pub snapshot: SnapshotLoader,
    pub client: Arc<dyn UpstreamClient>,
}

pub struct Core {
    state: Arc<CoreState>,
}

impl Core {
    pub fn new(snapshot: SnapshotLoader, client: Arc<dyn UpstreamClient>) -> Self {
        Self {
            state: Arc::new(CoreState { snapshot, client }),
        }
    }

    /// Chat pipeline routes: everything under `/v1/chat/`.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/v1/chat/", any(chat_handler))
            .route("/v1/chat/{*path}", any(chat_handler))
            .with_state(self.state.clone())
    }

    pub fn state(&self) -> Arc<CoreState> {
        self.state.clone()
    }
}
