pub mod core;
pub mod error;
pub mod forward;
pub mod handler;
pub mod snapshot;
pub mod upstream_client;

pub use core::{Core, CoreState, SnapshotLoader};
pub use error::ProxyError;
pub use forward::forward;
pub use snapshot::SnapshotStore;
pub use upstream_client::{UpstreamClient, UpstreamClientConfig, WreqUpstreamClient};
