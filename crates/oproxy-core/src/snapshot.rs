use std::sync::Arc;

use arc_swap::ArcSwap;
use oproxy_common::ConfigSnapshot;

use crate::core::SnapshotLoader;

/// Holder of the live configuration snapshot.
///
/// Readers get an `Arc` to the snapshot current at load time and keep it for as
/// long as they need; `replace` publishes a new one without touching theirs.
#[derive(Debug)]
pub struct SnapshotStore {
    snapshot: ArcSwap<ConfigSnapshot>,
}

impl SnapshotStore {
    pub fn new(snapshot: ConfigSnapshot) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(snapshot),
        }
    }

    pub fn load(&self) -> Arc<ConfigSnapshot> {
        self.snapshot.load_full()
    }

    pub fn replace(&self, snapshot: ConfigSnapshot) {
        self.snapshot.store(Arc::new(snapshot));
    }

    pub fn loader(self: &Arc<Self>) -> SnapshotLoader {
        let store = self.clone();
        Arc::new(move || store.load())
    }
}
