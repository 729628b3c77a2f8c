use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use oproxy_core::SnapshotStore;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config_file;

const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Reloads the config file into the snapshot store whenever it changes on disk.
/// Watching stops when this is dropped.
pub(crate) struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl ConfigWatcher {
    pub(crate) fn start(path: PathBuf, store: Arc<SnapshotStore>) -> anyhow::Result<Self> {
        // Editors often replace the file instead of writing it in place, so the
        // parent directory is watched and events are filtered by file name.
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let file_name = path
            .file_name()
            .map(OsString::from)
            .with_context(|| format!("config path {} has no file name", path.display()))?;

        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) if touches(&event, &file_name) => {
                    let _ = tx.send(());
                }
                Ok(_) => {}
                Err(err) => warn!(error = %err, "config watcher error"),
            },
            Config::default(),
        )
        .context("create config watcher")?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("watch {}", dir.display()))?;
        info!(path = %path.display(), "config watcher started");

        let task = tokio::spawn(async move {
            while rx.recv().await.is_some() {
                // Coalesce the burst of events a single save produces.
                tokio::time::sleep(SETTLE_DELAY).await;
                while rx.try_recv().is_ok() {}
                match reload(&path, &store) {
                    Ok(models) => info!(path = %path.display(), models, "config reloaded"),
                    Err(err) => warn!(
                        path = %path.display(),
                        error = %format_args!("{err:#}"),
                        "config reload failed, keeping previous snapshot"
                    ),
                }
            }
        });

        Ok(Self {
            _watcher: watcher,
            task,
        })
    }
}

fn touches(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name.as_os_str()))
}

/// Publishes the file's current content as the new snapshot. On failure the store is
/// left untouched.
pub(crate) fn reload(path: &Path, store: &SnapshotStore) -> anyhow::Result<usize> {
    let snapshot = config_file::load(path)?.snapshot()?;
    let models = snapshot.len();
    store.replace(snapshot);
    Ok(models)
}
