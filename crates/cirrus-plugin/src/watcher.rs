//! Filesystem watcher driving plugin hot reload.

use std::path::{Path, PathBuf};

use notify::{Event as FsEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

use cirrus_core::{RegistryError, RegistryResult};

use crate::registry::PluginRegistry;

/// What a filesystem change means for the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Change {
    Reload(PathBuf),
    Remove(PathBuf),
}

fn classify(event: FsEvent) -> Vec<Change> {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) => {
            event.paths.into_iter().map(Change::Reload).collect()
        }
        EventKind::Remove(_) => event.paths.into_iter().map(Change::Remove).collect(),
        _ => Vec::new(),
    }
}

/// Watches the plugin root and feeds changes back into a [`PluginRegistry`].
///
/// The notify callback runs on notify's own thread and only forwards events;
/// reloads happen on a tokio task so a slow source never blocks the watcher.
pub(crate) struct ReloadWatcher {
    _watcher: RecommendedWatcher,
    cancel: CancellationToken,
}

impl ReloadWatcher {
    /// Starts watching `root`. Must be called from inside a tokio runtime.
    pub(crate) fn start(root: &Path, registry: PluginRegistry) -> RegistryResult<Self> {
        if !root.exists() {
            return Err(RegistryError::RootNotFound(root.to_path_buf()));
        }
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| RegistryError::Watcher(e.to_string()))?;

        let (tx, mut rx) = mpsc::unbounded_channel::<Change>();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<FsEvent>| match res {
                Ok(event) => {
                    for change in classify(event) {
                        let _ = tx.send(change);
                    }
                }
                Err(e) => error!(error = %e, "Plugin watch error"),
            },
            notify::Config::default(),
        )
        .map_err(|e| RegistryError::Watcher(e.to_string()))?;

        watcher
            .watch(root, RecursiveMode::Recursive)
            .map_err(|e| RegistryError::Watcher(e.to_string()))?;

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        handle.spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    change = rx.recv() => match change {
                        Some(Change::Reload(path)) => {
                            trace!(path = %path.display(), "Plugin file changed");
                            registry.reload_path(&path).await;
                        }
                        Some(Change::Remove(path)) => {
                            trace!(path = %path.display(), "Plugin file removed");
                            registry.remove_source(&path);
                        }
                        None => break,
                    },
                }
            }
            debug!("Plugin reload task finished");
        });

        info!(root = %root.display(), "Plugin reloader started");
        Ok(Self {
            _watcher: watcher,
            cancel,
        })
    }

    /// Stops the watcher. The notify handle is dropped with `self`.
    pub(crate) fn stop(self) {
        self.cancel.cancel();
        info!("Plugin reloader stopped");
    }
}
