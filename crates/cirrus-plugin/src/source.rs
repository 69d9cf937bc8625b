//! Where plugins come from.
//!
//! Discovering and importing plugin code is the job of a [`PluginSource`].
//! The registry only asks it for "everything under this root" at startup and
//! "whatever this path holds now" when the watcher sees a change.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cirrus_core::RegistryResult;
use parking_lot::RwLock;

use crate::plugin::Plugin;

/// Produces plugins from a plugin root.
#[async_trait]
pub trait PluginSource: Send + Sync {
    /// Loads every plugin under `root`.
    async fn load_all(&self, root: &Path) -> RegistryResult<Vec<Plugin>>;

    /// Loads the plugin at `path`.
    ///
    /// `Ok(None)` means the path no longer holds a plugin; plugins previously
    /// loaded from it are removed.
    async fn load(&self, path: &Path) -> RegistryResult<Option<Plugin>>;
}

/// In-memory source for plugins compiled into the binary.
///
/// Plugins added with [`with_plugin`](Self::with_plugin) are returned by
/// every `load_all`. Plugins added with [`set_path`](Self::set_path) are also
/// returned by `load` for that path, which lets an embedding application (or
/// a test) swap a plugin's hook set at runtime.
#[derive(Default)]
pub struct StaticPluginSource {
    plugins: RwLock<Vec<Plugin>>,
    by_path: RwLock<HashMap<PathBuf, Plugin>>,
}

impl StaticPluginSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plugin with no backing path.
    pub fn with_plugin(self, plugin: Plugin) -> Self {
        self.plugins.write().push(plugin);
        self
    }

    /// Binds `plugin` to `path`, replacing whatever the path held.
    pub fn set_path(&self, path: impl Into<PathBuf>, plugin: Plugin) {
        let path = path.into();
        let plugin = plugin.loaded_from(path.clone());
        self.by_path.write().insert(path, plugin);
    }

    /// Unbinds `path`.
    pub fn clear_path(&self, path: &Path) {
        self.by_path.write().remove(path);
    }
}

#[async_trait]
impl PluginSource for StaticPluginSource {
    async fn load_all(&self, _root: &Path) -> RegistryResult<Vec<Plugin>> {
        let mut plugins = self.plugins.read().clone();
        let mut by_path: Vec<_> = self.by_path.read().values().cloned().collect();
        by_path.sort_by(|a, b| a.source().cmp(&b.source()));
        plugins.extend(by_path);
        Ok(plugins)
    }

    async fn load(&self, path: &Path) -> RegistryResult<Option<Plugin>> {
        Ok(self.by_path.read().get(path).cloned())
    }
}
