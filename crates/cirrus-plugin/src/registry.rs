//! Snapshot-based [`HookRegistry`] implementation.
//!
//! [`PluginRegistry`] keeps the live hook set in an [`ArcSwap`]. Readers
//! (`resolve`) load the current snapshot without locking; writers build a new
//! snapshot under a mutex and publish it with a single store. A reload that
//! lands while the dispatcher is resolving an event is therefore seen either
//! completely or not at all.
//!
//! ```rust,ignore
//! let source = StaticPluginSource::new().with_plugin(core_plugin());
//! let registry = PluginRegistry::new(source);
//! registry.load_all(Path::new("plugins")).await?;
//! registry.start_reloader()?;
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use cirrus_core::{
    Event, HandlerDescriptor, HookRegistry, RegistryError, RegistryResult, ResolutionError,
};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::plugin::Plugin;
use crate::snapshot::{HookSnapshot, LoadedPlugin};
use crate::source::PluginSource;
use crate::watcher::ReloadWatcher;

struct RegistryInner {
    snapshot: ArcSwap<HookSnapshot>,
    source: Arc<dyn PluginSource>,
    root: Mutex<Option<PathBuf>>,
    /// Serializes writers; readers never take it.
    write: Mutex<()>,
    watcher: Mutex<Option<ReloadWatcher>>,
}

/// Hot-reloadable hook registry.
///
/// Cheap to clone; clones share the same snapshot.
#[derive(Clone)]
pub struct PluginRegistry {
    inner: Arc<RegistryInner>,
}

impl PluginRegistry {
    /// Creates an empty registry backed by `source`.
    pub fn new(source: impl PluginSource + 'static) -> Self {
        Self::from_arc(Arc::new(source))
    }

    /// Creates an empty registry backed by a shared source.
    pub fn from_arc(source: Arc<dyn PluginSource>) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                snapshot: ArcSwap::from_pointee(HookSnapshot::default()),
                source,
                root: Mutex::new(None),
                write: Mutex::new(()),
                watcher: Mutex::new(None),
            }),
        }
    }

    /// Returns the current snapshot.
    pub fn snapshot(&self) -> Arc<HookSnapshot> {
        self.inner.snapshot.load_full()
    }

    /// Plugin names in registration order.
    pub fn plugin_names(&self) -> Vec<String> {
        self.inner.snapshot.load().plugin_names()
    }

    /// Total number of hooks.
    pub fn hook_count(&self) -> usize {
        self.inner.snapshot.load().hook_count()
    }

    /// Whether the reload watcher is running.
    pub fn is_reloading(&self) -> bool {
        self.inner.watcher.lock().is_some()
    }

    /// Installs `plugin`, replacing a loaded plugin with the same name.
    pub fn install(&self, plugin: Plugin) {
        let loaded = LoadedPlugin::new(&plugin);
        let hooks = loaded.hook_count();
        self.update(|current| current.with_installed(loaded));
        info!(plugin = %plugin.name(), hooks, "Plugin installed");
    }

    /// Removes the named plugin. Returns `false` if it was not loaded.
    pub fn remove(&self, name: &str) -> bool {
        let removed = self.update_counting(|current| current.without(|p| p.name() == name));
        if removed > 0 {
            info!(plugin = %name, "Plugin removed");
        }
        removed > 0
    }

    /// Removes every plugin loaded from `path`. Returns how many were removed.
    pub fn remove_source(&self, path: &Path) -> usize {
        let removed =
            self.update_counting(|current| current.without(|p| p.source() == Some(path)));
        if removed > 0 {
            info!(path = %path.display(), removed, "Plugins unloaded");
        }
        removed
    }

    /// Re-reads `path` through the source and swaps the result in.
    ///
    /// On failure the previous hook set stays in place.
    pub async fn reload_path(&self, path: &Path) {
        match self.inner.source.load(path).await {
            Ok(Some(plugin)) => {
                let plugin = if plugin.source().is_none() {
                    plugin.loaded_from(path)
                } else {
                    plugin
                };
                debug!(path = %path.display(), plugin = %plugin.name(), "Reloading plugin");
                self.install(plugin);
            }
            Ok(None) => {
                self.remove_source(path);
            }
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to reload plugin, keeping previous hooks"
                );
            }
        }
    }

    fn update<F>(&self, build: F)
    where
        F: FnOnce(&HookSnapshot) -> HookSnapshot,
    {
        let _guard = self.inner.write.lock();
        let current = self.inner.snapshot.load();
        let next = build(&current);
        self.inner.snapshot.store(Arc::new(next));
    }

    fn update_counting<F>(&self, build: F) -> usize
    where
        F: FnOnce(&HookSnapshot) -> HookSnapshot,
    {
        let _guard = self.inner.write.lock();
        let current = self.inner.snapshot.load();
        let next = build(&current);
        let removed = current.plugins().len() - next.plugins().len();
        self.inner.snapshot.store(Arc::new(next));
        removed
    }
}

#[async_trait]
impl HookRegistry for PluginRegistry {
    async fn load_all(&self, root: &Path) -> RegistryResult<()> {
        let plugins = self.inner.source.load_all(root).await?;

        let mut seen = HashSet::new();
        for plugin in &plugins {
            if !seen.insert(plugin.name()) {
                return Err(RegistryError::DuplicatePlugin(plugin.name().to_string()));
            }
        }

        let loaded: Vec<Arc<LoadedPlugin>> = plugins
            .iter()
            .map(|plugin| {
                let loaded = LoadedPlugin::new(plugin);
                debug!(plugin = %plugin.name(), hooks = loaded.hook_count(), "Plugin loaded");
                Arc::new(loaded)
            })
            .collect();

        self.update(|_| HookSnapshot::from_plugins(loaded));
        *self.inner.root.lock() = Some(root.to_path_buf());

        info!(
            root = %root.display(),
            plugins = plugins.len(),
            hooks = self.hook_count(),
            "All plugins loaded"
        );
        Ok(())
    }

    fn resolve(&self, event: &Event) -> Result<Vec<Arc<HandlerDescriptor>>, ResolutionError> {
        Ok(self.inner.snapshot.load().resolve(event))
    }

    fn start_reloader(&self) -> RegistryResult<()> {
        let mut watcher = self.inner.watcher.lock();
        if watcher.is_some() {
            warn!("Plugin reloader is already running");
            return Ok(());
        }

        let root = self.inner.root.lock().clone().ok_or(RegistryError::NoRoot)?;
        *watcher = Some(ReloadWatcher::start(&root, self.clone())?);
        Ok(())
    }

    fn stop_reloader(&self) {
        if let Some(watcher) = self.inner.watcher.lock().take() {
            watcher.stop();
        }
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugin_names())
            .field("reloading", &self.is_reloading())
            .finish()
    }
}
