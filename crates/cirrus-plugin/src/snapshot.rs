//! Immutable hook snapshots.
//!
//! Every registry mutation produces a fresh [`HookSnapshot`]; readers always
//! see one whole snapshot, never a half-updated one.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cirrus_core::{Event, HandlerDescriptor};

use crate::plugin::{Plugin, Trigger};

/// A plugin as it sits in a snapshot: its hooks already turned into
/// descriptors.
#[derive(Debug)]
pub(crate) struct LoadedPlugin {
    name: String,
    source: Option<PathBuf>,
    hooks: Vec<(Trigger, Arc<HandlerDescriptor>)>,
}

impl LoadedPlugin {
    pub(crate) fn new(plugin: &Plugin) -> Self {
        let hooks = plugin
            .hooks()
            .iter()
            .map(|hook| {
                let desc = HandlerDescriptor::new(
                    plugin.name(),
                    hook.name(),
                    hook.singlethread_policy(),
                    Arc::clone(hook.handler()),
                );
                (hook.trigger().clone(), Arc::new(desc))
            })
            .collect();

        Self {
            name: plugin.name().to_string(),
            source: plugin.source().map(Path::to_path_buf),
            hooks,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub(crate) fn hook_count(&self) -> usize {
        self.hooks.len()
    }
}

/// The complete set of loaded plugins at one point in time.
#[derive(Debug, Default)]
pub struct HookSnapshot {
    plugins: Vec<Arc<LoadedPlugin>>,
}

impl HookSnapshot {
    pub(crate) fn from_plugins(plugins: Vec<Arc<LoadedPlugin>>) -> Self {
        Self { plugins }
    }

    pub(crate) fn plugins(&self) -> &[Arc<LoadedPlugin>] {
        &self.plugins
    }

    /// Handlers for `event`: plugins in registration order, hooks in
    /// declaration order.
    pub fn resolve(&self, event: &Event) -> Vec<Arc<HandlerDescriptor>> {
        self.plugins
            .iter()
            .flat_map(|plugin| plugin.hooks.iter())
            .filter(|(trigger, _)| trigger.matches(event))
            .map(|(_, desc)| Arc::clone(desc))
            .collect()
    }

    /// Plugin names in registration order.
    pub fn plugin_names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.name.clone()).collect()
    }

    /// Total number of hooks across all plugins.
    pub fn hook_count(&self) -> usize {
        self.plugins.iter().map(|p| p.hook_count()).sum()
    }

    /// Copy of this snapshot with `plugin` installed.
    ///
    /// A plugin with the same name is replaced in place, keeping its
    /// position; otherwise the plugin is appended.
    pub(crate) fn with_installed(&self, plugin: LoadedPlugin) -> Self {
        let mut plugins = self.plugins.clone();
        let plugin = Arc::new(plugin);
        match plugins.iter().position(|p| p.name == plugin.name) {
            Some(pos) => plugins[pos] = plugin,
            None => plugins.push(plugin),
        }
        Self { plugins }
    }

    /// Copy of this snapshot without the plugins matching `remove`.
    pub(crate) fn without<F>(&self, remove: F) -> Self
    where
        F: Fn(&LoadedPlugin) -> bool,
    {
        Self {
            plugins: self
                .plugins
                .iter()
                .filter(|p| !remove(p))
                .cloned()
                .collect(),
        }
    }
}
