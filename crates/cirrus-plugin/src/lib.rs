//! # Cirrus Plugin
//!
//! The hook registry used by the Cirrus engine.
//!
//! - [`Plugin`] / [`Hook`] / [`Trigger`]: declaring what a plugin handles
//! - [`PluginSource`]: where plugins come from ([`StaticPluginSource`] for
//!   plugins compiled into the binary)
//! - [`PluginRegistry`]: a [`HookRegistry`](cirrus_core::HookRegistry) whose
//!   hook set is swapped atomically on reload, with an optional filesystem
//!   watcher on the plugin root

pub mod plugin;
pub mod registry;
pub mod snapshot;
pub mod source;
mod watcher;

pub use plugin::{Hook, Plugin, Trigger};
pub use registry::PluginRegistry;
pub use snapshot::HookSnapshot;
pub use source::{PluginSource, StaticPluginSource};
