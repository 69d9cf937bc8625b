//! Hook registry contract.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{RegistryResult, ResolutionError};
use crate::event::Event;
use crate::hook::HandlerDescriptor;

/// Maps events to handlers and keeps that mapping up to date.
///
/// `resolve` may race with a reload. Implementations must answer from one
/// consistent handler set (entirely before or entirely after the reload).
/// Callers must not cache the result across events.
#[async_trait]
pub trait HookRegistry: Send + Sync {
    /// Loads every plugin found under `root`.
    async fn load_all(&self, root: &Path) -> RegistryResult<()>;

    /// Returns the handlers for `event`, in registry order.
    fn resolve(&self, event: &Event) -> Result<Vec<Arc<HandlerDescriptor>>, ResolutionError>;

    /// Starts watching the plugin root for changes.
    fn start_reloader(&self) -> RegistryResult<()>;

    /// Stops the watcher. Must be idempotent.
    fn stop_reloader(&self);
}

/// Shared registry handle.
pub type BoxedRegistry = Arc<dyn HookRegistry>;
