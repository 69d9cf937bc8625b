//! Unified error types for the Cirrus core contracts.
//!
//! Every failure the engine can observe falls into one of these categories.
//! None of them except [`RegistryError`] during the initial plugin load is
//! fatal to the engine; the runtime logs them with enough context to
//! reproduce and keeps going.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Handler Errors
// =============================================================================

/// Error returned by a hook handler.
///
/// Handlers may fail with any error type; the dispatcher only needs to log it.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by hook handlers.
pub type HandlerResult = Result<(), HandlerError>;

// =============================================================================
// Connection Errors
// =============================================================================

/// Errors that can occur while a connection establishes its session.
#[derive(Debug, Clone, Error)]
pub enum ConnectError {
    /// The endpoint could not be reached or refused the session.
    #[error("connection to {server}:{port} failed: {reason}")]
    Failed {
        /// Server address of the endpoint.
        server: String,
        /// Port of the endpoint.
        port: u16,
        /// Reason for failure.
        reason: String,
    },

    /// The connection was closed before it finished connecting.
    #[error("connection closed: {reason}")]
    Closed {
        /// Reason for closure.
        reason: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ConnectError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Registry Errors
// =============================================================================

/// The registry could not resolve handlers for an event.
///
/// The dispatcher treats this as "emit nothing for this event".
#[derive(Debug, Clone, Error)]
pub enum ResolutionError {
    /// The registry is mid-update and refused to answer.
    #[error("hook registry unavailable: {0}")]
    Unavailable(String),

    /// The registry holds an entry it cannot interpret.
    #[error("inconsistent hook entry '{hook}': {reason}")]
    Inconsistent {
        /// Identifier of the offending hook.
        hook: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Errors raised while loading or reloading plugins.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The plugin root does not exist.
    #[error("plugin directory not found: {0}")]
    RootNotFound(PathBuf),

    /// A single plugin failed to load.
    #[error("failed to load plugin from {path}: {reason}")]
    Load {
        /// Path the plugin was loaded from.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Two plugins in one load pass share a name.
    #[error("duplicate plugin name: {0}")]
    DuplicatePlugin(String),

    /// The reload watcher could not be started.
    #[error("failed to start plugin reloader: {0}")]
    Watcher(String),

    /// The reload watcher was started before any plugin root was loaded.
    #[error("plugin reloader has no root; call load_all first")]
    NoRoot,
}

impl RegistryError {
    /// Creates a load error for the given path.
    pub fn load(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for connection establishment.
pub type ConnectResult<T> = Result<T, ConnectError>;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;
