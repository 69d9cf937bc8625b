//! Runtime error types.

use cirrus_core::RegistryError;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Initial plugin load failed.
    #[error("Failed to load plugins: {0}")]
    Registry(#[from] RegistryError),

    /// `run` was called on a runtime that has already been started.
    #[error("Runtime has already been started")]
    AlreadyStarted,

    /// A required component was not supplied to the builder.
    #[error("Runtime builder is missing the {0}")]
    MissingComponent(&'static str),

    /// The async executor could not be created.
    #[error("Failed to build async runtime: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
