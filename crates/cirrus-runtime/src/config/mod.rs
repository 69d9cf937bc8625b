//! Configuration for the Cirrus runtime.
//!
//! Layered loading through figment (files, `CIRRUS_*` environment variables,
//! programmatic overrides) and validation of the resulting [`CirrusConfig`].

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    CirrusConfig, ConnectionConfig, EngineConfig, LogFormat, LogLevel, LogOutput, LoggingConfig,
    PluginsConfig, SpanEventConfig,
};
pub use validation::{validate_config, validate_connections};
