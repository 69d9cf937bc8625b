//! Cirrus Runtime - event dispatch and lifecycle for the Cirrus chat bot
//! engine.
//!
//! This crate provides:
//! - The lifecycle controller ([`CirrusRuntime`]): load plugins, connect,
//!   dispatch, stop / restart
//! - The dispatcher: one loop over the event queue, one task per handler,
//!   per-handler error boundaries and singlethread slots
//! - Configuration loading ([`config`]) and logging setup ([`logging`])
//!
//! ```rust,ignore
//! use cirrus_runtime::{CirrusRuntime, Shutdown};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = CirrusRuntime::builder()
//!         .registry(Arc::new(PluginRegistry::new(plugins())))
//!         .connection_factory(MyConnectionFactory)
//!         .build()?;
//!
//!     // Runs until stop(), restart() or Ctrl+C
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

mod connections;
mod dispatcher;
mod state;

#[cfg(test)]
mod testing;

pub use config::{CirrusConfig, ConfigError, ConfigLoader, ConfigResult};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{CirrusRuntime, RuntimeBuilder, Shutdown};

// Re-export tracing for use by plugin crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros for plugin code.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
