//! # Cirrus
//!
//! An event dispatch and lifecycle engine for chat-protocol bots.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐     ┌────────────┐     ┌────────────┐     ┌──────────────────────────┐
//! │ Connection │────▶│ EventQueue │────▶│ Dispatcher │────▶│ hook "ctcp:ping"  (task) │
//! │ Connection │────▶│   (FIFO)   │     │            │────▶│ hook "log:all"    (task) │
//! └────────────┘     └────────────┘     └─────┬──────┘     └──────────────────────────┘
//!                                             │ resolve
//!                                      ┌──────▼───────┐
//!                                      │ HookRegistry │◀── plugin reload
//!                                      └──────────────┘
//! ```
//!
//! - **Connections** parse inbound lines into events and push them onto the
//!   single queue
//! - **The dispatcher** resolves each event against the current hook set and
//!   runs every matching handler as its own task
//! - **The runtime** loads plugins, connects, and stops or restarts the whole
//!   engine
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cirrus::prelude::*;
//!
//! fn core_plugin() -> Plugin {
//!     Plugin::new("core").hook(Hook::on_command(
//!         "pong",
//!         "PING",
//!         handler_fn(|event: Arc<Event>| async move {
//!             event.reply_command("PONG", &[event.last_param().to_string()]);
//!             Ok(())
//!         }),
//!     ))
//! }
//!
//! fn main() -> anyhow::Result<()> {
//!     let registry = PluginRegistry::new(StaticPluginSource::new().with_plugin(core_plugin()));
//!     let runtime = CirrusRuntime::builder()
//!         .registry(Arc::new(registry))
//!         .connection_factory(MyConnectionFactory)
//!         .build()?;
//!
//!     while runtime.run_blocking()? == Shutdown::Restart {}
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use cirrus_core as core;
pub use cirrus_plugin as plugin;
pub use cirrus_runtime as runtime;

/// Commonly used types for building a bot.
///
/// ```rust,ignore
/// use cirrus::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    // Runtime
    pub use cirrus_runtime::{CirrusConfig, CirrusRuntime, ConfigLoader, Shutdown};

    // Plugins
    pub use cirrus_plugin::{Hook, Plugin, PluginRegistry, PluginSource, StaticPluginSource};

    // Core contracts
    pub use cirrus_core::{
        BoxedConnection, ConnectError, ConnectResult, Connection, ConnectionFactory,
        ConnectionRecord, Event, EventSink, HandlerResult, HookRegistry, SingleThread, Source,
        handler_fn,
    };

    // Logging
    pub use cirrus_runtime::prelude::*;
}
