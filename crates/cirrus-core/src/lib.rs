//! # Cirrus Core
//!
//! Contracts shared by every layer of the Cirrus chat bot engine.
//!
//! ```text
//! ┌────────────┐ enqueue ┌────────────┐ dequeue ┌────────────┐ resolve ┌──────────────┐
//! │ Connection │────────▶│ EventQueue │────────▶│ Dispatcher │────────▶│ HookRegistry │
//! │ Connection │────────▶│   (FIFO)   │         │ (runtime)  │         └──────────────┘
//! └────────────┘         └────────────┘         └─────┬──────┘
//!                                                     │ spawn
//!                                              ┌──────▼──────┐
//!                                              │  Handler ×N │
//!                                              └─────────────┘
//! ```
//!
//! - [`Event`]: immutable value for one parsed inbound line
//! - [`EventQueue`] / [`EventSink`]: the single serialization point, with an
//!   in-band [`QueueItem::Shutdown`] sentinel
//! - [`Connection`] / [`ConnectionFactory`]: what the engine needs from the
//!   transport layer
//! - [`Handler`] / [`HandlerDescriptor`] / [`HookRegistry`]: what the engine
//!   needs from the plugin layer

pub mod connection;
pub mod error;
pub mod event;
pub mod hook;
pub mod queue;
pub mod registry;

pub use connection::{
    BoxedConnection, Connection, ConnectionFactory, ConnectionRecord, DEFAULT_PORT, clean_name,
};
pub use error::{
    ConnectError, ConnectResult, HandlerError, HandlerResult, RegistryError, RegistryResult,
    ResolutionError,
};
pub use event::{Event, EventBuilder, Source};
pub use hook::{BoxedHandler, Handler, HandlerDescriptor, HandlerFn, SingleThread, handler_fn};
pub use queue::{EventQueue, EventSink, QueueItem};
pub use registry::{BoxedRegistry, HookRegistry};
