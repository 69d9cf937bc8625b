//! Connection contract and per-endpoint records.
//!
//! The engine never touches sockets. A [`Connection`] owns its transport,
//! framing and reconnect policy; the engine only connects it, asks whether it
//! is alive, sends it commands and closes it. Inbound lines are pushed onto
//! the shared queue through the [`EventSink`] the connection was created with.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ConnectResult;
use crate::queue::EventSink;

/// Default port for plain-text chat connections.
pub const DEFAULT_PORT: u16 = 6667;

/// A persistent text-protocol connection to one endpoint.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Canonical, unique connection name.
    fn name(&self) -> &str;

    /// Name as written in the configuration.
    fn readable_name(&self) -> &str {
        self.name()
    }

    /// Establishes the session.
    ///
    /// Called once at startup. Once connected, the connection pushes every
    /// parsed inbound line onto its [`EventSink`].
    async fn connect(&self) -> ConnectResult<()>;

    /// Whether the session is currently established.
    fn is_connected(&self) -> bool;

    /// Queues an outbound command. Must not block.
    fn send_command(&self, command: &str, params: &[String]);

    /// Releases the transport. Must not block.
    fn close(&self);
}

/// Shared connection handle.
pub type BoxedConnection = Arc<dyn Connection>;

/// Builds connections for configured endpoints.
pub trait ConnectionFactory: Send + Sync {
    /// Creates the connection described by `record`, wired to `sink`.
    fn create(&self, record: ConnectionRecord, sink: EventSink) -> BoxedConnection;
}

impl<F> ConnectionFactory for F
where
    F: Fn(ConnectionRecord, EventSink) -> BoxedConnection + Send + Sync,
{
    fn create(&self, record: ConnectionRecord, sink: EventSink) -> BoxedConnection {
        self(record, sink)
    }
}

/// Everything a connection needs to know about its endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// Canonical name, see [`clean_name`].
    pub name: String,
    /// Name as written in the configuration.
    pub readable_name: String,
    /// Server address.
    pub server: String,
    /// Server port.
    pub port: u16,
    /// Desired nickname.
    pub nick: String,
    /// Channels to join after connecting.
    pub channels: Vec<String>,
    /// Whether to wrap the socket in TLS.
    pub use_tls: bool,
    /// Connection-specific settings passed through untouched.
    #[serde(default)]
    pub settings: HashMap<String, serde_json::Value>,
}

impl ConnectionRecord {
    /// Creates a record; the canonical name is derived from `readable_name`.
    pub fn new(
        readable_name: impl Into<String>,
        server: impl Into<String>,
        nick: impl Into<String>,
    ) -> Self {
        let readable_name = readable_name.into();
        Self {
            name: clean_name(&readable_name),
            readable_name,
            server: server.into(),
            port: DEFAULT_PORT,
            nick: nick.into(),
            channels: Vec::new(),
            use_tls: false,
            settings: HashMap::new(),
        }
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the channel list.
    pub fn with_channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = channels.into_iter().map(Into::into).collect();
        self
    }

    /// Enables or disables TLS.
    pub fn with_tls(mut self, use_tls: bool) -> Self {
        self.use_tls = use_tls;
        self
    }
}

/// Canonicalizes a configured connection name.
///
/// Leading and trailing whitespace is stripped, every inner whitespace run
/// becomes a single `_`, and anything outside `[A-Za-z0-9_]` is dropped.
///
/// ```
/// assert_eq!(cirrus_core::clean_name("My Network!"), "My_Network");
/// ```
pub fn clean_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}
