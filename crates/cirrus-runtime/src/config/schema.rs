//! Configuration schema definitions.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use cirrus_core::{ConnectionRecord, DEFAULT_PORT};
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CirrusConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Dispatch engine settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Plugin loading settings.
    #[serde(default)]
    pub plugins: PluginsConfig,

    /// Chat network connections.
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,
}

// =============================================================================
// Logging
// =============================================================================

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    #[cfg(feature = "json-log")]
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    /// Log file path, used when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Rotated log files to keep; files rotate daily.
    #[serde(default = "default_max_files")]
    pub max_files: u32,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread ids in log lines.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include file and line in log lines.
    #[serde(default)]
    pub file_location: bool,

    /// Per-module level overrides, e.g. `cirrus_plugin = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            max_files: default_max_files(),
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            filters: HashMap::new(),
        }
    }
}

fn default_max_files() -> u32 {
    5
}

// =============================================================================
// Engine & plugins
// =============================================================================

/// Dispatch engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on waiting for in-flight handlers after the dispatch loop
    /// exits. Unset means handlers are not awaited.
    #[serde(default)]
    pub drain_timeout_ms: Option<u64>,

    /// Install SIGINT / SIGTERM handlers that stop the engine.
    #[serde(default = "default_true")]
    pub handle_signals: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            drain_timeout_ms: None,
            handle_signals: true,
        }
    }
}

impl EngineConfig {
    pub fn drain_timeout(&self) -> Option<Duration> {
        self.drain_timeout_ms.map(Duration::from_millis)
    }
}

/// Plugin configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// Plugin root directory.
    #[serde(default = "default_plugin_path")]
    pub path: PathBuf,

    /// Watch the plugin root and reload changed plugins.
    #[serde(default = "default_true")]
    pub reload: bool,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            path: default_plugin_path(),
            reload: true,
        }
    }
}

fn default_plugin_path() -> PathBuf {
    PathBuf::from("plugins")
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Connections
// =============================================================================

/// One chat network connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Human-readable name; canonicalized for lookups.
    pub name: String,

    pub nick: String,

    pub server: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect over TLS.
    #[serde(default)]
    pub ssl: bool,

    /// Channels to join after registration.
    #[serde(default)]
    pub channels: Vec<String>,

    /// Connection-specific settings passed through to the transport.
    #[serde(default)]
    pub settings: HashMap<String, serde_json::Value>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl ConnectionConfig {
    /// Converts to the record handed to a connection factory.
    pub fn to_record(&self) -> ConnectionRecord {
        let mut record = ConnectionRecord::new(&self.name, &self.server, &self.nick)
            .with_port(self.port)
            .with_channels(self.channels.clone())
            .with_tls(self.ssl);
        record.settings = self.settings.clone();
        record
    }
}
