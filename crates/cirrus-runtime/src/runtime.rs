//! Lifecycle orchestration.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cirrus_runtime::{CirrusRuntime, Shutdown};
//!
//! let runtime = CirrusRuntime::builder()
//!     .config_file("cirrus.toml")
//!     .registry(Arc::new(registry))
//!     .connection_factory(IrcConnectionFactory::new())
//!     .build()?;
//!
//! loop {
//!     match runtime.run_blocking()? {
//!         Shutdown::Stopped => break,
//!         Shutdown::Restart => { /* re-exec */ }
//!     }
//! }
//! ```
//!
//! `run` loads plugins, connects every connection and then dispatches events
//! until `stop` or `restart` is called (or a signal arrives, when signal
//! handling is enabled).

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use cirrus_core::{BoxedConnection, BoxedRegistry, ConnectionFactory, EventQueue, EventSink};
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{CirrusConfig, ConfigLoader};
use crate::connections::{build_connections, connect_all};
use crate::dispatcher::Dispatcher;
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;
use crate::state::EngineState;

/// How a completed `run` ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// `stop` was called.
    Stopped,
    /// `restart` was called; the embedding process should start over.
    Restart,
}

/// The Cirrus engine: connections, event queue, hook registry and dispatcher.
///
/// Cheap to clone; clones control the same engine, so a handler or signal
/// task can hold one and call [`stop`](Self::stop).
#[derive(Clone)]
pub struct CirrusRuntime {
    config: Arc<CirrusConfig>,
    state: Arc<EngineState>,
}

impl CirrusRuntime {
    /// Creates a runtime builder.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration.
    ///
    /// Initializes logging from `config.logging` (a no-op if a subscriber is
    /// already installed) and builds every configured connection.
    pub fn from_config(
        config: CirrusConfig,
        registry: BoxedRegistry,
        factory: &dyn ConnectionFactory,
    ) -> RuntimeResult<Self> {
        logging::init_from_config(&config.logging);

        let queue = EventQueue::new();
        let connections = build_connections(&config.connections, factory, &queue.sink())?;

        info!(
            log_level = %config.logging.level,
            connections = connections.len(),
            plugins = %config.plugins.path.display(),
            "Runtime initialized from configuration"
        );

        Ok(Self {
            config: Arc::new(config),
            state: Arc::new(EngineState::new(queue, registry, connections)),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CirrusConfig {
        &self.config
    }

    /// `false` once `stop` has been called.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Time since the runtime was created.
    pub fn uptime(&self) -> Duration {
        self.state.start_time.elapsed()
    }

    /// All connections, in configuration order.
    pub fn connections(&self) -> &[BoxedConnection] {
        &self.state.connections
    }

    /// Looks up a connection by canonical name.
    pub fn connection(&self, name: &str) -> Option<&BoxedConnection> {
        self.state.connections.iter().find(|c| c.name() == name)
    }

    /// A push handle onto the event queue.
    pub fn event_sink(&self) -> EventSink {
        self.state.queue.sink()
    }

    /// Approximate number of events waiting to be dispatched.
    pub fn queue_len(&self) -> usize {
        self.state.queue.len()
    }

    /// The hook registry.
    pub fn registry(&self) -> &BoxedRegistry {
        &self.state.registry
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Runs the engine until it is stopped.
    ///
    /// Can only be called once per runtime; a second call fails with
    /// [`RuntimeError::AlreadyStarted`].
    pub async fn run(&self) -> RuntimeResult<Shutdown> {
        if self.state.started.swap(true, Ordering::SeqCst) {
            return Err(RuntimeError::AlreadyStarted);
        }

        let signals = self
            .config
            .engine
            .handle_signals
            .then(|| self.spawn_signal_handler());

        let result = self.run_inner().await;

        if let Some(handle) = signals {
            handle.abort();
        }
        result
    }

    /// Builds a current-thread tokio runtime and blocks on [`run`](Self::run).
    pub fn run_blocking(&self) -> RuntimeResult<Shutdown> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        rt.block_on(self.run())
    }

    async fn run_inner(&self) -> RuntimeResult<Shutdown> {
        let root = &self.config.plugins.path;
        info!(root = %root.display(), "Loading plugins");
        self.load_plugins(root).await?;

        if !self.is_running() {
            info!("Stopped while loading plugins, not connecting");
            return Ok(self.shutdown_kind());
        }

        if self.config.plugins.reload
            && let Err(e) = self.state.registry.start_reloader()
        {
            warn!(error = %e, "Plugin reloading disabled");
        }

        connect_all(&self.state.connections).await;

        if self.is_running() {
            info!("Cirrus is now running");
        } else {
            info!("Stopped while connecting");
        }
        Dispatcher::new(Arc::clone(&self.state)).run().await;

        // Connections that came up after stop() went through them.
        self.disconnect_all();

        self.state.registry.stop_reloader();
        self.drain().await;

        let shutdown = self.shutdown_kind();
        info!(?shutdown, uptime = ?self.uptime(), "Runtime stopped");
        Ok(shutdown)
    }

    async fn load_plugins(&self, root: &Path) -> RuntimeResult<()> {
        self.state.registry.load_all(root).await.map_err(|e| {
            error!(root = %root.display(), error = %e, "Failed to load plugins");
            RuntimeError::from(e)
        })
    }

    /// Waits for in-flight handlers when a drain timeout is configured.
    async fn drain(&self) {
        let tasks = &self.state.tasks;
        tasks.close();

        let Some(timeout) = self.config.engine.drain_timeout() else {
            if !tasks.is_empty() {
                debug!(pending = tasks.len(), "Not waiting for in-flight handlers");
            }
            return;
        };

        if tokio::time::timeout(timeout, tasks.wait()).await.is_err() {
            warn!(
                pending = tasks.len(),
                timeout_ms = timeout.as_millis() as u64,
                "Handlers still running after drain timeout, abandoning them"
            );
        }
    }

    fn shutdown_kind(&self) -> Shutdown {
        if self.state.restart_requested.load(Ordering::SeqCst) {
            Shutdown::Restart
        } else {
            Shutdown::Stopped
        }
    }

    /// Stops the engine.
    ///
    /// Stops plugin reloading, sends `QUIT` (with `reason` when given) to and
    /// closes every connected connection, then wakes the dispatcher so `run`
    /// returns. A connection still inside `connect` gets the same `QUIT` once
    /// it comes up, before `run` returns. In-flight handlers are not
    /// cancelled. Only the first call has any effect.
    pub fn stop(&self, reason: Option<&str>) {
        if self.state.stop_requested.swap(true, Ordering::SeqCst) {
            debug!("Stop already requested");
            return;
        }

        info!(reason = reason.unwrap_or(""), "Stopping");
        self.state.registry.stop_reloader();

        self.state.disconnect.lock().reason = reason.map(str::to_string);
        self.disconnect_all();

        self.state.running.store(false, Ordering::SeqCst);
        self.state.queue.shutdown();
    }

    /// Sends `QUIT` with the stop reason to, and closes, every live
    /// connection that has not been sent one yet.
    fn disconnect_all(&self) {
        let mut disconnect = self.state.disconnect.lock();
        let params: Vec<String> = disconnect.reason.iter().cloned().collect();
        for (conn, quit_sent) in self
            .state
            .connections
            .iter()
            .zip(disconnect.quit_sent.iter_mut())
        {
            if !*quit_sent && conn.is_connected() {
                debug!(connection = %conn.name(), "Disconnecting");
                conn.send_command("QUIT", &params);
                conn.close();
                *quit_sent = true;
            }
        }
    }

    /// Stops the engine and makes `run` return [`Shutdown::Restart`].
    pub fn restart(&self, reason: Option<&str>) {
        self.state.restart_requested.store(true, Ordering::SeqCst);
        self.stop(reason);
    }

    /// Spawns a task that stops the engine on SIGINT or SIGTERM.
    pub fn spawn_signal_handler(&self) -> JoinHandle<()> {
        let runtime = self.clone();
        tokio::spawn(async move {
            if wait_for_signal().await {
                runtime.stop(Some("Received signal"));
            }
        })
    }
}

/// Waits for Ctrl+C or SIGTERM. Returns `false` if no handler could be
/// installed.
async fn wait_for_signal() -> bool {
    #[cfg(unix)]
    {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                return signal::ctrl_c().await.is_ok();
            }
        };

        tokio::select! {
            res = signal::ctrl_c() => {
                if let Err(e) = res {
                    warn!(error = %e, "Failed to listen for Ctrl+C");
                    sigterm.recv().await;
                }
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
        true
    }

    #[cfg(not(unix))]
    {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, shutting down");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                false
            }
        }
    }
}

impl std::fmt::Debug for CirrusRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CirrusRuntime")
            .field("running", &self.is_running())
            .field("connections", &self.state.connections.len())
            .field("queued", &self.queue_len())
            .finish()
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder that loads configuration and assembles a [`CirrusRuntime`].
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
    config: Option<CirrusConfig>,
    registry: Option<BoxedRegistry>,
    factory: Option<Box<dyn ConnectionFactory>>,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
            config: None,
            registry: None,
            factory: None,
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g. "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Uses `config` as-is, skipping file and environment loading.
    pub fn config(mut self, config: CirrusConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the hook registry.
    pub fn registry(mut self, registry: BoxedRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the factory used to build configured connections.
    pub fn connection_factory(mut self, factory: impl ConnectionFactory + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> RuntimeResult<CirrusRuntime> {
        let registry = self
            .registry
            .ok_or(RuntimeError::MissingComponent("hook registry"))?;
        let factory = self
            .factory
            .ok_or(RuntimeError::MissingComponent("connection factory"))?;

        let config = match self.config {
            Some(config) => {
                crate::config::validate_config(&config)?;
                config
            }
            None => self.config_loader.load()?,
        };

        CirrusRuntime::from_config(config, registry, factory.as_ref())
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    use cirrus_core::{Connection, Event, HandlerError, handler_fn};
    use cirrus_plugin::{Hook, Plugin, PluginRegistry, StaticPluginSource};

    use crate::config::{ConfigError, ConnectionConfig};
    use tokio::sync::Notify;

    use crate::testing::{GatedRegistry, MockFactory, wait_until};

    fn connection(name: &str) -> ConnectionConfig {
        ConnectionConfig {
            name: name.to_string(),
            nick: "cirrus".to_string(),
            server: "irc.example.net".to_string(),
            port: 6667,
            ssl: false,
            channels: vec!["#cirrus".to_string()],
            settings: Default::default(),
        }
    }

    fn test_config(names: &[&str]) -> CirrusConfig {
        let mut config = CirrusConfig {
            connections: names.iter().map(|n| connection(n)).collect(),
            ..Default::default()
        };
        config.engine.handle_signals = false;
        config.plugins.reload = false;
        config
    }

    fn counting_plugin(counter: &Arc<AtomicUsize>) -> Plugin {
        let c = Arc::clone(counter);
        Plugin::new("counter").hook(Hook::on_command(
            "count",
            "PRIVMSG",
            handler_fn(move |_| {
                c.fetch_add(1, Ordering::SeqCst);
                async { Ok(()) }
            }),
        ))
    }

    fn runtime_with(plugin: Plugin, config: CirrusConfig) -> (CirrusRuntime, MockFactory) {
        let factory = MockFactory::default();
        let source = StaticPluginSource::new().with_plugin(plugin);
        let runtime = CirrusRuntime::builder()
            .config(config)
            .registry(Arc::new(PluginRegistry::new(source)))
            .connection_factory(factory.clone())
            .build()
            .unwrap();
        (runtime, factory)
    }

    /// Spawns `run` and waits until every connection is up.
    async fn start(runtime: &CirrusRuntime) -> JoinHandle<RuntimeResult<Shutdown>> {
        let handle = tokio::spawn({
            let runtime = runtime.clone();
            async move { runtime.run().await }
        });
        let rt = runtime.clone();
        wait_until(move || rt.connections().iter().all(|c| c.is_connected())).await;
        // Let the dispatcher reach its first dequeue.
        tokio::task::yield_now().await;
        handle
    }

    #[tokio::test]
    async fn test_events_reach_handlers() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (runtime, factory) = runtime_with(counting_plugin(&counter), test_config(&["net"]));
        let handle = start(&runtime).await;

        let conn = factory.get("net");
        for _ in 0..3 {
            conn.receive("PRIVMSG", &["#cirrus", "hi"]);
        }
        conn.receive("JOIN", &["#cirrus"]);

        wait_until(|| counter.load(Ordering::SeqCst) == 3).await;
        runtime.stop(None);

        assert_eq!(handle.await.unwrap().unwrap(), Shutdown::Stopped);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_processing_after_stop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (runtime, factory) = runtime_with(counting_plugin(&counter), test_config(&["net"]));
        let handle = start(&runtime).await;

        // Queued but not yet dequeued when stop() runs.
        let conn = factory.get("net");
        conn.receive("PRIVMSG", &["#cirrus", "one"]);
        conn.receive("PRIVMSG", &["#cirrus", "two"]);
        runtime.stop(Some("bye"));
        conn.receive("PRIVMSG", &["#cirrus", "three"]);

        assert_eq!(handle.await.unwrap().unwrap(), Shutdown::Stopped);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_drain_waits_for_in_flight_handlers() {
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let (s, f) = (Arc::clone(&started), Arc::clone(&finished));
        let plugin = Plugin::new("slow").hook(Hook::on_any(
            "sleep",
            handler_fn(move |_| {
                let (s, f) = (Arc::clone(&s), Arc::clone(&f));
                async move {
                    s.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    f.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            }),
        ));

        let mut config = test_config(&["net"]);
        config.engine.drain_timeout_ms = Some(2_000);
        let (runtime, factory) = runtime_with(plugin, config);
        let handle = start(&runtime).await;

        let conn = factory.get("net");
        for _ in 0..5 {
            conn.receive("PRIVMSG", &["#cirrus", "hi"]);
        }
        wait_until(|| started.load(Ordering::SeqCst) == 5).await;
        runtime.stop(None);

        assert_eq!(handle.await.unwrap().unwrap(), Shutdown::Stopped);
        assert_eq!(finished.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_handler_failures_are_isolated() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let plugin = Plugin::new("mixed")
            .hook(Hook::on_any(
                "fails",
                handler_fn(|_| async { Err::<(), HandlerError>("handler error".into()) }),
            ))
            .hook(Hook::on_any(
                "panics",
                handler_fn(|event: Arc<Event>| async move {
                    if event.command() == "PRIVMSG" {
                        panic!("cannot handle {}", event.last_param());
                    }
                    Ok(())
                }),
            ))
            .hook(Hook::on_any(
                "counts",
                handler_fn(move |_| {
                    c.fetch_add(1, Ordering::SeqCst);
                    async { Ok(()) }
                }),
            ));

        let (runtime, factory) = runtime_with(plugin, test_config(&["net"]));
        let handle = start(&runtime).await;

        let conn = factory.get("net");
        conn.receive("PRIVMSG", &["#cirrus", "one"]);
        conn.receive("PRIVMSG", &["#cirrus", "two"]);

        wait_until(|| counter.load(Ordering::SeqCst) == 2).await;
        assert!(runtime.is_running());
        runtime.stop(None);
        assert_eq!(handle.await.unwrap().unwrap(), Shutdown::Stopped);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (runtime, factory) =
            runtime_with(counting_plugin(&counter), test_config(&["net", "other"]));
        let handle = start(&runtime).await;

        runtime.stop(Some("bye"));
        runtime.stop(Some("again"));
        runtime.restart(None);

        // restart after stop only flips the flag
        assert_eq!(handle.await.unwrap().unwrap(), Shutdown::Restart);

        for name in ["net", "other"] {
            let conn = factory.get(name);
            assert_eq!(
                conn.sent_commands(),
                vec![("QUIT".to_string(), vec!["bye".to_string()])]
            );
            assert_eq!(conn.close_calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_stop_without_reason_skips_disconnected() {
        let factory = MockFactory::failing();
        let runtime = CirrusRuntime::builder()
            .config(test_config(&["down"]))
            .registry(Arc::new(PluginRegistry::new(StaticPluginSource::new())))
            .connection_factory(factory.clone())
            .build()
            .unwrap();

        let handle = tokio::spawn({
            let runtime = runtime.clone();
            async move { runtime.run().await }
        });
        let conn = factory.get("down");
        wait_until(|| conn.connect_calls.load(Ordering::SeqCst) == 1).await;
        tokio::task::yield_now().await;

        runtime.stop(None);
        assert_eq!(handle.await.unwrap().unwrap(), Shutdown::Stopped);
        assert!(conn.sent_commands().is_empty());
        assert_eq!(conn.close_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_restart() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (runtime, factory) = runtime_with(counting_plugin(&counter), test_config(&["net"]));
        let handle = start(&runtime).await;

        runtime.restart(Some("Restarting"));

        assert_eq!(handle.await.unwrap().unwrap(), Shutdown::Restart);
        assert_eq!(
            factory.get("net").sent_commands(),
            vec![("QUIT".to_string(), vec!["Restarting".to_string()])]
        );
    }

    #[tokio::test]
    async fn test_stop_during_plugin_load_skips_connect() {
        let factory = MockFactory::default();
        let registry = GatedRegistry::new(PluginRegistry::new(StaticPluginSource::new()));
        let runtime = CirrusRuntime::builder()
            .config(test_config(&["net"]))
            .registry(registry.clone())
            .connection_factory(factory.clone())
            .build()
            .unwrap();

        let handle = tokio::spawn({
            let runtime = runtime.clone();
            async move { runtime.run().await }
        });

        registry.loading.notified().await;
        runtime.stop(Some("early"));
        registry.release.notify_one();

        assert_eq!(handle.await.unwrap().unwrap(), Shutdown::Stopped);
        let conn = factory.get("net");
        assert_eq!(conn.connect_calls.load(Ordering::SeqCst), 0);
        assert!(conn.sent_commands().is_empty());
    }

    #[tokio::test]
    async fn test_stop_during_connect_closes_late_connections() {
        let gate = Arc::new(Notify::new());
        let factory = MockFactory::gated(Arc::clone(&gate));
        let runtime = CirrusRuntime::builder()
            .config(test_config(&["net"]))
            .registry(Arc::new(PluginRegistry::new(StaticPluginSource::new())))
            .connection_factory(factory.clone())
            .build()
            .unwrap();

        let handle = tokio::spawn({
            let runtime = runtime.clone();
            async move { runtime.run().await }
        });
        let conn = factory.get("net");
        wait_until(|| conn.connect_calls.load(Ordering::SeqCst) == 1).await;

        // Not connected yet, so stop() has nothing to send.
        runtime.stop(Some("bye"));
        assert!(conn.sent_commands().is_empty());
        gate.notify_one();

        assert_eq!(handle.await.unwrap().unwrap(), Shutdown::Stopped);
        assert!(!conn.is_connected());
        assert_eq!(conn.close_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            conn.sent_commands(),
            vec![("QUIT".to_string(), vec!["bye".to_string()])]
        );
    }

    #[tokio::test]
    async fn test_run_twice_fails() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (runtime, _factory) = runtime_with(counting_plugin(&counter), test_config(&[]));

        runtime.stop(None);
        assert_eq!(runtime.run().await.unwrap(), Shutdown::Stopped);
        assert!(matches!(
            runtime.run().await,
            Err(RuntimeError::AlreadyStarted)
        ));
    }

    #[test]
    fn test_duplicate_connection_names_rejected() {
        let result = CirrusRuntime::builder()
            .config(test_config(&["My Network", "My Network!"]))
            .registry(Arc::new(PluginRegistry::new(StaticPluginSource::new())))
            .connection_factory(MockFactory::default())
            .build();

        assert!(matches!(
            result,
            Err(RuntimeError::Config(ConfigError::DuplicateConnection(name))) if name == "My_Network"
        ));
    }

    #[test]
    fn test_connection_lookup_by_canonical_name() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (runtime, _factory) =
            runtime_with(counting_plugin(&counter), test_config(&["Libera Chat"]));

        let conn = runtime.connection("Libera_Chat").unwrap();
        assert_eq!(conn.readable_name(), "Libera Chat");
        assert!(runtime.connection("Libera Chat").is_none());
    }

    #[test]
    fn test_builder_requires_registry() {
        let result = CirrusRuntime::builder()
            .config(test_config(&[]))
            .connection_factory(MockFactory::default())
            .build();
        assert!(matches!(
            result,
            Err(RuntimeError::MissingComponent("hook registry"))
        ));
    }

    #[test]
    fn test_run_blocking() {
        let counter = Arc::new(AtomicUsize::new(0));
        let (runtime, _factory) = runtime_with(counting_plugin(&counter), test_config(&["net"]));

        let stopper = runtime.clone();
        std::thread::spawn(move || {
            while !stopper.connections()[0].is_connected() {
                std::thread::sleep(Duration::from_millis(1));
            }
            stopper.stop(None);
        });

        assert_eq!(runtime.run_blocking().unwrap(), Shutdown::Stopped);
    }
}
