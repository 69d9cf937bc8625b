//! Mock connections and registries shared by the runtime tests.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use cirrus_core::{
    BoxedConnection, ConnectError, ConnectResult, Connection, ConnectionRecord, Event,
    EventSink, HandlerDescriptor, HookRegistry, RegistryResult, ResolutionError,
};
use cirrus_plugin::PluginRegistry;
use parking_lot::Mutex;
use tokio::sync::Notify;

pub(crate) fn event(connection: &str, command: &str) -> Event {
    Event::builder(connection)
        .raw(format!("{command} #cirrus :hello"))
        .command(command)
        .params(["#cirrus", "hello"])
        .build()
}

/// Polls `cond` until it holds, panicking after two seconds.
pub(crate) async fn wait_until(cond: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

pub(crate) struct MockConnection {
    record: ConnectionRecord,
    sink: EventSink,
    this: Weak<MockConnection>,
    fail_connect: bool,
    connect_gate: Option<Arc<Notify>>,
    connected: AtomicBool,
    pub(crate) connect_calls: AtomicUsize,
    pub(crate) close_calls: AtomicUsize,
    pub(crate) sent: Mutex<Vec<(String, Vec<String>)>>,
}

impl MockConnection {
    pub(crate) fn new(
        record: ConnectionRecord,
        sink: EventSink,
        fail_connect: bool,
        connect_gate: Option<Arc<Notify>>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            record,
            sink,
            this: this.clone(),
            fail_connect,
            connect_gate,
            connected: AtomicBool::new(false),
            connect_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Pushes an inbound line as if it had been read from the socket.
    pub(crate) fn receive(&self, command: &str, params: &[&str]) {
        let origin: Weak<dyn Connection> = self.this.clone();
        let raw = format!("{command} {}", params.join(" "));
        self.sink.enqueue(
            Event::builder(self.record.name.as_str())
                .origin(origin)
                .raw(raw)
                .command(command)
                .params(params.iter().copied())
                .build(),
        );
    }

    pub(crate) fn sent_commands(&self) -> Vec<(String, Vec<String>)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn name(&self) -> &str {
        &self.record.name
    }

    fn readable_name(&self) -> &str {
        &self.record.readable_name
    }

    async fn connect(&self) -> ConnectResult<()> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.connect_gate {
            gate.notified().await;
        }
        if self.fail_connect {
            return Err(ConnectError::Failed {
                server: self.record.server.clone(),
                port: self.record.port,
                reason: "connection refused".to_string(),
            });
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn send_command(&self, command: &str, params: &[String]) {
        self.sent.lock().push((command.to_string(), params.to_vec()));
    }

    fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
    }
}

/// Connection factory that keeps a handle on every connection it builds.
#[derive(Clone, Default)]
pub(crate) struct MockFactory {
    pub(crate) built: Arc<Mutex<Vec<Arc<MockConnection>>>>,
    pub(crate) fail_connect: bool,
    pub(crate) connect_gate: Option<Arc<Notify>>,
}

impl MockFactory {
    pub(crate) fn failing() -> Self {
        Self {
            fail_connect: true,
            ..Default::default()
        }
    }

    /// Connections built by this factory finish `connect` only once `gate`
    /// is notified.
    pub(crate) fn gated(gate: Arc<Notify>) -> Self {
        Self {
            connect_gate: Some(gate),
            ..Default::default()
        }
    }

    pub(crate) fn get(&self, name: &str) -> Arc<MockConnection> {
        self.built
            .lock()
            .iter()
            .find(|c| c.name() == name)
            .cloned()
            .expect("connection was built")
    }
}

impl cirrus_core::ConnectionFactory for MockFactory {
    fn create(&self, record: ConnectionRecord, sink: EventSink) -> BoxedConnection {
        let conn = MockConnection::new(
            record,
            sink,
            self.fail_connect,
            self.connect_gate.clone(),
        );
        self.built.lock().push(Arc::clone(&conn));
        conn
    }
}

/// Registry whose `resolve` always fails.
pub(crate) struct FailingRegistry;

#[async_trait]
impl HookRegistry for FailingRegistry {
    async fn load_all(&self, _root: &Path) -> RegistryResult<()> {
        Ok(())
    }

    fn resolve(&self, _event: &Event) -> Result<Vec<Arc<HandlerDescriptor>>, ResolutionError> {
        Err(ResolutionError::Unavailable("registry offline".to_string()))
    }

    fn start_reloader(&self) -> RegistryResult<()> {
        Ok(())
    }

    fn stop_reloader(&self) {}
}

/// Wraps a [`PluginRegistry`], holding `load_all` until released.
pub(crate) struct GatedRegistry {
    pub(crate) inner: PluginRegistry,
    pub(crate) loading: Notify,
    pub(crate) release: Notify,
}

impl GatedRegistry {
    pub(crate) fn new(inner: PluginRegistry) -> Arc<Self> {
        Arc::new(Self {
            inner,
            loading: Notify::new(),
            release: Notify::new(),
        })
    }
}

#[async_trait]
impl HookRegistry for GatedRegistry {
    async fn load_all(&self, root: &Path) -> RegistryResult<()> {
        self.loading.notify_one();
        self.release.notified().await;
        self.inner.load_all(root).await
    }

    fn resolve(&self, event: &Event) -> Result<Vec<Arc<HandlerDescriptor>>, ResolutionError> {
        self.inner.resolve(event)
    }

    fn start_reloader(&self) -> RegistryResult<()> {
        self.inner.start_reloader()
    }

    fn stop_reloader(&self) {
        self.inner.stop_reloader()
    }
}
