//! State shared between the lifecycle controller and the dispatcher.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use cirrus_core::{BoxedConnection, BoxedRegistry, EventQueue};
use parking_lot::Mutex;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, oneshot};
use tokio_util::task::TaskTracker;

/// Identifies one singlethread slot: a hook on a connection.
pub(crate) type TaskKey = (Arc<str>, Arc<str>);

#[derive(Default)]
struct Slot {
    /// Held while a drop-policy invocation runs.
    busy: Option<Arc<Semaphore>>,
    /// Completion signal of the most recently queued invocation.
    tail: Option<oneshot::Receiver<()>>,
}

impl Slot {
    /// No permit is out and the last queued invocation has finished.
    fn is_idle(&mut self) -> bool {
        // Every outstanding permit holds a clone of the semaphore.
        let free = self
            .busy
            .as_ref()
            .is_none_or(|busy| Arc::strong_count(busy) == 1);
        let drained = self
            .tail
            .as_mut()
            .is_none_or(|tail| matches!(tail.try_recv(), Err(TryRecvError::Closed)));
        free && drained
    }
}

/// Outstanding singlethread invocations, per `(connection, hook)`.
#[derive(Default)]
pub(crate) struct SingleThreadTable {
    slots: Mutex<HashMap<TaskKey, Slot>>,
}

impl SingleThreadTable {
    /// Claims the slot if it is free. `None` means an invocation is still
    /// outstanding; the permit is released when dropped.
    pub(crate) fn try_claim(&self, key: TaskKey) -> Option<OwnedSemaphorePermit> {
        let mut slots = self.slots.lock();
        let busy = slots
            .entry(key)
            .or_default()
            .busy
            .get_or_insert_with(|| Arc::new(Semaphore::new(1)))
            .clone();
        busy.try_acquire_owned().ok()
    }

    /// Appends an invocation to the slot's queue.
    ///
    /// Returns the completion signal of the previous invocation (await it
    /// before running) and this invocation's own signal (drop it when done).
    pub(crate) fn enqueue(
        &self,
        key: TaskKey,
    ) -> (Option<oneshot::Receiver<()>>, oneshot::Sender<()>) {
        let (done_tx, done_rx) = oneshot::channel();
        let mut slots = self.slots.lock();
        let previous = slots.entry(key).or_default().tail.replace(done_rx);
        (previous, done_tx)
    }

    /// Forgets the slot for `key` once nothing is running or queued on it.
    ///
    /// Called after an invocation has dropped its permit or signal, so
    /// entries for hooks retired by a reload do not accumulate.
    pub(crate) fn release(&self, key: &TaskKey) {
        let mut slots = self.slots.lock();
        if slots.get_mut(key).is_some_and(Slot::is_idle) {
            slots.remove(key);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.lock().len()
    }
}

/// Stop reason, and which connections have already been sent `QUIT`.
pub(crate) struct Disconnect {
    pub(crate) reason: Option<String>,
    pub(crate) quit_sent: Vec<bool>,
}

/// Engine state, owned behind an `Arc` by the runtime and the dispatcher.
pub(crate) struct EngineState {
    pub(crate) running: AtomicBool,
    pub(crate) started: AtomicBool,
    pub(crate) stop_requested: AtomicBool,
    pub(crate) restart_requested: AtomicBool,
    pub(crate) start_time: Instant,
    pub(crate) queue: EventQueue,
    pub(crate) registry: BoxedRegistry,
    pub(crate) connections: Vec<BoxedConnection>,
    pub(crate) disconnect: Mutex<Disconnect>,
    pub(crate) singlethread: SingleThreadTable,
    pub(crate) tasks: TaskTracker,
}

impl EngineState {
    pub(crate) fn new(
        queue: EventQueue,
        registry: BoxedRegistry,
        connections: Vec<BoxedConnection>,
    ) -> Self {
        let disconnect = Disconnect {
            reason: None,
            quit_sent: vec![false; connections.len()],
        };
        Self {
            running: AtomicBool::new(true),
            started: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            restart_requested: AtomicBool::new(false),
            start_time: Instant::now(),
            queue,
            registry,
            connections,
            disconnect: Mutex::new(disconnect),
            singlethread: SingleThreadTable::default(),
            tasks: TaskTracker::new(),
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
