//! The process-wide inbound event queue.
//!
//! All connections push into one [`EventQueue`]; the dispatcher is its only
//! consumer. The queue is unbounded, so [`enqueue`](EventQueue::enqueue)
//! never blocks, and strictly FIFO across producers.
//!
//! Shutdown is signalled in-band with [`QueueItem::Shutdown`] so that a
//! consumer suspended in [`dequeue`](EventQueue::dequeue) wakes up without
//! having to poll a flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Mutex, mpsc};
use tracing::trace;

use crate::event::Event;

/// One element of the event queue.
#[derive(Debug, Clone)]
pub enum QueueItem {
    /// An inbound event to dispatch.
    Event(Arc<Event>),
    /// Stop sentinel. The consumer must not dequeue past it.
    Shutdown,
}

/// Unbounded FIFO shared by all connections and drained by the dispatcher.
pub struct EventQueue {
    tx: mpsc::UnboundedSender<QueueItem>,
    rx: Mutex<mpsc::UnboundedReceiver<QueueItem>>,
    len: Arc<AtomicUsize>,
}

impl EventQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
            len: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns a push-only handle for a connection.
    pub fn sink(&self) -> EventSink {
        EventSink {
            tx: self.tx.clone(),
            len: Arc::clone(&self.len),
        }
    }

    /// Appends an event.
    pub fn enqueue(&self, event: Event) {
        push(&self.tx, &self.len, QueueItem::Event(Arc::new(event)));
    }

    /// Appends the stop sentinel.
    pub fn shutdown(&self) {
        push(&self.tx, &self.len, QueueItem::Shutdown);
    }

    /// Waits for the next item.
    ///
    /// The queue keeps its own sender alive, so the channel never closes
    /// while `self` exists; a closed channel is still reported as
    /// [`QueueItem::Shutdown`].
    pub async fn dequeue(&self) -> QueueItem {
        let item = self.rx.lock().await.recv().await;
        match item {
            Some(item) => {
                self.len.fetch_sub(1, Ordering::AcqRel);
                item
            }
            None => QueueItem::Shutdown,
        }
    }

    /// Approximate number of queued items.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    /// Returns `true` when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("len", &self.len())
            .finish()
    }
}

/// Push-only handle to the [`EventQueue`], given to each connection.
#[derive(Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<QueueItem>,
    len: Arc<AtomicUsize>,
}

impl EventSink {
    /// Appends an event to the shared queue.
    pub fn enqueue(&self, event: Event) {
        push(&self.tx, &self.len, QueueItem::Event(Arc::new(event)));
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink").finish_non_exhaustive()
    }
}

fn push(tx: &mpsc::UnboundedSender<QueueItem>, len: &AtomicUsize, item: QueueItem) {
    len.fetch_add(1, Ordering::AcqRel);
    if tx.send(item).is_err() {
        // Receiver is gone: the queue itself was dropped.
        len.fetch_sub(1, Ordering::AcqRel);
        trace!("Event queue closed, dropping item");
    }
}
