//! The dispatch loop.
//!
//! One dispatcher drains the event queue. For every event it asks the
//! registry for the current handler set and spawns each handler as an
//! independent task; it never waits for a handler to finish.
//!
//! ```text
//!            dequeue                 resolve               spawn
//! EventQueue ───────▶ Dispatcher ───────────▶ HookRegistry ──────▶ task ×N
//!                        │                                        │
//!                        │ Shutdown / running=false               │ error boundary
//!                        ▼                                        ▼
//!                     Stopped                          log plugin/hook/connection
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use cirrus_core::{Event, HandlerDescriptor, QueueItem, SingleThread};
use futures::FutureExt;
use tokio::sync::{OwnedSemaphorePermit, oneshot};
use tracing::{debug, error, trace, warn};

use crate::state::{EngineState, TaskKey};

/// Pulls events off the queue and fans them out to handlers.
pub(crate) struct Dispatcher {
    state: Arc<EngineState>,
}

impl Dispatcher {
    pub(crate) fn new(state: Arc<EngineState>) -> Self {
        Self { state }
    }

    /// Runs until the shutdown sentinel is dequeued or the engine stops
    /// running. Events dequeued after `stop` are discarded.
    pub(crate) async fn run(&self) {
        debug!("Dispatcher started");
        loop {
            let event = match self.state.queue.dequeue().await {
                QueueItem::Shutdown => {
                    debug!("Shutdown sentinel received");
                    break;
                }
                QueueItem::Event(event) => event,
            };

            if !self.state.is_running() {
                debug!(
                    connection = %event.connection_name(),
                    pending = self.state.queue.len(),
                    "Engine stopped, discarding remaining events"
                );
                break;
            }

            self.dispatch(event);
        }
        debug!("Dispatcher stopped");
    }

    fn dispatch(&self, event: Arc<Event>) {
        let handlers = match self.state.registry.resolve(&event) {
            Ok(handlers) => handlers,
            Err(e) => {
                warn!(
                    connection = %event.connection_name(),
                    command = %event.command(),
                    error = %e,
                    "Failed to resolve handlers, skipping event"
                );
                return;
            }
        };

        trace!(
            connection = %event.connection_name(),
            command = %event.command(),
            handlers = handlers.len(),
            "Dispatching event"
        );

        for desc in handlers {
            self.spawn_handler(desc, Arc::clone(&event));
        }
    }

    fn spawn_handler(&self, desc: Arc<HandlerDescriptor>, event: Arc<Event>) {
        let tasks = &self.state.tasks;

        let Some(policy) = desc.singlethread() else {
            tasks.spawn(run_guarded(desc, event));
            return;
        };

        let key: TaskKey = (Arc::from(event.connection_name()), Arc::from(desc.id()));
        match policy {
            SingleThread::Drop => match self.state.singlethread.try_claim(key.clone()) {
                Some(permit) => {
                    let state = Arc::clone(&self.state);
                    tasks.spawn(async move {
                        run_exclusive(desc, event, permit).await;
                        state.singlethread.release(&key);
                    });
                }
                None => {
                    debug!(
                        plugin = %desc.plugin(),
                        hook = %desc.hook(),
                        connection = %event.connection_name(),
                        "Singlethread hook still running, dropping invocation"
                    );
                }
            },
            SingleThread::Queue => {
                let (previous, done) = self.state.singlethread.enqueue(key.clone());
                let state = Arc::clone(&self.state);
                tasks.spawn(async move {
                    run_queued(desc, event, previous, done).await;
                    state.singlethread.release(&key);
                });
            }
        }
    }
}

async fn run_exclusive(
    desc: Arc<HandlerDescriptor>,
    event: Arc<Event>,
    _permit: OwnedSemaphorePermit,
) {
    run_guarded(desc, event).await;
}

async fn run_queued(
    desc: Arc<HandlerDescriptor>,
    event: Arc<Event>,
    previous: Option<oneshot::Receiver<()>>,
    _done: oneshot::Sender<()>,
) {
    if let Some(previous) = previous {
        // The sender is only ever dropped, so this resolves with Err.
        let _ = previous.await;
    }
    run_guarded(desc, event).await;
}

/// Runs one handler, logging any error or panic it produces.
pub(crate) async fn run_guarded(desc: Arc<HandlerDescriptor>, event: Arc<Event>) {
    let call = desc.handler().call(Arc::clone(&event));
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!(
                plugin = %desc.plugin(),
                hook = %desc.hook(),
                connection = %event.connection_name(),
                raw = %event.raw(),
                error = %e,
                "Handler failed"
            );
        }
        Err(panic) => {
            error!(
                plugin = %desc.plugin(),
                hook = %desc.hook(),
                connection = %event.connection_name(),
                raw = %event.raw(),
                panic = %panic_message(panic.as_ref()),
                "Handler panicked"
            );
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s
    } else {
        "<non-string panic payload>"
    }
}
