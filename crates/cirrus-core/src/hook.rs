//! Handler contracts consumed by the dispatcher.
//!
//! A registry resolves each event to a list of [`HandlerDescriptor`]s. The
//! dispatcher only needs the descriptor's identity (for logging and for the
//! singlethread table) and its [`Handler`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerResult;
use crate::event::Event;

/// A unit of plugin logic invoked with one event.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handles `event`. Errors are logged by the dispatcher and go no further.
    async fn call(&self, event: Arc<Event>) -> HandlerResult;
}

/// Shared handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// Handler backed by an async closure.
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Arc<Event>) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn call(&self, event: Arc<Event>) -> HandlerResult {
        (self.f)(event).await
    }
}

/// Wraps an async closure into a [`BoxedHandler`].
///
/// ```rust,ignore
/// let handler = handler_fn(|event: Arc<Event>| async move {
///     event.reply_command("PONG", &[event.last_param().to_string()]);
///     Ok(())
/// });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(Arc<Event>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(HandlerFn { f })
}

/// What happens when a singlethread hook fires while a previous invocation
/// for the same connection is still running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SingleThread {
    /// Drop the new invocation and log it.
    #[default]
    Drop,
    /// Run the new invocation once the previous one finishes.
    Queue,
}

/// A resolved handler, ready for dispatch.
#[derive(Clone)]
pub struct HandlerDescriptor {
    plugin: Arc<str>,
    hook: Arc<str>,
    id: Arc<str>,
    singlethread: Option<SingleThread>,
    handler: BoxedHandler,
}

impl HandlerDescriptor {
    /// Creates a descriptor. The id is `plugin:hook`.
    pub fn new(
        plugin: impl Into<Arc<str>>,
        hook: impl Into<Arc<str>>,
        singlethread: Option<SingleThread>,
        handler: BoxedHandler,
    ) -> Self {
        let plugin = plugin.into();
        let hook = hook.into();
        let id: Arc<str> = format!("{plugin}:{hook}").into();
        Self {
            plugin,
            hook,
            id,
            singlethread,
            handler,
        }
    }

    /// Name of the plugin that declared this hook.
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    /// Name of the hook within its plugin.
    pub fn hook(&self) -> &str {
        &self.hook
    }

    /// Unique identifier, `plugin:hook`.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Exclusive-execution policy, if the hook is singlethread.
    pub fn singlethread(&self) -> Option<SingleThread> {
        self.singlethread
    }

    /// The handler to invoke.
    pub fn handler(&self) -> &BoxedHandler {
        &self.handler
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("id", &self.id)
            .field("singlethread", &self.singlethread)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_handler_fn_invokes_closure() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let handler = handler_fn(move |_event| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let event = Arc::new(Event::builder("net").command("PING").build());
        handler.call(Arc::clone(&event)).await.unwrap();
        handler.call(event).await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_descriptor_id() {
        let desc = HandlerDescriptor::new(
            "admin",
            "quit",
            Some(SingleThread::Drop),
            handler_fn(|_| async { Ok(()) }),
        );
        assert_eq!(desc.id(), "admin:quit");
        assert_eq!(desc.singlethread(), Some(SingleThread::Drop));
    }
}
