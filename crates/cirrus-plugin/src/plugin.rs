//! Plugin and hook declarations.
//!
//! A [`Plugin`] is a named bundle of [`Hook`]s. Each hook binds a handler to a
//! [`Trigger`] and optionally marks it singlethread:
//!
//! ```rust,ignore
//! let plugin = Plugin::new("core_ctcp")
//!     .hook(Hook::on_command("ping", "PING", handler_fn(pong)))
//!     .hook(Hook::on_any("log", handler_fn(log_line)))
//!     .hook(Hook::on_command("seen", "PRIVMSG", handler_fn(seen)).singlethread(SingleThread::Queue));
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cirrus_core::{BoxedHandler, Event, SingleThread};

/// Which events a hook fires on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Events whose command token equals this one (stored upper-cased).
    Command(String),
    /// Every event.
    Any,
}

impl Trigger {
    /// Creates a command trigger; matching is case-insensitive.
    pub fn command(token: impl AsRef<str>) -> Self {
        Self::Command(token.as_ref().to_ascii_uppercase())
    }

    /// Returns `true` if `event` fires this trigger.
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Self::Command(token) => token == event.command(),
            Self::Any => true,
        }
    }
}

/// One handler bound to a trigger.
#[derive(Clone)]
pub struct Hook {
    name: Arc<str>,
    trigger: Trigger,
    singlethread: Option<SingleThread>,
    handler: BoxedHandler,
}

impl Hook {
    /// Creates a hook with an explicit trigger.
    pub fn new(name: impl Into<Arc<str>>, trigger: Trigger, handler: BoxedHandler) -> Self {
        Self {
            name: name.into(),
            trigger,
            singlethread: None,
            handler,
        }
    }

    /// Creates a hook that fires on one command token.
    pub fn on_command(
        name: impl Into<Arc<str>>,
        command: impl AsRef<str>,
        handler: BoxedHandler,
    ) -> Self {
        Self::new(name, Trigger::command(command), handler)
    }

    /// Creates a hook that fires on every event.
    pub fn on_any(name: impl Into<Arc<str>>, handler: BoxedHandler) -> Self {
        Self::new(name, Trigger::Any, handler)
    }

    /// Restricts the hook to one running instance per connection.
    pub fn singlethread(mut self, policy: SingleThread) -> Self {
        self.singlethread = Some(policy);
        self
    }

    /// Hook name, unique within its plugin.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The trigger.
    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub(crate) fn singlethread_policy(&self) -> Option<SingleThread> {
        self.singlethread
    }

    pub(crate) fn handler(&self) -> &BoxedHandler {
        &self.handler
    }
}

impl std::fmt::Debug for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hook")
            .field("name", &self.name)
            .field("trigger", &self.trigger)
            .field("singlethread", &self.singlethread)
            .finish()
    }
}

/// A named set of hooks, swapped in and out of the registry as a unit.
#[derive(Debug, Clone)]
pub struct Plugin {
    name: String,
    source: Option<PathBuf>,
    hooks: Vec<Hook>,
}

impl Plugin {
    /// Creates an empty plugin.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            hooks: Vec::new(),
        }
    }

    /// Adds a hook.
    pub fn hook(mut self, hook: Hook) -> Self {
        self.hooks.push(hook);
        self
    }

    /// Records the file this plugin was loaded from.
    pub fn loaded_from(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(path.into());
        self
    }

    /// Plugin name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File the plugin was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Declared hooks, in order.
    pub fn hooks(&self) -> &[Hook] {
        &self.hooks
    }
}
