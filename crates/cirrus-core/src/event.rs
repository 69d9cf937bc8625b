//! Inbound event value object.
//!
//! An [`Event`] is the structured form of one inbound protocol line. The
//! connection layer builds it with [`EventBuilder`] after parsing, enqueues it
//! once, and from then on it is shared read-only by every handler dispatched
//! for it:
//!
//! ```rust,ignore
//! let event = Event::builder("libera")
//!     .origin(Arc::downgrade(&conn))
//!     .raw(":alice!a@host PRIVMSG #rust :hi")
//!     .prefix("alice!a@host")
//!     .source(Source::new("alice", "a", "host"))
//!     .command("PRIVMSG")
//!     .params(["#rust", "hi"])
//!     .build();
//!
//! queue.enqueue(event);
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};

use crate::connection::Connection;

/// Identity of the sender of an event (`nick!user@host`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Nickname.
    pub nick: String,
    /// User (ident) part.
    pub user: String,
    /// Host part.
    pub host: String,
}

impl Source {
    /// Creates a new source identity.
    pub fn new(nick: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            nick: nick.into(),
            user: user.into(),
            host: host.into(),
        }
    }

    /// Returns the full `nick!user@host` mask.
    pub fn mask(&self) -> String {
        format!("{}!{}@{}", self.nick, self.user, self.host)
    }

    /// Returns `true` when no part of the identity is known (server-originated lines).
    pub fn is_empty(&self) -> bool {
        self.nick.is_empty() && self.user.is_empty() && self.host.is_empty()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mask())
    }
}

/// One parsed inbound protocol line.
///
/// Immutable after construction; handlers receive it as `Arc<Event>`.
#[derive(Clone)]
pub struct Event {
    connection_name: Arc<str>,
    origin: Option<Weak<dyn Connection>>,
    raw: String,
    prefix: Option<String>,
    command: String,
    source: Source,
    params: Vec<String>,
    last_param: String,
}

impl Event {
    /// Starts building an event that originated on the named connection.
    pub fn builder(connection_name: impl Into<Arc<str>>) -> EventBuilder {
        EventBuilder::new(connection_name)
    }

    /// Canonical name of the originating connection.
    pub fn connection_name(&self) -> &str {
        &self.connection_name
    }

    /// Returns the originating connection if it is still alive.
    pub fn connection(&self) -> Option<Arc<dyn Connection>> {
        self.origin.as_ref().and_then(Weak::upgrade)
    }

    /// The raw line as received.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The raw prefix, if the line carried one.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The command token, upper-cased (`PRIVMSG`, `JOIN`, `001`, ...).
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Sender identity.
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Shorthand for `source().nick`.
    pub fn nick(&self) -> &str {
        &self.source.nick
    }

    /// Ordered parameter list.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// The last parameter, or an empty string when there are none.
    pub fn last_param(&self) -> &str {
        &self.last_param
    }

    /// Sends a command back over the originating connection.
    ///
    /// Returns `false` if the connection has already been dropped.
    pub fn reply_command(&self, command: &str, params: &[String]) -> bool {
        match self.connection() {
            Some(conn) => {
                conn.send_command(command, params);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("connection", &self.connection_name)
            .field("command", &self.command)
            .field("source", &self.source)
            .field("params", &self.params)
            .finish()
    }
}

/// Builder for [`Event`].
#[derive(Clone)]
pub struct EventBuilder {
    connection_name: Arc<str>,
    origin: Option<Weak<dyn Connection>>,
    raw: String,
    prefix: Option<String>,
    command: String,
    source: Source,
    params: Vec<String>,
}

impl EventBuilder {
    fn new(connection_name: impl Into<Arc<str>>) -> Self {
        Self {
            connection_name: connection_name.into(),
            origin: None,
            raw: String::new(),
            prefix: None,
            command: String::new(),
            source: Source::default(),
            params: Vec::new(),
        }
    }

    /// Sets the non-owning reference back to the originating connection.
    pub fn origin(mut self, origin: Weak<dyn Connection>) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Sets the raw line.
    pub fn raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = raw.into();
        self
    }

    /// Sets the raw prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the command token. Stored upper-cased.
    pub fn command(mut self, command: impl AsRef<str>) -> Self {
        self.command = command.as_ref().to_ascii_uppercase();
        self
    }

    /// Sets the sender identity.
    pub fn source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    /// Sets the parameter list.
    pub fn params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    /// Finishes the event. The last parameter is derived from the list.
    pub fn build(self) -> Event {
        let last_param = self.params.last().cloned().unwrap_or_default();
        Event {
            connection_name: self.connection_name,
            origin: self.origin,
            raw: self.raw,
            prefix: self.prefix,
            command: self.command,
            source: self.source,
            params: self.params,
            last_param,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_derives_last_param() {
        let event = Event::builder("net")
            .raw(":a!b@c PRIVMSG #chan :hello there")
            .command("privmsg")
            .source(Source::new("a", "b", "c"))
            .params(["#chan", "hello there"])
            .build();

        assert_eq!(event.command(), "PRIVMSG");
        assert_eq!(event.last_param(), "hello there");
        assert_eq!(event.source().mask(), "a!b@c");
        assert_eq!(event.connection_name(), "net");
    }

    #[test]
    fn test_empty_params_give_empty_last_param() {
        let event = Event::builder("net").command("PING").build();
        assert_eq!(event.last_param(), "");
        assert!(event.source().is_empty());
        assert!(event.connection().is_none());
    }

    #[test]
    fn test_reply_without_connection_is_noop() {
        let event = Event::builder("net").command("PRIVMSG").build();
        assert!(!event.reply_command("PRIVMSG", &["#chan".into(), "hi".into()]));
    }
}
