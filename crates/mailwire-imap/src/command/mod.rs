//! Commands issued on the parser's behalf.
//!
//! Folder parent resolution is the only place the grammar engine talks back
//! to the server. It does so through [`CommandIssuer`], which the session
//! scheduler implements; untagged responses to the issued command are fed
//! back through an [`UntaggedHandler`].

pub mod serialize;

use crate::Cancellation;
use crate::Result;
use crate::parser::TokenSource;
use crate::types::Tag;

use serialize::write_astring;

/// IMAP command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// LIST command.
    List {
        /// Reference name.
        reference: String,
        /// Mailbox pattern.
        pattern: String,
    },
    /// LSUB command.
    Lsub {
        /// Reference name.
        reference: String,
        /// Mailbox pattern.
        pattern: String,
    },
}

impl Command {
    /// Returns the command keyword.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::List { .. } => "LIST",
            Self::Lsub { .. } => "LSUB",
        }
    }

    /// Serializes the command with the given tag, including the trailing
    /// CRLF.
    #[must_use]
    pub fn serialize(&self, tag: &str) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(tag.as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(self.keyword().as_bytes());

        match self {
            Self::List { reference, pattern } | Self::Lsub { reference, pattern } => {
                buf.push(b' ');
                write_astring(&mut buf, reference);
                buf.push(b' ');
                write_astring(&mut buf, pattern);
            }
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }
}

/// A command that has been sent and not yet completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommand {
    tag: Tag,
    command: Command,
    handlers: Vec<String>,
}

impl PendingCommand {
    /// Creates a pending command with no untagged handlers.
    #[must_use]
    pub const fn new(tag: Tag, command: Command) -> Self {
        Self {
            tag,
            command,
            handlers: Vec::new(),
        }
    }

    /// Returns the tag the command was sent with.
    #[must_use]
    pub const fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Returns the command.
    #[must_use]
    pub const fn command(&self) -> &Command {
        &self.command
    }

    /// Routes untagged responses with this keyword to the waiter's handler.
    pub fn register_untagged_handler(&mut self, keyword: impl Into<String>) {
        let keyword = keyword.into();
        if !self.handles(&keyword) {
            self.handlers.push(keyword);
        }
    }

    /// Returns true if untagged responses with this keyword belong to the
    /// command. Keywords compare case-insensitively.
    #[must_use]
    pub fn handles(&self, keyword: &str) -> bool {
        self.handlers.iter().any(|k| k.eq_ignore_ascii_case(keyword))
    }
}

/// Sends commands and waits for their completion.
///
/// Implemented by the session scheduler. [`wait`](Self::wait) blocks the
/// calling flow until the tagged completion arrives, so it must not be
/// called while the scheduler's own response dispatch is held.
pub trait CommandIssuer {
    /// Sends a command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be sent or the wait was
    /// cancelled.
    fn issue(&mut self, command: &Command, cancel: &Cancellation) -> Result<PendingCommand>;

    /// Waits for a pending command to complete, feeding each untagged
    /// response whose keyword the command registered to `handler`.
    ///
    /// # Errors
    ///
    /// Returns an error from the handler, from the transport, or on
    /// cancellation.
    fn wait(
        &mut self,
        pending: &PendingCommand,
        handler: &mut dyn UntaggedHandler,
        cancel: &Cancellation,
    ) -> Result<()>;
}

/// Consumes the body of one untagged response.
pub trait UntaggedHandler {
    /// Handles an untagged response. `source` is positioned just after the
    /// keyword.
    ///
    /// # Errors
    ///
    /// Returns an error if the response does not parse.
    fn handle(
        &mut self,
        keyword: &str,
        source: &mut dyn TokenSource,
        cancel: &Cancellation,
    ) -> Result<()>;
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_list_command() {
        let cmd = Command::List {
            reference: String::new(),
            pattern: "*".to_string(),
        };
        assert_eq!(cmd.serialize("A001"), b"A001 LIST \"\" \"*\"\r\n");
    }

    #[test]
    fn test_list_exact_name() {
        let cmd = Command::List {
            reference: String::new(),
            pattern: "INBOX/Sub".to_string(),
        };
        assert_eq!(cmd.serialize("A0001"), b"A0001 LIST \"\" INBOX/Sub\r\n");

        let cmd = Command::List {
            reference: String::new(),
            pattern: "Work Items".to_string(),
        };
        assert_eq!(cmd.serialize("A2"), b"A2 LIST \"\" \"Work Items\"\r\n");
    }

    #[test]
    fn test_lsub_command() {
        let cmd = Command::Lsub {
            reference: "Archive/".to_string(),
            pattern: "%".to_string(),
        };
        assert_eq!(cmd.keyword(), "LSUB");
        assert_eq!(cmd.serialize("A3"), b"A3 LSUB Archive/ \"%\"\r\n");
    }

    #[test]
    fn test_pending_handlers() {
        let mut pending = PendingCommand::new(
            Tag::new("A1"),
            Command::List {
                reference: String::new(),
                pattern: "x".to_string(),
            },
        );
        assert!(!pending.handles("LIST"));
        pending.register_untagged_handler("LIST");
        pending.register_untagged_handler("list");
        assert!(pending.handles("List"));
        assert!(!pending.handles("LSUB"));
        assert_eq!(pending.tag().as_str(), "A1");
        assert_eq!(pending.command().keyword(), "LIST");
    }
}
