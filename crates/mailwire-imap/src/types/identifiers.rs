//! Core IMAP identifiers.
//!
//! Types for tags, UIDs and wire-encoded mailbox names.

use std::num::NonZeroU32;

/// IMAP command tag.
///
/// Each command sent by the client carries a unique tag, and the server's
/// completion response repeats it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(pub String);

impl Tag {
    /// Creates a new tag from a string.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message UID, scoped to one folder. Zero is never a valid UID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uid(pub NonZeroU32);

impl Uid {
    /// Wraps a raw value, rejecting 0.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Raw value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Mailbox name exactly as the server transmits it (modified UTF-7).
///
/// This is the folder cache key. Use
/// [`decode_folder_name`](crate::folder::decode_folder_name) for display.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mailbox(pub String);

impl Mailbox {
    /// Creates a new mailbox name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The INBOX mailbox.
    #[must_use]
    pub fn inbox() -> Self {
        Self("INBOX".to_string())
    }

    /// Returns the mailbox name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::borrow::Borrow<str> for Mailbox {
    fn borrow(&self) -> &str {
        &self.0
    }
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
    fn test_uid_new() {
        assert!(Uid::new(0).is_none());
        assert_eq!(Uid::new(123).unwrap().get(), 123);
        assert_eq!(Uid::new(7).unwrap().to_string(), "7");
    }

    #[test]
    fn test_tag() {
        let tag = Tag::new("A0001");
        assert_eq!(tag.as_str(), "A0001");
        assert_eq!(tag.to_string(), "A0001");
    }

    #[test]
    fn test_mailbox_borrow() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(Mailbox::new("INBOX/Sent"), 1);
        assert_eq!(map.get("INBOX/Sent"), Some(&1));
        assert_eq!(Mailbox::inbox().as_str(), "INBOX");
    }
}
