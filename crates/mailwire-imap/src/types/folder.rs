//! Folder attributes and identities.

use bitflags::bitflags;

use super::Mailbox;

bitflags! {
    /// Attributes a LIST or LSUB response attaches to a folder.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FolderAttributes: u32 {
        /// No child folders can be created.
        const NO_INFERIORS    = 1 << 0;
        /// The folder cannot be selected.
        const NO_SELECT       = 1 << 1;
        /// The folder probably has new messages.
        const MARKED          = 1 << 2;
        /// The folder has no new messages.
        const UNMARKED        = 1 << 3;
        /// The folder does not exist.
        const NON_EXISTENT    = 1 << 4;
        /// The folder is subscribed.
        const SUBSCRIBED      = 1 << 5;
        /// The folder is on a remote server.
        const REMOTE          = 1 << 6;
        /// The folder has children.
        const HAS_CHILDREN    = 1 << 7;
        /// The folder has no children.
        const HAS_NO_CHILDREN = 1 << 8;
        /// Virtual folder holding all messages.
        const ALL             = 1 << 9;
        /// Archive folder.
        const ARCHIVE         = 1 << 10;
        /// Drafts folder.
        const DRAFTS          = 1 << 11;
        /// Virtual folder holding flagged messages.
        const FLAGGED         = 1 << 12;
        /// Junk folder.
        const JUNK            = 1 << 13;
        /// Sent folder.
        const SENT            = 1 << 14;
        /// Trash folder.
        const TRASH           = 1 << 15;
    }
}

impl FolderAttributes {
    /// Bits that describe the folder at one point in time and are replaced,
    /// not accumulated, when a folder is listed again.
    pub const TRANSIENT: Self = Self::MARKED.union(Self::UNMARKED);

    /// Maps a wire attribute to its bit.
    ///
    /// Matching is case-sensitive. The XLIST spellings fold onto the
    /// RFC 6154 attributes. `\Inbox` is recognized but yields no bit, so it
    /// returns `Some(empty)`. Unknown attributes return `None`.
    #[must_use]
    pub fn from_wire(attr: &str) -> Option<Self> {
        let bit = match attr {
            "\\NoInferiors" => Self::NO_INFERIORS,
            "\\Noselect" => Self::NO_SELECT,
            "\\Marked" => Self::MARKED,
            "\\Unmarked" => Self::UNMARKED,
            "\\NonExistent" => Self::NON_EXISTENT,
            "\\Subscribed" => Self::SUBSCRIBED,
            "\\Remote" => Self::REMOTE,
            "\\HasChildren" => Self::HAS_CHILDREN,
            "\\HasNoChildren" => Self::HAS_NO_CHILDREN,
            "\\All" | "\\AllMail" => Self::ALL,
            "\\Archive" => Self::ARCHIVE,
            "\\Drafts" => Self::DRAFTS,
            "\\Flagged" | "\\Important" | "\\Starred" => Self::FLAGGED,
            "\\Junk" | "\\Spam" => Self::JUNK,
            "\\Sent" => Self::SENT,
            "\\Trash" => Self::TRASH,
            "\\Inbox" => Self::empty(),
            _ => return None,
        };
        Some(bit)
    }

    /// Merges a later listing into previously observed attributes.
    ///
    /// `MARKED` and `UNMARKED` come from `latest` only; every other bit is
    /// the union of both.
    #[must_use]
    pub const fn merge(self, latest: Self) -> Self {
        self.difference(Self::TRANSIENT).union(latest)
    }
}

/// Special-use roles a folder can play (RFC 6154).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialUse {
    /// All messages.
    All,
    /// Archived messages.
    Archive,
    /// Draft messages.
    Drafts,
    /// Flagged messages.
    Flagged,
    /// Junk mail.
    Junk,
    /// Sent mail.
    Sent,
    /// Deleted messages.
    Trash,
}

impl SpecialUse {
    /// Returns the attribute bit that marks this role.
    #[must_use]
    pub const fn attribute(self) -> FolderAttributes {
        match self {
            Self::All => FolderAttributes::ALL,
            Self::Archive => FolderAttributes::ARCHIVE,
            Self::Drafts => FolderAttributes::DRAFTS,
            Self::Flagged => FolderAttributes::FLAGGED,
            Self::Junk => FolderAttributes::JUNK,
            Self::Sent => FolderAttributes::SENT,
            Self::Trash => FolderAttributes::TRASH,
        }
    }
}

/// A folder as known to the folder cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderIdentity {
    /// Name as sent by the server; the cache key.
    pub encoded_name: Mailbox,
    /// Decoded name for display and hierarchy computations.
    pub full_name: String,
    /// Current attributes.
    pub attributes: FolderAttributes,
    /// Hierarchy delimiter, `None` for a flat namespace.
    pub delimiter: Option<char>,
    /// Key of the parent folder once resolved.
    pub parent: Option<Mailbox>,
}

impl FolderIdentity {
    /// Returns the last hierarchy segment of the decoded name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self.delimiter {
            Some(delim) => self
                .full_name
                .rsplit(delim)
                .next()
                .unwrap_or(&self.full_name),
            None => &self.full_name,
        }
    }

    /// Returns true if the server reported the folder as non-existent.
    #[must_use]
    pub const fn is_non_existent(&self) -> bool {
        self.attributes.contains(FolderAttributes::NON_EXISTENT)
    }

    /// Returns true if the folder can be selected.
    #[must_use]
    pub const fn is_selectable(&self) -> bool {
        !self
            .attributes
            .intersects(FolderAttributes::NO_SELECT.union(FolderAttributes::NON_EXISTENT))
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
    fn test_from_wire_vocabulary() {
        assert_eq!(
            FolderAttributes::from_wire("\\HasNoChildren"),
            Some(FolderAttributes::HAS_NO_CHILDREN)
        );
        assert_eq!(
            FolderAttributes::from_wire("\\Noselect"),
            Some(FolderAttributes::NO_SELECT)
        );
        assert_eq!(FolderAttributes::from_wire("\\NoSelect"), None);
    }

    #[test]
    fn test_from_wire_xlist_synonyms() {
        assert_eq!(FolderAttributes::from_wire("\\AllMail"), Some(FolderAttributes::ALL));
        assert_eq!(
            FolderAttributes::from_wire("\\Important"),
            Some(FolderAttributes::FLAGGED)
        );
        assert_eq!(
            FolderAttributes::from_wire("\\Starred"),
            Some(FolderAttributes::FLAGGED)
        );
        assert_eq!(FolderAttributes::from_wire("\\Spam"), Some(FolderAttributes::JUNK));
        assert_eq!(
            FolderAttributes::from_wire("\\Inbox"),
            Some(FolderAttributes::empty())
        );
        assert_eq!(FolderAttributes::from_wire("\\Whatever"), None);
    }

    #[test]
    fn test_merge_replaces_transient_bits() {
        let first = FolderAttributes::MARKED | FolderAttributes::SUBSCRIBED;
        let second = FolderAttributes::UNMARKED | FolderAttributes::HAS_CHILDREN;
        assert_eq!(
            first.merge(second),
            FolderAttributes::UNMARKED
                | FolderAttributes::HAS_CHILDREN
                | FolderAttributes::SUBSCRIBED
        );
        assert_eq!(second.merge(FolderAttributes::empty()), FolderAttributes::HAS_CHILDREN);
    }

    #[test]
    fn test_identity_name() {
        let identity = FolderIdentity {
            encoded_name: Mailbox::new("INBOX/Work"),
            full_name: "INBOX/Work".to_string(),
            attributes: FolderAttributes::NO_SELECT,
            delimiter: Some('/'),
            parent: None,
        };
        assert_eq!(identity.name(), "Work");
        assert!(!identity.is_selectable());
        assert!(!identity.is_non_existent());
    }
}
