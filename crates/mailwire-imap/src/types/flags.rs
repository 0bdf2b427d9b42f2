//! Message flags.

use bitflags::bitflags;

bitflags! {
    /// System flags a message can carry.
    #[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MessageFlags: u8 {
        /// Message has been answered.
        const ANSWERED     = 0b0000_0001;
        /// Message is marked for deletion.
        const DELETED      = 0b0000_0010;
        /// Message is a draft.
        const DRAFT        = 0b0000_0100;
        /// Message is flagged for special attention.
        const FLAGGED      = 0b0000_1000;
        /// Message has been read.
        const SEEN         = 0b0001_0000;
        /// Message is recent (first session to see it).
        const RECENT       = 0b0010_0000;
        /// The mailbox accepts custom keywords (`\*` in PERMANENTFLAGS).
        /// Never a per-message flag.
        const USER_DEFINED = 0b0100_0000;
    }
}

impl MessageFlags {
    /// Maps a wire flag to its bit. Matching is case-sensitive.
    #[must_use]
    pub fn from_wire(flag: &str) -> Option<Self> {
        match flag {
            "\\Answered" => Some(Self::ANSWERED),
            "\\Deleted" => Some(Self::DELETED),
            "\\Draft" => Some(Self::DRAFT),
            "\\Flagged" => Some(Self::FLAGGED),
            "\\Seen" => Some(Self::SEEN),
            "\\Recent" => Some(Self::RECENT),
            "\\*" => Some(Self::USER_DEFINED),
            _ => None,
        }
    }
}

/// Order and spelling of the flags a client may store.
const STORABLE: [(MessageFlags, &str); 5] = [
    (MessageFlags::ANSWERED, "\\Answered"),
    (MessageFlags::DELETED, "\\Deleted"),
    (MessageFlags::DRAFT, "\\Draft"),
    (MessageFlags::FLAGGED, "\\Flagged"),
    (MessageFlags::SEEN, "\\Seen"),
];

/// Formats a flag list for APPEND or STORE, e.g. `(\Answered \Seen)`.
///
/// `\Recent` and the user-defined marker are server-managed and never
/// written.
#[must_use]
pub fn format_flags_list(flags: MessageFlags) -> String {
    let names: Vec<&str> = STORABLE
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .map(|(_, name)| *name)
        .collect();
    format!("({})", names.join(" "))
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
    fn test_format_empty() {
        assert_eq!(format_flags_list(MessageFlags::empty()), "()");
    }

    #[test]
    fn test_format_fixed_order() {
        let flags = MessageFlags::SEEN | MessageFlags::ANSWERED | MessageFlags::FLAGGED;
        assert_eq!(format_flags_list(flags), "(\\Answered \\Flagged \\Seen)");
        assert_eq!(
            format_flags_list(MessageFlags::all()),
            "(\\Answered \\Deleted \\Draft \\Flagged \\Seen)"
        );
    }

    #[test]
    fn test_format_skips_server_flags() {
        let flags = MessageFlags::RECENT | MessageFlags::USER_DEFINED;
        assert_eq!(format_flags_list(flags), "()");
    }

    #[test]
    fn test_from_wire_is_case_sensitive() {
        assert_eq!(MessageFlags::from_wire("\\Seen"), Some(MessageFlags::SEEN));
        assert_eq!(MessageFlags::from_wire("\\SEEN"), None);
        assert_eq!(MessageFlags::from_wire("\\*"), Some(MessageFlags::USER_DEFINED));
        assert_eq!(MessageFlags::from_wire("$Forwarded"), None);
    }
}
