//! ENVELOPE values.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use mailwire_mime::date::format_date;

use crate::command::serialize::{write_nstring, write_string};
use crate::parser::{Reader, Tokenizer, parse_envelope};
use crate::{Cancellation, Result};

/// Message envelope: the header summary a server sends for `ENVELOPE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Send date, `None` if absent or unparsable.
    pub date: Option<DateTime<FixedOffset>>,
    /// Word-decoded subject.
    pub subject: Option<String>,
    /// From addresses.
    pub from: Vec<Address>,
    /// Sender addresses.
    pub sender: Vec<Address>,
    /// Reply-To addresses.
    pub reply_to: Vec<Address>,
    /// To addresses.
    pub to: Vec<Address>,
    /// Cc addresses.
    pub cc: Vec<Address>,
    /// Bcc addresses.
    pub bcc: Vec<Address>,
    /// In-Reply-To message ids, `None` when the server sent NIL.
    pub in_reply_to: Option<Vec<String>>,
    /// Message-ID without angle brackets.
    pub message_id: Option<String>,
}

impl Envelope {
    /// Parses an envelope from its parenthesized wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a well-formed envelope.
    pub fn parse(text: &str) -> Result<Self> {
        let cancel = Cancellation::new();
        let mut tokenizer = Tokenizer::new(text.as_bytes());
        let mut reader = Reader::new(&mut tokenizer, &cancel);
        parse_envelope(&mut reader)
    }

    /// Appends the parenthesized wire form to `buf`.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(b'(');
        write_nstring(buf, self.date.as_ref().map(format_date).as_deref());
        buf.push(b' ');
        write_nstring(buf, self.subject.as_deref());
        for list in [
            &self.from,
            &self.sender,
            &self.reply_to,
            &self.to,
            &self.cc,
            &self.bcc,
        ] {
            buf.push(b' ');
            encode_address_list(buf, list);
        }
        buf.push(b' ');
        let in_reply_to = self.in_reply_to.as_ref().map(|ids| {
            ids.iter()
                .map(|id| format!("<{id}>"))
                .collect::<Vec<_>>()
                .join(" ")
        });
        write_nstring(buf, in_reply_to.as_deref());
        buf.push(b' ');
        let message_id = self.message_id.as_ref().map(|id| format!("<{id}>"));
        write_nstring(buf, message_id.as_deref());
        buf.push(b')');
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}

fn encode_address_list(buf: &mut Vec<u8>, list: &[Address]) {
    if list.is_empty() {
        buf.extend_from_slice(b"NIL");
        return;
    }
    buf.push(b'(');
    for address in list {
        address.encode(buf);
    }
    buf.push(b')');
}

/// A mailbox address from an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Word-decoded display name.
    pub name: Option<String>,
    /// `local@domain`, or the bare local part when the domain was NIL.
    pub address: String,
}

impl Address {
    /// Creates an address.
    #[must_use]
    pub fn new(name: Option<String>, address: impl Into<String>) -> Self {
        Self {
            name,
            address: address.into(),
        }
    }

    /// Returns the local part.
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.split().0
    }

    /// Returns the domain, if the address has one.
    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.split().1
    }

    fn split(&self) -> (&str, Option<&str>) {
        match self.address.rsplit_once('@') {
            Some((local, domain)) => (local, Some(domain)),
            None => (&self.address, None),
        }
    }

    fn encode(&self, buf: &mut Vec<u8>) {
        let (local, domain) = self.split();
        buf.push(b'(');
        write_nstring(buf, self.name.as_deref());
        buf.extend_from_slice(b" NIL ");
        write_string(buf, local);
        buf.push(b' ');
        write_nstring(buf, domain);
        buf.push(b')');
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => {
                if is_atom(name) {
                    write!(f, "{name} <{}>", self.address)
                } else {
                    let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
                    write!(f, "\"{escaped}\" <{}>", self.address)
                }
            }
            _ => f.write_str(&self.address),
        }
    }
}

/// Joins addresses the way a header would list them.
#[must_use]
pub fn format_address_list(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Returns true if `s` is a single RFC 5322 atom.
fn is_atom(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c) || !c.is_ascii())
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
    fn test_address_display() {
        let quoted = Address::new(Some("Terry Gray".to_string()), "gray@cac.washington.edu");
        assert_eq!(quoted.to_string(), "\"Terry Gray\" <gray@cac.washington.edu>");

        let atom = Address::new(Some("Terry".to_string()), "gray@cac.washington.edu");
        assert_eq!(atom.to_string(), "Terry <gray@cac.washington.edu>");

        let bare = Address::new(None, "imap@cac.washington.edu");
        assert_eq!(bare.to_string(), "imap@cac.washington.edu");

        let escaped = Address::new(Some("a \"b\"".to_string()), "x@y");
        assert_eq!(escaped.to_string(), "\"a \\\"b\\\"\" <x@y>");
    }

    #[test]
    fn test_address_parts() {
        let address = Address::new(None, "KLENSIN@MIT.EDU");
        assert_eq!(address.local_part(), "KLENSIN");
        assert_eq!(address.domain(), Some("MIT.EDU"));

        let group = Address::new(Some("undisclosed".to_string()), "recipients");
        assert_eq!(group.local_part(), "recipients");
        assert_eq!(group.domain(), None);
    }

    #[test]
    fn test_format_address_list() {
        let list = vec![
            Address::new(None, "minutes@CNRI.Reston.VA.US"),
            Address::new(Some("John Klensin".to_string()), "KLENSIN@MIT.EDU"),
        ];
        assert_eq!(
            format_address_list(&list),
            "minutes@CNRI.Reston.VA.US, \"John Klensin\" <KLENSIN@MIT.EDU>"
        );
        assert_eq!(format_address_list(&[]), "");
    }

    #[test]
    fn test_encode_empty_envelope() {
        assert_eq!(
            Envelope::default().to_string(),
            "(NIL NIL NIL NIL NIL NIL NIL NIL NIL NIL)"
        );
    }

    #[test]
    fn test_encode_address() {
        let envelope = Envelope {
            from: vec![Address::new(Some("Terry Gray".to_string()), "gray@cac.washington.edu")],
            to: vec![Address::new(None, "group")],
            message_id: Some("id@host".to_string()),
            ..Envelope::default()
        };
        assert_eq!(
            envelope.to_string(),
            "(NIL NIL ((\"Terry Gray\" NIL \"gray\" \"cac.washington.edu\")) NIL NIL \
             ((NIL NIL \"group\" NIL)) NIL NIL NIL \"<id@host>\")"
        );
    }
}
