//! ENVELOPE grammar.

use mailwire_mime::date::parse_date;
use mailwire_mime::encoding::decode_phrase;
use mailwire_mime::references::{enumerate_references, first_reference};
use tracing::{trace, warn};

use super::{Reader, Token, TokenSource};
use crate::types::{Address, Envelope};
use crate::{Error, Result};

/// Parses a parenthesized ENVELOPE.
///
/// The date is parsed leniently: a value that does not parse leaves
/// `date` unset instead of failing the envelope.
///
/// # Errors
///
/// Returns `Error::Syntax` on the first token that does not fit the grammar.
pub fn parse_envelope<S: TokenSource + ?Sized>(reader: &mut Reader<'_, S>) -> Result<Envelope> {
    reader.expect(&Token::OpenParen, false)?;

    let date = reader.read_nstring_bytes()?.and_then(|raw| {
        let text: String = raw.iter().copied().map(char::from).collect();
        let date = parse_date(&text);
        if date.is_none() {
            warn!(date = %text, "unparsable envelope date");
        }
        date
    });
    let subject = reader.read_nstring(true)?;
    let from = parse_address_list(reader)?;
    let sender = parse_address_list(reader)?;
    let reply_to = parse_address_list(reader)?;
    let to = parse_address_list(reader)?;
    let cc = parse_address_list(reader)?;
    let bcc = parse_address_list(reader)?;
    let in_reply_to = reader
        .read_nstring(false)?
        .map(|value| enumerate_references(&value));
    let message_id = reader
        .read_nstring(false)?
        .and_then(|value| first_reference(&value));

    reader.expect(&Token::CloseParen, true)?;
    trace!(subject = subject.as_deref().unwrap_or(""), "parsed envelope");

    Ok(Envelope {
        date,
        subject,
        from,
        sender,
        reply_to,
        to,
        cc,
        bcc,
        in_reply_to,
        message_id,
    })
}

/// Parses `NIL` or a list of address tuples.
fn parse_address_list<S: TokenSource + ?Sized>(
    reader: &mut Reader<'_, S>,
) -> Result<Vec<Address>> {
    match reader.read_token()? {
        Token::Nil => return Ok(Vec::new()),
        Token::OpenParen => {}
        token => return Err(Error::syntax(token, false)),
    }

    let mut addresses = Vec::new();
    while !reader.at_close()? {
        addresses.push(parse_address(reader)?);
    }
    reader.read_token()?;
    Ok(addresses)
}

/// Parses `(name adl mailbox host)`.
///
/// Group syntax is not modelled: a start marker (NIL host) becomes an
/// address holding the bare group name, and the all-NIL end marker an
/// empty one.
fn parse_address<S: TokenSource + ?Sized>(reader: &mut Reader<'_, S>) -> Result<Address> {
    reader.expect(&Token::OpenParen, false)?;

    let name = reader
        .read_nstring_bytes()?
        .map(|raw| decode_phrase(&raw));
    let _route = reader.read_nstring(false)?;
    let local = reader.read_nstring(false)?.unwrap_or_default();
    let domain = reader.read_nstring(false)?;

    reader.expect(&Token::CloseParen, true)?;

    let address = match domain {
        Some(domain) => format!("{local}@{domain}"),
        None => local,
    };
    Ok(Address::new(name, address))
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
    use mailwire_mime::date::format_date;

    use super::*;
    use crate::Cancellation;
    use crate::parser::Tokenizer;
    use crate::types::format_address_list;

    const RFC3501_ENVELOPE: &str = concat!(
        r#"("Wed, 17 Jul 1996 02:23:25 -0700 (PDT)" "IMAP4rev1 WG mtg summary and minutes""#,
        r#" (("Terry Gray" NIL "gray" "cac.washington.edu"))"#,
        r#" (("Terry Gray" NIL "gray" "cac.washington.edu"))"#,
        r#" (("Terry Gray" NIL "gray" "cac.washington.edu"))"#,
        r#" ((NIL NIL "imap" "cac.washington.edu"))"#,
        r#" ((NIL NIL "minutes" "CNRI.Reston.VA.US")("John Klensin" NIL "KLENSIN" "MIT.EDU"))"#,
        r#" NIL NIL "<B27397-0100000@cac.washington.edu>")"#,
    );

    fn parse(input: &str) -> Result<Envelope> {
        let cancel = Cancellation::new();
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        let mut reader = Reader::new(&mut tokenizer, &cancel);
        parse_envelope(&mut reader)
    }

    #[test]
    fn test_rfc3501_example() {
        let envelope = parse(RFC3501_ENVELOPE).unwrap();

        assert_eq!(
            format_date(&envelope.date.unwrap()),
            "Wed, 17 Jul 1996 02:23:25 -0700"
        );
        assert_eq!(
            envelope.subject.as_deref(),
            Some("IMAP4rev1 WG mtg summary and minutes")
        );
        for list in [&envelope.from, &envelope.sender, &envelope.reply_to] {
            assert_eq!(
                format_address_list(list),
                "\"Terry Gray\" <gray@cac.washington.edu>"
            );
        }
        assert_eq!(format_address_list(&envelope.to), "imap@cac.washington.edu");
        assert_eq!(
            format_address_list(&envelope.cc),
            "minutes@CNRI.Reston.VA.US, \"John Klensin\" <KLENSIN@MIT.EDU>"
        );
        assert!(envelope.bcc.is_empty());
        assert_eq!(envelope.in_reply_to, None);
        assert_eq!(
            envelope.message_id.as_deref(),
            Some("B27397-0100000@cac.washington.edu")
        );
    }

    #[test]
    fn test_unparsable_date_is_dropped() {
        let envelope = parse(r#"("yesterday-ish" "hi" NIL NIL NIL NIL NIL NIL NIL NIL)"#).unwrap();
        assert_eq!(envelope.date, None);
        assert_eq!(envelope.subject.as_deref(), Some("hi"));
    }

    #[test]
    fn test_encoded_subject_and_name() {
        let envelope = parse(concat!(
            r#"(NIL "=?utf-8?B?SMOpbGxv?=" (("=?iso-8859-1?q?Andr=E9?=" NIL "andre" "example.org"))"#,
            r#" NIL NIL NIL NIL NIL "<a@x> <b@y>" NIL)"#
        ))
        .unwrap();
        assert_eq!(envelope.subject.as_deref(), Some("Héllo"));
        assert_eq!(envelope.from[0].name.as_deref(), Some("André"));
        assert_eq!(
            envelope.in_reply_to,
            Some(vec!["a@x".to_string(), "b@y".to_string()])
        );
        assert_eq!(envelope.message_id, None);
    }

    #[test]
    fn test_group_markers() {
        let envelope = parse(concat!(
            r#"(NIL NIL NIL NIL NIL"#,
            r#" ((NIL NIL "undisclosed" NIL)(NIL NIL NIL NIL))"#,
            r#" NIL NIL NIL NIL)"#
        ))
        .unwrap();
        assert_eq!(envelope.to.len(), 2);
        assert_eq!(envelope.to[0].address, "undisclosed");
        assert_eq!(envelope.to[0].domain(), None);
        assert_eq!(envelope.to[1], Address::new(None, ""));
    }

    #[test]
    fn test_encode_round_trip() {
        let envelope = parse(RFC3501_ENVELOPE).unwrap();
        assert_eq!(Envelope::parse(&envelope.to_string()).unwrap(), envelope);
    }

    #[test]
    fn test_missing_close_paren() {
        let err = parse(r#"(NIL NIL NIL NIL NIL NIL NIL NIL NIL NIL NIL)"#).unwrap_err();
        assert!(matches!(
            err,
            Error::Syntax {
                token: Token::Nil,
                final_token: true
            }
        ));
    }

    #[test]
    fn test_address_list_must_be_list() {
        assert!(matches!(
            parse(r#"(NIL NIL "gray" NIL NIL NIL NIL NIL NIL NIL)"#),
            Err(Error::Syntax { .. })
        ));
    }
}
