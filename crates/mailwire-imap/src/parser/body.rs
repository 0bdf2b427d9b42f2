//! BODYSTRUCTURE grammar and the content metadata it is built from.

use mailwire_mime::{ContentDisposition, ContentType, Parameters};
use tracing::{debug, trace};

use super::{Reader, Token, TokenSource, parse_envelope};
use crate::types::{BasicFields, BodyPart, BodyPartCommon};
use crate::{Error, Result};

/// Parses one BODY or BODYSTRUCTURE value.
///
/// Returns `None` when the server sent `NIL`.
///
/// # Errors
///
/// Returns `Error::Syntax` on the first token that does not fit the grammar,
/// or `Error::DepthExceeded` when parts nest too deeply.
pub fn parse_body_structure<S: TokenSource + ?Sized>(
    reader: &mut Reader<'_, S>,
) -> Result<Option<BodyPart>> {
    match reader.read_token()? {
        Token::Nil => Ok(None),
        Token::OpenParen => parse_body_part(reader).map(Some),
        token => Err(Error::syntax(token, false)),
    }
}

/// Parses a part whose opening paren has been consumed.
fn parse_body_part<S: TokenSource + ?Sized>(reader: &mut Reader<'_, S>) -> Result<BodyPart> {
    reader.enter()?;
    let part = if reader.peek_token()? == Token::OpenParen {
        parse_multipart(reader)
    } else {
        parse_single_part(reader)
    };
    reader.leave();
    part
}

fn parse_multipart<S: TokenSource + ?Sized>(reader: &mut Reader<'_, S>) -> Result<BodyPart> {
    let mut parts = Vec::new();
    while reader.peek_token()? == Token::OpenParen {
        reader.read_token()?;
        parts.push(parse_body_part(reader)?);
    }

    let subtype = reader.read_string()?;
    let mut common = BodyPartCommon::new(ContentType::new("multipart", subtype));

    if !reader.at_close()? {
        common.content_type.parameters = parse_nil_or_parameters(reader)?;
    }
    parse_common_extensions(reader, &mut common)?;
    skip_extensions(reader)?;

    reader.expect(&Token::CloseParen, true)?;
    trace!(
        subtype = %common.content_type.sub_type,
        parts = parts.len(),
        "parsed multipart body"
    );

    Ok(BodyPart::Multipart { common, parts })
}

fn parse_single_part<S: TokenSource + ?Sized>(reader: &mut Reader<'_, S>) -> Result<BodyPart> {
    let content_type = parse_content_type(reader)?;
    let content_id = reader.read_nstring(false)?;
    let content_description = reader.read_nstring(true)?;
    let content_transfer_encoding = reader.read_string()?;
    let octets = reader.read_number()?;

    let mut fields = BasicFields {
        content_id,
        content_description,
        content_transfer_encoding,
        octets,
        content_md5: None,
    };
    let shape = if content_type.matches("message", "rfc822") {
        Shape::Message
    } else if content_type.matches("text", "*") {
        Shape::Text
    } else {
        Shape::Basic
    };
    let mut common = BodyPartCommon::new(content_type);

    // Some servers send the extension slots before the line count and the
    // nested message. Accept that layout as well as the RFC 3501 one.
    let extensions_first = match shape {
        Shape::Message => reader.peek_token()? != Token::OpenParen,
        Shape::Text => !matches!(reader.peek_token()?, Token::Atom(_)),
        Shape::Basic => false,
    };
    if extensions_first {
        debug!("extension slots precede type-specific fields");
        parse_single_extensions(reader, &mut fields, &mut common)?;
    }

    let mut part = match shape {
        Shape::Message => {
            let envelope = parse_envelope(reader)?;
            let body = parse_body_structure(reader)?;
            let lines = reader.read_number()?;
            BodyPart::Message {
                common,
                fields,
                envelope: Box::new(envelope),
                body: body.map(Box::new),
                lines,
            }
        }
        Shape::Text => {
            let lines = reader.read_number()?;
            BodyPart::Text {
                common,
                fields,
                lines,
            }
        }
        Shape::Basic => BodyPart::Basic { common, fields },
    };

    if !extensions_first {
        if let BodyPart::Basic { common, fields }
        | BodyPart::Text { common, fields, .. }
        | BodyPart::Message { common, fields, .. } = &mut part
        {
            parse_single_extensions(reader, fields, common)?;
        }
    }
    skip_extensions(reader)?;

    reader.expect(&Token::CloseParen, true)?;
    trace!(
        content_type = %part.content_type().main_type,
        subtype = %part.content_type().sub_type,
        octets,
        "parsed body part"
    );

    Ok(part)
}

/// Type-specific layout of a single part.
#[derive(Clone, Copy)]
enum Shape {
    Basic,
    Text,
    Message,
}

/// Reads the optional MD5, disposition, language and location slots of a
/// single part.
fn parse_single_extensions<S: TokenSource + ?Sized>(
    reader: &mut Reader<'_, S>,
    fields: &mut BasicFields,
    common: &mut BodyPartCommon,
) -> Result<()> {
    if !reader.at_close()? {
        fields.content_md5 = reader.read_nstring(false)?;
    }
    parse_common_extensions(reader, common)
}

/// Reads the optional disposition, language and location slots.
fn parse_common_extensions<S: TokenSource + ?Sized>(
    reader: &mut Reader<'_, S>,
    common: &mut BodyPartCommon,
) -> Result<()> {
    if !reader.at_close()? {
        common.content_disposition = parse_content_disposition(reader)?;
    }
    if !reader.at_close()? {
        common.content_language = parse_content_language(reader)?;
    }
    if !reader.at_close()? {
        common.content_location = reader.read_nstring(false)?;
    }
    Ok(())
}

/// Discards extension data up to the closing paren.
fn skip_extensions<S: TokenSource + ?Sized>(reader: &mut Reader<'_, S>) -> Result<()> {
    while !reader.at_close()? {
        debug!("skipping body extension data");
        skip_extension(reader)?;
    }
    Ok(())
}

/// Parses the body of a parameter list after its opening paren.
///
/// # Errors
///
/// Returns `Error::Syntax` if a name or value is not a string.
pub fn parse_parameter_list<S: TokenSource + ?Sized>(
    reader: &mut Reader<'_, S>,
) -> Result<Parameters> {
    let mut parameters = Parameters::new();
    while !reader.at_close()? {
        let name = reader.read_string()?;
        let value = reader.read_string()?;
        parameters.set(name, value);
    }
    reader.read_token()?;
    Ok(parameters)
}

fn parse_nil_or_parameters<S: TokenSource + ?Sized>(
    reader: &mut Reader<'_, S>,
) -> Result<Parameters> {
    match reader.read_token()? {
        Token::Nil => Ok(Parameters::new()),
        Token::OpenParen => parse_parameter_list(reader),
        token => Err(Error::syntax(token, false)),
    }
}

/// Parses `type subtype (params)`, where the parameter list may be `NIL`.
///
/// # Errors
///
/// Returns `Error::Syntax` on a malformed slot.
pub fn parse_content_type<S: TokenSource + ?Sized>(
    reader: &mut Reader<'_, S>,
) -> Result<ContentType> {
    let main_type = reader.read_string()?;
    let sub_type = reader.read_string()?;
    let mut content_type = ContentType::new(main_type, sub_type);
    content_type.parameters = parse_nil_or_parameters(reader)?;
    Ok(content_type)
}

/// Parses `NIL` or `("disposition" params)`.
///
/// # Errors
///
/// Returns `Error::Syntax` on a malformed slot.
pub fn parse_content_disposition<S: TokenSource + ?Sized>(
    reader: &mut Reader<'_, S>,
) -> Result<Option<ContentDisposition>> {
    match reader.read_token()? {
        Token::Nil => return Ok(None),
        Token::OpenParen => {}
        token => return Err(Error::syntax(token, false)),
    }

    let mut disposition = ContentDisposition::new(reader.read_string()?);
    disposition.parameters = parse_nil_or_parameters(reader)?;
    reader.expect(&Token::CloseParen, true)?;

    Ok(Some(disposition))
}

/// Parses `NIL`, a single language tag, or a list of tags.
///
/// # Errors
///
/// Returns `Error::Syntax` on a malformed slot.
pub fn parse_content_language<S: TokenSource + ?Sized>(
    reader: &mut Reader<'_, S>,
) -> Result<Option<Vec<String>>> {
    match reader.read_token()? {
        Token::Nil => Ok(None),
        Token::Atom(tag) | Token::QString(tag) => Ok(Some(vec![tag])),
        Token::Literal(_) => {
            let tag = reader.read_literal()?;
            Ok(Some(vec![tag.into_iter().map(char::from).collect()]))
        }
        Token::OpenParen => {
            let mut tags = Vec::new();
            while !reader.at_close()? {
                tags.push(reader.read_string()?);
            }
            reader.read_token()?;
            Ok(Some(tags))
        }
        token => Err(Error::syntax(token, false)),
    }
}

/// Discards one value of unknown shape: a list, string, literal, atom or
/// `NIL`.
///
/// # Errors
///
/// Returns `Error::Syntax` on any other token, or `Error::DepthExceeded`
/// for lists nested past the limit.
pub fn skip_extension<S: TokenSource + ?Sized>(reader: &mut Reader<'_, S>) -> Result<()> {
    match reader.read_token()? {
        Token::OpenParen => {
            reader.enter()?;
            let result = skip_list_items(reader);
            reader.leave();
            result
        }
        Token::Literal(_) => reader.read_literal().map(drop),
        Token::QString(_) | Token::Atom(_) | Token::Nil => Ok(()),
        token => Err(Error::syntax(token, false)),
    }
}

fn skip_list_items<S: TokenSource + ?Sized>(reader: &mut Reader<'_, S>) -> Result<()> {
    while !reader.at_close()? {
        skip_extension(reader)?;
    }
    reader.read_token()?;
    Ok(())
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
    use crate::config::ParserConfig;
    use crate::parser::Tokenizer;
    use crate::types::Envelope;
    use crate::Cancellation;

    fn parse(input: &str) -> Result<Option<BodyPart>> {
        let cancel = Cancellation::new();
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        let mut reader = Reader::new(&mut tokenizer, &cancel);
        parse_body_structure(&mut reader)
    }

    const TEXT_PLAIN: &str =
        r#"("TEXT" "PLAIN" ("CHARSET" "US-ASCII") NIL NIL "7BIT" 3028 NIL NIL NIL NIL 92)"#;

    const NESTED_MIXED: &str = concat!(
        r#"((("text" "plain" ("charset" "iso-8859-2") NIL NIL "quoted-printable" 28 NIL NIL NIL NIL 2)"#,
        r#"("text" "html" ("charset" "iso-8859-2") NIL NIL "quoted-printable" 1707 NIL NIL NIL NIL 65)"#,
        r#" "alternative" ("boundary" "----=_NextPart_001_0078_01CBB179.57530990") NIL NIL NIL)"#,
        r#"("message" "rfc822" NIL NIL NIL "7bit" 641"#,
        r#" ("Sat, 08 Jan 2011 14:16:36 +0100" "Subj 2" (("Some Name, SOMECOMPANY" NIL "recipient" "example.com"))"#,
        r#" (("Some Name, SOMECOMPANY" NIL "recipient" "example.com")) (("Some Name, SOMECOMPANY" NIL "recipient" "example.com"))"#,
        r#" (("Recipient" NIL "example" "gmail.com")) NIL NIL NIL NIL)"#,
        r#" ("text" "plain" ("charset" "iso-8859-2") NIL NIL "quoted-printable" 185 NIL NIL ("cs") NIL 18)"#,
        r#" 31 NIL ("attachment" NIL) NIL NIL)"#,
        r#"("message" "rfc822" NIL NIL NIL "7bit" 50592"#,
        r#" ("Sat, 08 Jan 2011 13:58:39 +0100" "Subj 1" (("Some Name, SOMECOMPANY" NIL "recipient" "example.com"))"#,
        r#" (("Some Name, SOMECOMPANY" NIL "recipient" "example.com")) (("Some Name, SOMECOMPANY" NIL "recipient" "example.com"))"#,
        r#" (("Recipient" NIL "example" "gmail.com")) NIL NIL NIL NIL)"#,
        r#" (("text" "plain" ("charset" "iso-8859-2") NIL NIL "quoted-printable" 4296 NIL NIL NIL NIL 345)"#,
        r#"("text" "html" ("charset" "iso-8859-2") NIL NIL "quoted-printable" 45069 NIL NIL NIL NIL 1295)"#,
        r#" "alternative" ("boundary" "----=_NextPart_000_0073_01CBB179.57530990") NIL ("cs") NIL)"#,
        r#" 1669 NIL ("attachment" NIL) NIL NIL)"#,
        r#" "mixed" ("boundary" "----=_NextPart_000_0077_01CBB179.57530990") NIL ("cs") NIL)"#,
    );

    mod single_part_tests {
        use super::*;

        #[test]
        fn test_text_plain() {
            let body = parse(TEXT_PLAIN).unwrap().unwrap();
            let BodyPart::Text {
                common,
                fields,
                lines,
            } = &body
            else {
                panic!("expected text part, got {body:?}");
            };

            assert!(common.content_type.matches("text", "plain"));
            assert_eq!(common.content_type.parameters.get("CHARSET"), Some("US-ASCII"));
            assert_eq!(fields.content_transfer_encoding, "7BIT");
            assert_eq!(fields.octets, 3028);
            assert_eq!(*lines, 92);
            assert_eq!(fields.content_md5, None);
            assert_eq!(common.content_disposition, None);
            assert_eq!(common.content_language, None);
            assert_eq!(common.content_location, None);
        }

        #[test]
        fn test_basic_part_without_extensions() {
            let body = parse(r#"("IMAGE" "PNG" NIL "<id@x>" "=?utf-8?q?logo?=" "BASE64" 1024)"#)
                .unwrap()
                .unwrap();
            let BodyPart::Basic { common, fields } = &body else {
                panic!("expected basic part, got {body:?}");
            };

            assert!(common.content_type.parameters.is_empty());
            assert_eq!(fields.content_id.as_deref(), Some("<id@x>"));
            assert_eq!(fields.content_description.as_deref(), Some("logo"));
            assert_eq!(fields.octets, 1024);
        }

        #[test]
        fn test_disposition_language_location() {
            let body = parse(concat!(
                r#"("APPLICATION" "PDF" ("NAME" "a.pdf") NIL NIL "BASE64" 10 "md5sum""#,
                r#" ("ATTACHMENT" ("FILENAME" "a.pdf")) "en" "http://x/a.pdf")"#
            ))
            .unwrap()
            .unwrap();

            assert!(body.is_attachment());
            let common = body.common();
            assert_eq!(
                common.content_disposition.as_ref().unwrap().filename(),
                Some("a.pdf")
            );
            assert_eq!(common.content_language, Some(vec!["en".to_string()]));
            assert_eq!(common.content_location.as_deref(), Some("http://x/a.pdf"));
            assert_eq!(body.fields().unwrap().content_md5.as_deref(), Some("md5sum"));
        }

        #[test]
        fn test_trailing_extensions_are_skipped() {
            let body = parse(concat!(
                r#"("TEXT" "PLAIN" NIL NIL NIL "7BIT" 1 1 NIL NIL NIL NIL"#,
                r#" (FUTURE ("nested" {3}"#,
                "\r\nabc) NIL) 42 \"tail\")"
            ))
            .unwrap()
            .unwrap();
            assert_eq!(body.lines(), Some(1));
        }

        #[test]
        fn test_extension_slots_before_lines() {
            let body = parse(concat!(
                r#"("TEXT" "HTML" NIL NIL NIL "8BIT" 90 "sum" ("INLINE" NIL) ("en" "de") NIL 3)"#
            ))
            .unwrap()
            .unwrap();
            assert_eq!(body.lines(), Some(3));
            assert_eq!(body.fields().unwrap().content_md5.as_deref(), Some("sum"));
            assert_eq!(
                body.common().content_language,
                Some(vec!["en".to_string(), "de".to_string()])
            );
            assert!(!body.is_attachment());
        }

        #[test]
        fn test_message_with_extension_slots_first() {
            let body = parse(concat!(
                r#"("MESSAGE" "RFC822" NIL NIL NIL "7BIT" 12 NIL ("ATTACHMENT" NIL) NIL NIL"#,
                r#" (NIL "inner" NIL NIL NIL NIL NIL NIL NIL NIL)"#,
                r#" ("TEXT" "PLAIN" NIL NIL NIL "7BIT" 2 1) 4)"#
            ))
            .unwrap()
            .unwrap();
            let BodyPart::Message {
                common,
                envelope,
                body: inner,
                lines,
                ..
            } = &body
            else {
                panic!("expected message part, got {body:?}");
            };
            assert!(common.content_disposition.is_some());
            assert_eq!(envelope.subject.as_deref(), Some("inner"));
            assert_eq!(inner.as_ref().unwrap().lines(), Some(1));
            assert_eq!(*lines, 4);
        }

        #[test]
        fn test_nil_body() {
            assert_eq!(parse("NIL").unwrap(), None);
        }

        #[test]
        fn test_parameter_last_write_wins() {
            let body = parse(r#"("TEXT" "PLAIN" ("A" "1" "B" "2" "A" "3") NIL NIL "7BIT" 1 1)"#)
                .unwrap()
                .unwrap();
            let params = &body.content_type().parameters;
            assert_eq!(params.len(), 2);
            assert_eq!(params.get("A"), Some("3"));
        }
    }

    mod multipart_tests {
        use super::*;

        #[test]
        fn test_nested_mixed() {
            let body = parse(NESTED_MIXED).unwrap().unwrap();
            assert!(matches!(body, BodyPart::Multipart { .. }));
            assert!(body.content_type().matches("multipart", "mixed"));
            assert_eq!(
                body.content_type().parameters.get("boundary"),
                Some("----=_NextPart_000_0077_01CBB179.57530990")
            );
            assert_eq!(body.common().content_language, Some(vec!["cs".to_string()]));

            let parts = body.parts();
            assert_eq!(parts.len(), 3);
            assert!(matches!(parts[0], BodyPart::Multipart { .. }));
            assert!(matches!(parts[1], BodyPart::Message { .. }));
            assert!(matches!(parts[2], BodyPart::Message { .. }));

            let BodyPart::Message {
                envelope,
                body: inner,
                lines,
                ..
            } = &parts[2]
            else {
                unreachable!();
            };
            assert_eq!(envelope.subject.as_deref(), Some("Subj 1"));
            assert_eq!(*lines, 1669);
            assert_eq!(inner.as_ref().unwrap().parts().len(), 2);
            assert!(parts[2].is_attachment());
        }

        #[test]
        fn test_multipart_without_extensions() {
            let body = parse(r#"(("TEXT" "PLAIN" NIL NIL NIL "7BIT" 1 1) "MIXED")"#)
                .unwrap()
                .unwrap();
            assert!(body.content_type().matches("multipart", "mixed"));
            assert!(body.content_type().parameters.is_empty());
            assert_eq!(body.parts().len(), 1);
        }

        #[test]
        fn test_message_without_body() {
            let body = parse(concat!(
                r#"("MESSAGE" "RFC822" NIL NIL NIL "7BIT" 0"#,
                r#" (NIL NIL NIL NIL NIL NIL NIL NIL NIL NIL) NIL 0)"#
            ))
            .unwrap()
            .unwrap();
            let BodyPart::Message { envelope, body, .. } = body else {
                panic!("expected message part");
            };
            assert_eq!(*envelope, Envelope::default());
            assert!(body.is_none());
        }

        #[test]
        fn test_encode_round_trip() {
            let body = parse(NESTED_MIXED).unwrap().unwrap();
            let reparsed = BodyPart::parse(&body.to_string()).unwrap();
            assert_eq!(reparsed, body);
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn test_bad_opening_token() {
            let err = parse("\"TEXT\"").unwrap_err();
            assert!(matches!(
                err,
                Error::Syntax {
                    token: Token::QString(_),
                    final_token: false
                }
            ));
        }

        #[test]
        fn test_truncated_body() {
            assert!(parse(r#"("TEXT" "PLAIN" NIL NIL NIL "7BIT""#).is_err());
        }

        #[test]
        fn test_bad_disposition() {
            let err = parse(r#"("TEXT" "PLAIN" NIL NIL NIL "7BIT" 1 1 NIL "inline")"#).unwrap_err();
            assert!(matches!(err, Error::Syntax { .. }));
        }

        #[test]
        fn test_non_numeric_octets() {
            let err = parse(r#"("TEXT" "PLAIN" NIL NIL NIL "7BIT" many 1)"#).unwrap_err();
            assert!(matches!(err, Error::Decode(_)));
        }

        #[test]
        fn test_depth_limit() {
            let mut input = String::new();
            for _ in 0..10 {
                input.push('(');
            }
            input.push_str(r#""TEXT" "PLAIN" NIL NIL NIL "7BIT" 1 1)"#);
            for _ in 0..9 {
                input.push_str(" \"MIXED\")");
            }

            let cancel = Cancellation::new();
            let config = ParserConfig::builder().max_depth(4).build();
            let mut tokenizer = Tokenizer::new(input.as_bytes());
            let mut reader = Reader::with_config(&mut tokenizer, &cancel, config);
            assert!(matches!(
                parse_body_structure(&mut reader),
                Err(Error::DepthExceeded(4))
            ));

            assert!(parse(&input).is_ok());
        }

        #[test]
        fn test_cancelled() {
            let cancel = Cancellation::new();
            cancel.cancel();
            let mut tokenizer = Tokenizer::new(TEXT_PLAIN.as_bytes());
            let mut reader = Reader::new(&mut tokenizer, &cancel);
            assert!(parse_body_structure(&mut reader).unwrap_err().is_cancelled());
        }
    }
}
