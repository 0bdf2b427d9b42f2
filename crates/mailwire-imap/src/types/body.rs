//! BODYSTRUCTURE values.

use std::fmt;

use mailwire_mime::{ContentDisposition, ContentType, Parameters};

use super::Envelope;
use crate::command::serialize::{write_nstring, write_quoted, write_string};
use crate::parser::{Reader, Tokenizer, parse_body_structure};
use crate::{Cancellation, Error, Result};

/// Metadata every body part carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyPartCommon {
    /// Content type with parameters.
    pub content_type: ContentType,
    /// Content disposition, if sent.
    pub content_disposition: Option<ContentDisposition>,
    /// Language tags, if sent.
    pub content_language: Option<Vec<String>>,
    /// Content location URI, if sent.
    pub content_location: Option<String>,
}

impl BodyPartCommon {
    /// Creates metadata with only a content type.
    #[must_use]
    pub const fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            content_disposition: None,
            content_language: None,
            content_location: None,
        }
    }
}

/// Fields shared by all non-multipart parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicFields {
    /// Content-ID.
    pub content_id: Option<String>,
    /// Word-decoded Content-Description.
    pub content_description: Option<String>,
    /// Content-Transfer-Encoding.
    pub content_transfer_encoding: String,
    /// Size of the encoded body in octets.
    pub octets: u32,
    /// Content-MD5, only present in the extended form.
    pub content_md5: Option<String>,
}

/// One node of a message's MIME structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyPart {
    /// Any single part that is neither text nor an attached message.
    Basic {
        /// Shared metadata.
        common: BodyPartCommon,
        /// Single-part fields.
        fields: BasicFields,
    },
    /// A `text/*` part.
    Text {
        /// Shared metadata.
        common: BodyPartCommon,
        /// Single-part fields.
        fields: BasicFields,
        /// Line count.
        lines: u32,
    },
    /// A `message/rfc822` part.
    Message {
        /// Shared metadata.
        common: BodyPartCommon,
        /// Single-part fields.
        fields: BasicFields,
        /// Envelope of the attached message.
        envelope: Box<Envelope>,
        /// Structure of the attached message, if it has a body.
        body: Option<Box<BodyPart>>,
        /// Line count.
        lines: u32,
    },
    /// A `multipart/*` container.
    Multipart {
        /// Shared metadata; the content type is `multipart/<subtype>`.
        common: BodyPartCommon,
        /// Child parts in order.
        parts: Vec<BodyPart>,
    },
}

impl BodyPart {
    /// Parses a body structure from its parenthesized wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is malformed, or `Error::Decode` if it
    /// is `NIL`.
    pub fn parse(text: &str) -> Result<Self> {
        let cancel = Cancellation::new();
        let mut tokenizer = Tokenizer::new(text.as_bytes());
        let mut reader = Reader::new(&mut tokenizer, &cancel);
        parse_body_structure(&mut reader)?
            .ok_or_else(|| Error::Decode("empty body structure".to_string()))
    }

    /// Returns the shared metadata.
    #[must_use]
    pub const fn common(&self) -> &BodyPartCommon {
        match self {
            Self::Basic { common, .. }
            | Self::Text { common, .. }
            | Self::Message { common, .. }
            | Self::Multipart { common, .. } => common,
        }
    }

    /// Returns the content type.
    #[must_use]
    pub const fn content_type(&self) -> &ContentType {
        &self.common().content_type
    }

    /// Returns the single-part fields, `None` for multiparts.
    #[must_use]
    pub const fn fields(&self) -> Option<&BasicFields> {
        match self {
            Self::Basic { fields, .. }
            | Self::Text { fields, .. }
            | Self::Message { fields, .. } => Some(fields),
            Self::Multipart { .. } => None,
        }
    }

    /// Returns the line count of text and message parts.
    #[must_use]
    pub const fn lines(&self) -> Option<u32> {
        match self {
            Self::Text { lines, .. } | Self::Message { lines, .. } => Some(*lines),
            Self::Basic { .. } | Self::Multipart { .. } => None,
        }
    }

    /// Returns the children of a multipart, empty otherwise.
    #[must_use]
    pub fn parts(&self) -> &[Self] {
        match self {
            Self::Multipart { parts, .. } => parts,
            _ => &[],
        }
    }

    /// Returns true if the part is marked as an attachment.
    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.common()
            .content_disposition
            .as_ref()
            .is_some_and(ContentDisposition::is_attachment)
    }

    /// Appends the parenthesized wire form to `buf`.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(b'(');
        match self {
            Self::Multipart { common, parts } => {
                for part in parts {
                    part.encode(buf);
                }
                buf.push(b' ');
                write_quoted(buf, &common.content_type.sub_type);
                buf.push(b' ');
                encode_parameters(buf, &common.content_type.parameters);
                encode_extensions(buf, common, None);
            }
            Self::Basic { common, fields } => {
                encode_single(buf, common, fields);
                encode_extensions(buf, common, Some(fields));
            }
            Self::Text {
                common,
                fields,
                lines,
            } => {
                encode_single(buf, common, fields);
                buf.extend_from_slice(format!(" {lines}").as_bytes());
                encode_extensions(buf, common, Some(fields));
            }
            Self::Message {
                common,
                fields,
                envelope,
                body,
                lines,
            } => {
                encode_single(buf, common, fields);
                buf.push(b' ');
                envelope.encode(buf);
                buf.push(b' ');
                match body {
                    Some(body) => body.encode(buf),
                    None => buf.extend_from_slice(b"NIL"),
                }
                buf.extend_from_slice(format!(" {lines}").as_bytes());
                encode_extensions(buf, common, Some(fields));
            }
        }
        buf.push(b')');
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}

fn encode_single(buf: &mut Vec<u8>, common: &BodyPartCommon, fields: &BasicFields) {
    let content_type = &common.content_type;
    write_quoted(buf, &content_type.main_type);
    buf.push(b' ');
    write_quoted(buf, &content_type.sub_type);
    buf.push(b' ');
    encode_parameters(buf, &content_type.parameters);
    buf.push(b' ');
    write_nstring(buf, fields.content_id.as_deref());
    buf.push(b' ');
    write_nstring(buf, fields.content_description.as_deref());
    buf.push(b' ');
    write_string(buf, &fields.content_transfer_encoding);
    buf.extend_from_slice(format!(" {}", fields.octets).as_bytes());
}

fn encode_extensions(buf: &mut Vec<u8>, common: &BodyPartCommon, fields: Option<&BasicFields>) {
    if let Some(fields) = fields {
        buf.push(b' ');
        write_nstring(buf, fields.content_md5.as_deref());
    }

    buf.push(b' ');
    match &common.content_disposition {
        Some(disposition) => {
            buf.push(b'(');
            write_string(buf, &disposition.disposition);
            buf.push(b' ');
            encode_parameters(buf, &disposition.parameters);
            buf.push(b')');
        }
        None => buf.extend_from_slice(b"NIL"),
    }

    buf.push(b' ');
    match &common.content_language {
        Some(languages) => {
            buf.push(b'(');
            for (i, language) in languages.iter().enumerate() {
                if i > 0 {
                    buf.push(b' ');
                }
                write_string(buf, language);
            }
            buf.push(b')');
        }
        None => buf.extend_from_slice(b"NIL"),
    }

    buf.push(b' ');
    write_nstring(buf, common.content_location.as_deref());
}

fn encode_parameters(buf: &mut Vec<u8>, parameters: &Parameters) {
    if parameters.is_empty() {
        buf.extend_from_slice(b"NIL");
        return;
    }
    buf.push(b'(');
    for (i, (name, value)) in parameters.iter().enumerate() {
        if i > 0 {
            buf.push(b' ');
        }
        write_string(buf, name);
        buf.push(b' ');
        write_string(buf, value);
    }
    buf.push(b')');
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

    fn text_part() -> BodyPart {
        BodyPart::Text {
            common: BodyPartCommon::new(
                ContentType::new("TEXT", "PLAIN").with_parameter("CHARSET", "US-ASCII"),
            ),
            fields: BasicFields {
                content_transfer_encoding: "7BIT".to_string(),
                octets: 3028,
                ..BasicFields::default()
            },
            lines: 92,
        }
    }

    #[test]
    fn test_encode_text_part() {
        assert_eq!(
            text_part().to_string(),
            "(\"TEXT\" \"PLAIN\" (\"CHARSET\" \"US-ASCII\") NIL NIL \"7BIT\" 3028 92 NIL NIL NIL NIL)"
        );
    }

    #[test]
    fn test_encode_multipart() {
        let mut common = BodyPartCommon::new(
            ContentType::new("multipart", "mixed").with_parameter("boundary", "xyz"),
        );
        common.content_language = Some(vec!["en".to_string(), "cs".to_string()]);
        let multipart = BodyPart::Multipart {
            common,
            parts: vec![text_part()],
        };
        assert_eq!(
            multipart.to_string(),
            "((\"TEXT\" \"PLAIN\" (\"CHARSET\" \"US-ASCII\") NIL NIL \"7BIT\" 3028 92 NIL NIL NIL NIL) \
             \"mixed\" (\"boundary\" \"xyz\") NIL (\"en\" \"cs\") NIL)"
        );
    }

    #[test]
    fn test_accessors() {
        let part = text_part();
        assert!(part.content_type().matches("text", "plain"));
        assert_eq!(part.lines(), Some(92));
        assert_eq!(part.fields().unwrap().octets, 3028);
        assert!(part.parts().is_empty());
        assert!(!part.is_attachment());
    }

    #[test]
    fn test_is_attachment() {
        let mut common = BodyPartCommon::new(ContentType::new("application", "pdf"));
        let mut disposition = ContentDisposition::new("ATTACHMENT");
        disposition.parameters.set("filename", "a.pdf");
        common.content_disposition = Some(disposition);
        let part = BodyPart::Basic {
            common,
            fields: BasicFields::default(),
        };
        assert!(part.is_attachment());
    }

    #[test]
    fn test_multiline_8bit_fields_survive_text_form() {
        let text = "(\"TEXT\" \"PLAIN\" NIL {7}\r\näb\r\nc  NIL \"7BIT\" 1 1)";
        let part = BodyPart::parse(text).unwrap();
        assert_eq!(part.fields().unwrap().content_id.as_deref(), Some("äb\r\nc "));

        let mut part = text_part();
        if let BodyPart::Text { common, fields, .. } = &mut part {
            fields.content_id = Some("日本\r\n<id>".to_string());
            common.content_location = Some("ü\nx".to_string());
        }
        let reparsed = BodyPart::parse(&part.to_string()).unwrap();
        assert_eq!(reparsed, part);
    }

    #[test]
    fn test_parse_nil_is_error() {
        assert!(matches!(BodyPart::parse("NIL"), Err(Error::Decode(_))));
    }
}
