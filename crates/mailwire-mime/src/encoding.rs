//! RFC 2047 encoded-word decoding.
//!
//! Header text reaches us as raw 8-bit bytes. Encoded words
//! (`=?charset?encoding?encoded-text?=`) are decoded through their declared
//! charset; everything else is read as UTF-8, falling back to Windows-1252
//! (a superset of Latin-1) when the bytes are not valid UTF-8.

use crate::error::{Error, Result};
use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use encoding_rs::{Encoding, WINDOWS_1252};

/// Base64 engine that accepts encoded words with or without padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decodes Base64 data, tolerating missing padding.
///
/// # Errors
///
/// Returns an error if the input is not valid Base64.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    LENIENT_BASE64.decode(data).map_err(Into::into)
}

/// Decodes the `Q` encoding of RFC 2047 §4.2.
///
/// # Errors
///
/// Returns an error if the input contains invalid escape sequences.
pub fn decode_q(text: &str) -> Result<Vec<u8>> {
    let mut result = Vec::with_capacity(text.len());
    let mut bytes = text.bytes();

    while let Some(b) = bytes.next() {
        match b {
            b'_' => result.push(b' '),
            b'=' => {
                let hex: Vec<u8> = bytes.by_ref().take(2).collect();
                if hex.len() != 2 {
                    return Err(Error::InvalidEncoding(
                        "Incomplete escape sequence".to_string(),
                    ));
                }
                let hex = std::str::from_utf8(&hex)
                    .map_err(|_| Error::InvalidEncoding("Invalid hex".to_string()))?;
                let byte = u8::from_str_radix(hex, 16)
                    .map_err(|e| Error::InvalidEncoding(format!("Invalid hex: {e}")))?;
                result.push(byte);
            }
            _ => result.push(b),
        }
    }

    Ok(result)
}

/// Converts bytes in the named charset to a string.
///
/// # Errors
///
/// Returns an error if the charset label is unknown.
pub fn decode_charset(bytes: &[u8], charset: &str) -> Result<String> {
    let encoding = Encoding::for_label(charset.trim().as_bytes())
        .ok_or_else(|| Error::UnknownCharset(charset.to_string()))?;
    let (text, _) = encoding.decode_without_bom_handling(bytes);
    Ok(text.into_owned())
}

/// Reads raw header bytes as UTF-8, or Windows-1252 when they are not UTF-8.
#[must_use]
pub fn decode_raw(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned(),
    }
}

/// Decodes a single RFC 2047 encoded word.
///
/// Format: `=?charset?encoding?encoded-text?=`. An RFC 2231 language suffix
/// on the charset (`utf-8*en`) is ignored.
///
/// # Errors
///
/// Returns an error if the input is not an encoded word, the encoding is
/// neither `B` nor `Q`, the payload is malformed, or the charset is unknown.
pub fn decode_encoded_word(word: &str) -> Result<String> {
    let inner = word
        .strip_prefix("=?")
        .and_then(|w| w.strip_suffix("?="))
        .ok_or_else(|| Error::InvalidEncoding("Not an encoded word".to_string()))?;

    let mut parts = inner.splitn(3, '?');
    let (Some(charset), Some(encoding), Some(encoded_text)) =
        (parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::InvalidEncoding(
            "Invalid RFC 2047 format".to_string(),
        ));
    };

    if charset.is_empty() || encoded_text.contains('?') {
        return Err(Error::InvalidEncoding(
            "Invalid RFC 2047 format".to_string(),
        ));
    }

    let charset = charset.split('*').next().unwrap_or(charset);

    let bytes = match encoding {
        "B" | "b" => decode_base64(encoded_text)?,
        "Q" | "q" => decode_q(encoded_text)?,
        _ => {
            return Err(Error::InvalidEncoding(format!(
                "Unknown encoding: {encoding}"
            )));
        }
    };

    decode_charset(&bytes, charset)
}

/// Decodes unstructured header text (Subject, Content-Description).
///
/// Linear whitespace between two adjacent encoded words is dropped; all
/// other whitespace is kept as received.
#[must_use]
pub fn decode_text(input: &[u8]) -> String {
    decode_words(input, false)
}

/// Decodes a phrase (the display-name part of an address).
///
/// Quoted strings are unquoted, whitespace runs collapse to a single space,
/// and the result is trimmed. Encoded words inside quoted strings are
/// decoded too, since many mailers emit them that way.
#[must_use]
pub fn decode_phrase(input: &[u8]) -> String {
    decode_words(input, true).trim().to_string()
}

enum Word<'a> {
    Space(&'a [u8]),
    Atom(&'a [u8]),
    Quoted(Vec<u8>),
}

const fn is_lwsp(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn split_words(input: &[u8], phrase: bool) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let start = pos;
        let b = input[pos];

        if is_lwsp(b) {
            while pos < input.len() && is_lwsp(input[pos]) {
                pos += 1;
            }
            words.push(Word::Space(&input[start..pos]));
        } else if phrase && b == b'"' {
            pos += 1;
            let mut content = Vec::new();
            while pos < input.len() && input[pos] != b'"' {
                if input[pos] == b'\\' && pos + 1 < input.len() {
                    pos += 1;
                }
                content.push(input[pos]);
                pos += 1;
            }
            // Skip the closing quote; an unterminated string runs to the end
            pos = (pos + 1).min(input.len());
            words.push(Word::Quoted(content));
        } else {
            while pos < input.len() && !is_lwsp(input[pos]) && !(phrase && input[pos] == b'"') {
                pos += 1;
            }
            words.push(Word::Atom(&input[start..pos]));
        }
    }

    words
}

fn decode_words(input: &[u8], phrase: bool) -> String {
    let mut out = String::with_capacity(input.len());
    let mut raw: Vec<u8> = Vec::new();
    let mut pending_space: Option<&[u8]> = None;
    let mut prev_encoded = false;

    for word in split_words(input, phrase) {
        match word {
            Word::Space(s) => pending_space = Some(if phrase { &b" "[..] } else { s }),
            Word::Atom(atom) => {
                let decoded = std::str::from_utf8(atom)
                    .ok()
                    .and_then(|w| decode_encoded_word(w).ok());

                match decoded {
                    Some(text) => {
                        if let Some(s) = pending_space.take()
                            && !prev_encoded
                        {
                            raw.extend_from_slice(s);
                        }
                        flush_raw(&mut out, &mut raw);
                        out.push_str(&text);
                        prev_encoded = true;
                    }
                    None => {
                        if let Some(s) = pending_space.take() {
                            raw.extend_from_slice(s);
                        }
                        raw.extend_from_slice(atom);
                        prev_encoded = false;
                    }
                }
            }
            Word::Quoted(content) => {
                if let Some(s) = pending_space.take() {
                    raw.extend_from_slice(s);
                }
                flush_raw(&mut out, &mut raw);
                out.push_str(&decode_words(&content, false));
                prev_encoded = false;
            }
        }
    }

    if let Some(s) = pending_space {
        raw.extend_from_slice(s);
    }
    flush_raw(&mut out, &mut raw);

    out
}

fn flush_raw(out: &mut String, raw: &mut Vec<u8>) {
    if !raw.is_empty() {
        out.push_str(&decode_raw(raw));
        raw.clear();
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
    fn test_plain_text_unchanged() {
        assert_eq!(decode_text(b"IMAP4rev1 WG mtg summary"), "IMAP4rev1 WG mtg summary");
    }

    #[test]
    fn test_rfc2047_base64_word() {
        assert_eq!(decode_encoded_word("=?utf-8?B?SMOpbGxv?=").unwrap(), "Héllo");
        assert_eq!(decode_text(b"=?utf-8?B?SMOpbGxv?="), "Héllo");
    }

    #[test]
    fn test_rfc2047_quoted_printable_word() {
        assert_eq!(decode_text(b"=?utf-8?Q?H=C3=A9llo_there?="), "Héllo there");
    }

    #[test]
    fn test_rfc2047_latin1_charset() {
        assert_eq!(decode_text(b"=?ISO-8859-1?Q?Andr=E9?= Pirard"), "André Pirard");
    }

    #[test]
    fn test_whitespace_between_encoded_words_dropped() {
        assert_eq!(decode_text(b"=?utf-8?Q?a?= =?utf-8?Q?b?="), "ab");
        assert_eq!(decode_text(b"=?utf-8?Q?a?=  b"), "a  b");
    }

    #[test]
    fn test_text_keeps_whitespace_runs() {
        assert_eq!(decode_text(b"a  b\tc"), "a  b\tc");
    }

    #[test]
    fn test_unknown_charset_left_raw() {
        assert!(matches!(
            decode_encoded_word("=?x-nope?Q?abc?="),
            Err(Error::UnknownCharset(_))
        ));
        assert_eq!(decode_text(b"=?x-nope?Q?abc?="), "=?x-nope?Q?abc?=");
    }

    #[test]
    fn test_bad_encoding_rejected() {
        assert!(decode_encoded_word("=?utf-8?X?abc?=").is_err());
        assert!(decode_encoded_word("plain").is_err());
        assert!(decode_q("abc=4").is_err());
    }

    #[test]
    fn test_raw_8bit_falls_back_to_windows_1252() {
        assert_eq!(decode_raw(b"caf\xe9"), "café");
        assert_eq!(decode_raw("café".as_bytes()), "café");
    }

    #[test]
    fn test_phrase_unquotes_and_collapses() {
        assert_eq!(decode_phrase(b"\"Doe, John\"   Q."), "Doe, John Q.");
        assert_eq!(decode_phrase(b"  Terry Gray "), "Terry Gray");
    }

    #[test]
    fn test_phrase_decodes_words_inside_quotes() {
        assert_eq!(decode_phrase(b"\"=?utf-8?Q?J=C3=B6rg?=\""), "Jörg");
    }

    #[test]
    fn test_base64_without_padding() {
        assert_eq!(decode_base64("SGk").unwrap(), b"Hi");
    }
}
