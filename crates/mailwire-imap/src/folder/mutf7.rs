//! IMAP modified UTF-7 mailbox names (RFC 3501 §5.1.3).

use base64::alphabet;
use base64::engine::{DecodePaddingMode, Engine, GeneralPurpose, GeneralPurposeConfig};

const MUTF7: GeneralPurpose = GeneralPurpose::new(
    &alphabet::IMAP_MUTF7,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decodes a wire mailbox name to UTF-8.
///
/// Decoding is permissive: a shift sequence that is unterminated or not
/// valid base64 is kept verbatim.
#[must_use]
pub fn decode_folder_name(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len());
    let mut rest = encoded;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let shifted = &rest[start + 1..];

        let Some(end) = shifted.find('-') else {
            out.push_str(&rest[start..]);
            return out;
        };

        if end == 0 {
            out.push('&');
        } else {
            match decode_utf16(&shifted[..end]) {
                Some(text) => out.push_str(&text),
                None => out.push_str(&rest[start..=start + end + 1]),
            }
        }
        rest = &shifted[end + 1..];
    }

    out.push_str(rest);
    out
}

fn decode_utf16(chunk: &str) -> Option<String> {
    let bytes = MUTF7.decode(chunk).ok()?;
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// Encodes a UTF-8 mailbox name for the wire.
#[must_use]
pub fn encode_folder_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending: Vec<u16> = Vec::new();

    for c in name.chars() {
        if (' '..='~').contains(&c) {
            flush(&mut out, &mut pending);
            if c == '&' {
                out.push_str("&-");
            } else {
                out.push(c);
            }
        } else {
            let mut units = [0u16; 2];
            pending.extend_from_slice(c.encode_utf16(&mut units));
        }
    }
    flush(&mut out, &mut pending);

    out
}

fn flush(out: &mut String, pending: &mut Vec<u16>) {
    if pending.is_empty() {
        return;
    }
    let bytes: Vec<u8> = pending.iter().flat_map(|unit| unit.to_be_bytes()).collect();
    out.push('&');
    out.push_str(&MUTF7.encode(bytes));
    out.push('-');
    pending.clear();
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
    fn test_rfc3501_example() {
        let encoded = "~peter/mail/&U,BTFw-/&ZeVnLIqe-";
        let decoded = "~peter/mail/台北/日本語";
        assert_eq!(decode_folder_name(encoded), decoded);
        assert_eq!(encode_folder_name(decoded), encoded);
    }

    #[test]
    fn test_ampersand() {
        assert_eq!(decode_folder_name("Lost &- Found"), "Lost & Found");
        assert_eq!(encode_folder_name("Lost & Found"), "Lost &- Found");
    }

    #[test]
    fn test_plain_ascii_unchanged() {
        assert_eq!(decode_folder_name("INBOX/Sent Items"), "INBOX/Sent Items");
        assert_eq!(encode_folder_name("INBOX/Sent Items"), "INBOX/Sent Items");
    }

    #[test]
    fn test_astral_plane() {
        let name = "Fun 🎉";
        let encoded = encode_folder_name(name);
        assert!(encoded.is_ascii());
        assert_eq!(decode_folder_name(&encoded), name);
    }

    #[test]
    fn test_malformed_kept_verbatim() {
        assert_eq!(decode_folder_name("a&b"), "a&b");
        assert_eq!(decode_folder_name("a&!!-b"), "a&!!-b");
    }
}
