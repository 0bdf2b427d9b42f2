//! Wire serialization helpers.

/// Writes an astring: a bare atom when possible, otherwise a quoted string,
/// or a literal when the text contains CR, LF or 8-bit bytes.
pub fn write_astring(buf: &mut Vec<u8>, s: &str) {
    if s.bytes().any(needs_literal) {
        write_literal(buf, s.as_bytes());
    } else if s.is_empty() || s.bytes().any(needs_quoting) {
        write_quoted(buf, s);
    } else {
        buf.extend_from_slice(s.as_bytes());
    }
}

/// Writes a quoted string, escaping `"` and `\`.
pub fn write_quoted(buf: &mut Vec<u8>, s: &str) {
    buf.push(b'"');
    for b in s.bytes() {
        if b == b'"' || b == b'\\' {
            buf.push(b'\\');
        }
        buf.push(b);
    }
    buf.push(b'"');
}

/// Writes a synchronizing literal.
pub fn write_literal(buf: &mut Vec<u8>, data: &[u8]) {
    buf.extend_from_slice(format!("{{{}}}\r\n", data.len()).as_bytes());
    buf.extend_from_slice(data);
}

/// Writes a string value as a quoted string, or a literal when it spans
/// lines. Unlike [`write_astring`], 8-bit text stays quoted as UTF-8.
pub fn write_string(buf: &mut Vec<u8>, s: &str) {
    if s.bytes().any(|b| b == b'\r' || b == b'\n') {
        write_literal(buf, s.as_bytes());
    } else {
        write_quoted(buf, s);
    }
}

/// Writes an nstring: `NIL` or a string value.
pub fn write_nstring(buf: &mut Vec<u8>, value: Option<&str>) {
    match value {
        Some(s) => write_string(buf, s),
        None => buf.extend_from_slice(b"NIL"),
    }
}

/// Returns true if the byte needs quoting.
const fn needs_quoting(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'"' | b'\\' | b'(' | b')' | b'{' | b'%' | b'*' | b'[' | b']'
    ) || b < 0x20
        || b == 0x7F
}

/// Returns true if the byte cannot appear in a quoted string.
const fn needs_literal(b: u8) -> bool {
    b == b'\r' || b == b'\n' || b >= 0x80
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

    fn astring(s: &str) -> String {
        let mut buf = Vec::new();
        write_astring(&mut buf, s);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_astring_forms() {
        assert_eq!(astring("INBOX"), "INBOX");
        assert_eq!(astring(""), "\"\"");
        assert_eq!(astring("My Folder"), "\"My Folder\"");
        assert_eq!(astring("a\"b"), "\"a\\\"b\"");
        assert_eq!(astring("x\r\ny"), "{4}\r\nx\r\ny");
        assert_eq!(astring("é"), "{2}\r\né");
    }

    #[test]
    fn test_nstring() {
        let mut buf = Vec::new();
        write_nstring(&mut buf, None);
        buf.push(b' ');
        write_nstring(&mut buf, Some("café"));
        buf.push(b' ');
        write_nstring(&mut buf, Some("NIL"));
        assert_eq!(String::from_utf8(buf).unwrap(), "NIL \"café\" \"NIL\"");
    }
}
