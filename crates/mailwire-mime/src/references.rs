//! RFC 5322 msg-id list parsing (References, In-Reply-To, Message-ID).

/// Enumerates the msg-ids in a header value, without their angle brackets.
///
/// Whitespace, commas and comments separate ids. A bare id that lacks
/// angle brackets is accepted as-is, since broken mailers emit those.
#[must_use]
pub fn enumerate_references(value: &str) -> Vec<String> {
    let bytes = value.as_bytes();
    let len = bytes.len();
    let mut out = Vec::new();
    let mut pos = 0;

    loop {
        skip_cfws(bytes, &mut pos);
        if pos >= len {
            break;
        }

        let id = if bytes[pos] == b'<' {
            pos += 1;
            let start = pos;
            while pos < len && bytes[pos] != b'>' {
                pos += 1;
            }
            let inner = &value[start..pos];
            // Skip '>'; an unterminated id runs to the end
            pos = (pos + 1).min(len);
            inner
        } else {
            let start = pos;
            while pos < len
                && !matches!(bytes[pos], b' ' | b'\t' | b'\r' | b'\n' | b',' | b'<' | b'(')
            {
                pos += 1;
            }
            &value[start..pos]
        };

        let id: String = id.chars().filter(|c| !c.is_whitespace()).collect();
        if !id.is_empty() {
            out.push(id);
        }
    }

    out
}

/// Returns the first msg-id in a header value.
#[must_use]
pub fn first_reference(value: &str) -> Option<String> {
    enumerate_references(value).into_iter().next()
}

fn skip_cfws(bytes: &[u8], pos: &mut usize) {
    let len = bytes.len();
    while *pos < len {
        match bytes[*pos] {
            b' ' | b'\t' | b'\r' | b'\n' | b',' => *pos += 1,
            b'(' => {
                *pos += 1;
                let mut depth = 1;
                while *pos < len && depth > 0 {
                    match bytes[*pos] {
                        b'(' => depth += 1,
                        b')' => depth -= 1,
                        b'\\' => *pos += 1,
                        _ => {}
                    }
                    *pos += 1;
                }
            }
            _ => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_id() {
        assert_eq!(
            enumerate_references("<B27397-0100000@cac.washington.edu>"),
            vec!["B27397-0100000@cac.washington.edu"]
        );
    }

    #[test]
    fn test_multiple_ids_with_comments() {
        let ids = enumerate_references("<a@x> (first reply)\r\n <b@y>,<c@z>");
        assert_eq!(ids, vec!["a@x", "b@y", "c@z"]);
    }

    #[test]
    fn test_bare_id() {
        assert_eq!(enumerate_references("abc@example.com"), vec!["abc@example.com"]);
    }

    #[test]
    fn test_empty_value() {
        assert!(enumerate_references("   ").is_empty());
        assert!(enumerate_references("<>").is_empty());
    }

    #[test]
    fn test_first_reference() {
        assert_eq!(first_reference("<a@x> <b@y>"), Some("a@x".to_string()));
        assert_eq!(first_reference(""), None);
    }

    #[test]
    fn test_unterminated_id() {
        assert_eq!(enumerate_references("<a@x"), vec!["a@x"]);
    }
}
