//! RFC 5322 date-time handling for header values.

use chrono::{DateTime, FixedOffset};

/// Parses an RFC 5322 `Date` header value.
///
/// Comments such as the trailing `(PDT)` many servers append are removed
/// first. Returns `None` when the remainder is not a valid date.
#[must_use]
pub fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let cleaned = strip_comments(value);
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    DateTime::parse_from_rfc2822(&cleaned).ok()
}

/// Formats a date the way it appears in a `Date` header.
#[must_use]
pub fn format_date(date: &DateTime<FixedOffset>) -> String {
    date.to_rfc2822()
}

fn strip_comments(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut depth = 0usize;
    let mut escaped = false;

    for c in value.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if depth > 0 => escaped = true,
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }

    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_trailing_comment() {
        let date = parse_date("Wed, 17 Jul 1996 02:23:25 -0700 (PDT)").unwrap();
        assert_eq!(format_date(&date), "Wed, 17 Jul 1996 02:23:25 -0700");
    }

    #[test]
    fn test_parse_without_weekday() {
        let date = parse_date("8 Jan 2011 14:16:36 +0100").unwrap();
        assert_eq!(date.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_date("not a date").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_strip_nested_comments() {
        assert_eq!(strip_comments("a (b (c) d) e"), "a  e");
    }
}
