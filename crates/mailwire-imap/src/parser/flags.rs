//! FLAGS list grammar.

use tracing::trace;

use super::{Reader, Token, TokenSource};
use crate::types::MessageFlags;
use crate::{Error, Result};

/// Parses a parenthesized flag list such as `(\Seen \Flagged $Junk)`.
///
/// Keywords and unknown system flags carry no bit and are dropped.
///
/// # Errors
///
/// Returns `Error::Syntax` if the list is not opened by `(` or contains a
/// token that is neither a flag nor an atom.
pub fn parse_flags_list<S: TokenSource + ?Sized>(
    reader: &mut Reader<'_, S>,
) -> Result<MessageFlags> {
    reader.expect(&Token::OpenParen, false)?;

    let mut flags = MessageFlags::empty();
    loop {
        match reader.read_token()? {
            Token::CloseParen => break,
            Token::Flag(name) | Token::Atom(name) => match MessageFlags::from_wire(&name) {
                Some(flag) => flags |= flag,
                None => trace!(flag = %name, "ignoring keyword"),
            },
            token => return Err(Error::syntax(token, true)),
        }
    }

    Ok(flags)
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
    use crate::Cancellation;
    use crate::parser::Tokenizer;

    fn parse(input: &str) -> Result<MessageFlags> {
        let cancel = Cancellation::new();
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        let mut reader = Reader::new(&mut tokenizer, &cancel);
        parse_flags_list(&mut reader)
    }

    #[test]
    fn test_known_flags() {
        assert_eq!(
            parse("(\\Seen \\Flagged)").unwrap(),
            MessageFlags::SEEN | MessageFlags::FLAGGED
        );
        assert_eq!(parse("()").unwrap(), MessageFlags::empty());
    }

    #[test]
    fn test_keywords_ignored() {
        assert_eq!(
            parse("(\\Seen $Forwarded \\Flagged NonJunk \\Unknown)").unwrap(),
            MessageFlags::SEEN | MessageFlags::FLAGGED
        );
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(parse("(\\seen \\DELETED)").unwrap(), MessageFlags::empty());
    }

    #[test]
    fn test_permanent_flags_wildcard() {
        assert_eq!(
            parse("(\\Deleted \\*)").unwrap(),
            MessageFlags::DELETED | MessageFlags::USER_DEFINED
        );
    }

    #[test]
    fn test_bad_tokens() {
        assert!(matches!(
            parse("\\Seen"),
            Err(Error::Syntax {
                final_token: false,
                ..
            })
        ));
        assert!(matches!(
            parse("(\\Seen \"quoted\")"),
            Err(Error::Syntax {
                token: Token::QString(_),
                final_token: true
            })
        ));
        assert!(parse("(\\Seen").is_err());
    }
}
