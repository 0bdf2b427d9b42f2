//! In-memory IMAP tokenizer.
//!
//! Breaks a buffered server response into [`Token`]s for the grammar
//! readers. Whitespace is skipped, literal payloads are held back until
//! requested through [`TokenSource::read_literal`].

#![allow(clippy::missing_errors_doc)]

mod token;

pub use token::Token;

use crate::config::ParserConfig;
use crate::parser::TokenSource;
use crate::{Cancellation, Error, Result};

/// Turns 8-bit string bytes into text: UTF-8 when valid, otherwise one
/// character per byte.
#[must_use]
pub fn decode_8bit(bytes: Vec<u8>) -> String {
    // Servers are allowed to send 8-bit text, which is not always UTF-8
    String::from_utf8(bytes)
        .unwrap_or_else(|err| err.into_bytes().into_iter().map(char::from).collect())
}

/// Tokenizer over a byte buffer with one token of lookahead.
#[derive(Debug)]
pub struct Tokenizer<'a> {
    input: &'a [u8],
    pos: usize,
    peeked: Option<Token>,
    pending_literal: Option<usize>,
    max_literal_size: usize,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer with the default literal size limit.
    #[must_use]
    pub const fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, &ParserConfig::new())
    }

    /// Creates a tokenizer using the limits from `config`.
    #[must_use]
    pub const fn with_config(input: &'a [u8], config: &ParserConfig) -> Self {
        Self {
            input,
            pos: 0,
            peeked: None,
            pending_literal: None,
            max_literal_size: config.max_literal_size,
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.peek_byte()?;
        self.pos += 1;
        Some(byte)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_byte(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    /// Produces the next token from the raw input.
    fn lex(&mut self) -> Result<Token> {
        if let Some(size) = self.pending_literal.take() {
            self.pos = (self.pos + size).min(self.input.len());
        }

        self.skip_whitespace();

        let Some(byte) = self.peek_byte() else {
            return Ok(Token::Eof);
        };

        let token = match byte {
            b'\r' if self.peek_byte_at(1) == Some(b'\n') => {
                self.pos += 2;
                Token::Eoln
            }
            b'\n' => {
                self.pos += 1;
                Token::Eoln
            }
            b'(' => {
                self.pos += 1;
                Token::OpenParen
            }
            b')' => {
                self.pos += 1;
                Token::CloseParen
            }
            b'[' => {
                self.pos += 1;
                Token::OpenBracket
            }
            b']' => {
                self.pos += 1;
                Token::CloseBracket
            }
            b'*' => {
                self.pos += 1;
                Token::Asterisk
            }
            b'"' => self.read_quoted_string()?,
            b'{' => self.read_literal_prefix()?,
            b'\\' => self.read_flag(),
            _ if is_atom_char(byte) => self.read_atom(),
            _ => {
                self.pos += 1;
                Token::Error(char::from(byte).to_string())
            }
        };

        Ok(token)
    }

    /// Reads a quoted string token.
    fn read_quoted_string(&mut self) -> Result<Token> {
        self.advance(); // Skip opening quote

        let mut result = Vec::new();

        loop {
            match self.advance() {
                Some(b'"') => break,
                Some(b'\\') => match self.advance() {
                    Some(c @ (b'"' | b'\\')) => result.push(c),
                    Some(c) => {
                        return Err(self.error(&format!("invalid escape: \\{}", char::from(c))));
                    }
                    None => return Err(self.error("unexpected end of input in quoted string")),
                },
                Some(b'\r' | b'\n') | None => {
                    return Err(self.error("unterminated quoted string"));
                }
                Some(c) => result.push(c),
            }
        }

        Ok(Token::QString(decode_8bit(result)))
    }

    /// Reads a literal size prefix `{n}` or `{n+}` and the CRLF after it.
    fn read_literal_prefix(&mut self) -> Result<Token> {
        self.advance(); // Skip {

        let input = self.input;
        let start = self.pos;
        while matches!(self.peek_byte(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        let digits = &input[start..self.pos];

        if self.peek_byte() == Some(b'+') {
            self.pos += 1;
        }

        if digits.is_empty() || self.advance() != Some(b'}') {
            return Err(self.error("invalid literal size"));
        }

        let size = digits
            .iter()
            .try_fold(0usize, |acc, &d| {
                acc.checked_mul(10)?.checked_add(usize::from(d - b'0'))
            })
            .ok_or_else(|| self.error("literal size overflow"))?;

        if size > self.max_literal_size {
            return Err(self.error(&format!(
                "literal of {size} bytes exceeds limit of {}",
                self.max_literal_size
            )));
        }

        match (self.advance(), self.peek_byte()) {
            (Some(b'\r'), Some(b'\n')) => self.pos += 1,
            (Some(b'\n'), _) => {}
            _ => return Err(self.error("expected CRLF after literal size")),
        }

        if self.input.len() - self.pos < size {
            return Err(self.error("incomplete literal data"));
        }

        Ok(Token::Literal(size))
    }

    /// Reads a backslash flag such as `\Seen` or `\*`.
    fn read_flag(&mut self) -> Token {
        let start = self.pos;
        self.advance(); // Skip backslash

        if self.peek_byte() == Some(b'*') {
            self.pos += 1;
        } else {
            while self.peek_byte().is_some_and(is_atom_char) {
                self.pos += 1;
            }
        }

        let text = self.text(start);
        if text.len() == 1 {
            Token::Error(text)
        } else {
            Token::Flag(text)
        }
    }

    /// Reads an atom token, mapping `NIL` to [`Token::Nil`].
    fn read_atom(&mut self) -> Token {
        let start = self.pos;

        while self.peek_byte().is_some_and(is_atom_char) {
            self.pos += 1;
        }

        let text = self.text(start);
        if text.eq_ignore_ascii_case("NIL") {
            Token::Nil
        } else {
            Token::Atom(text)
        }
    }

    /// Returns the ASCII text between `start` and the current position.
    fn text(&self, start: usize) -> String {
        self.input[start..self.pos].iter().copied().map(char::from).collect()
    }

    fn error(&self, message: &str) -> Error {
        Error::Protocol(format!("{message} at byte {}", self.pos))
    }
}

impl TokenSource for Tokenizer<'_> {
    fn peek_token(&mut self, cancel: &Cancellation) -> Result<Token> {
        cancel.check()?;
        if let Some(token) = &self.peeked {
            return Ok(token.clone());
        }
        let token = self.lex()?;
        self.peeked = Some(token.clone());
        Ok(token)
    }

    fn read_token(&mut self, cancel: &Cancellation) -> Result<Token> {
        cancel.check()?;
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.lex()?,
        };
        if let Token::Literal(size) = token {
            self.pending_literal = Some(size);
        }
        Ok(token)
    }

    fn read_literal(&mut self, cancel: &Cancellation) -> Result<Vec<u8>> {
        cancel.check()?;
        if self.peeked.is_some() {
            return Err(self.error("literal payload requested after lookahead"));
        }
        let size = self
            .pending_literal
            .take()
            .ok_or_else(|| self.error("no literal pending"))?;
        let end = self.pos + size;
        let data = self.input[self.pos..end].to_vec();
        self.pos = end;
        Ok(data)
    }
}

/// Returns true if the byte may appear in an atom.
///
/// Excludes the atom-specials of RFC 3501 plus `[` and `]`, which are
/// tokens of their own here.
#[must_use]
pub const fn is_atom_char(b: u8) -> bool {
    matches!(b, 0x21..=0x7E)
        && !matches!(
            b,
            b'(' | b')' | b'{' | b'%' | b'*' | b'"' | b'\\' | b'[' | b']'
        )
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

    fn tokens(input: &[u8]) -> Vec<Token> {
        let cancel = Cancellation::new();
        let mut tokenizer = Tokenizer::new(input);
        let mut out = Vec::new();
        loop {
            let token = tokenizer.read_token(&cancel).unwrap();
            if token == Token::Eof {
                break;
            }
            out.push(token);
        }
        out
    }

    mod token_tests {
        use super::*;

        #[test]
        fn test_specials_and_atoms() {
            assert_eq!(
                tokens(b"* OK [UIDNEXT 4392] (FLAGS)\r\n"),
                vec![
                    Token::Asterisk,
                    Token::Atom("OK".to_string()),
                    Token::OpenBracket,
                    Token::Atom("UIDNEXT".to_string()),
                    Token::Atom("4392".to_string()),
                    Token::CloseBracket,
                    Token::OpenParen,
                    Token::Atom("FLAGS".to_string()),
                    Token::CloseParen,
                    Token::Eoln,
                ]
            );
        }

        #[test]
        fn test_nil_is_case_insensitive() {
            assert_eq!(tokens(b"NIL nil Nil"), vec![Token::Nil, Token::Nil, Token::Nil]);
            assert_eq!(tokens(b"NILS"), vec![Token::Atom("NILS".to_string())]);
        }

        #[test]
        fn test_flags() {
            assert_eq!(
                tokens(b"(\\Seen \\* $Forwarded)"),
                vec![
                    Token::OpenParen,
                    Token::Flag("\\Seen".to_string()),
                    Token::Flag("\\*".to_string()),
                    Token::Atom("$Forwarded".to_string()),
                    Token::CloseParen,
                ]
            );
        }

        #[test]
        fn test_lone_backslash_is_error() {
            assert_eq!(tokens(b"\\ "), vec![Token::Error("\\".to_string())]);
        }

        #[test]
        fn test_unknown_byte_is_error_token() {
            assert_eq!(tokens(b"\x01"), vec![Token::Error("\u{1}".to_string())]);
        }
    }

    mod quoted_tests {
        use super::*;

        #[test]
        fn test_quoted_escapes() {
            assert_eq!(
                tokens(br#""say \"hi\" \\ bye""#),
                vec![Token::QString(r#"say "hi" \ bye"#.to_string())]
            );
        }

        #[test]
        fn test_quoted_utf8() {
            assert_eq!(
                tokens("\"Gr\u{fc}\u{df}e\"".as_bytes()),
                vec![Token::QString("Grüße".to_string())]
            );
        }

        #[test]
        fn test_quoted_latin1_fallback() {
            assert_eq!(tokens(b"\"caf\xe9\""), vec![Token::QString("café".to_string())]);
        }

        #[test]
        fn test_quoted_invalid_escape() {
            let cancel = Cancellation::new();
            let mut tokenizer = Tokenizer::new(br#""a\nb""#);
            assert!(matches!(tokenizer.read_token(&cancel), Err(Error::Protocol(_))));
        }

        #[test]
        fn test_quoted_unterminated() {
            let cancel = Cancellation::new();
            let mut tokenizer = Tokenizer::new(b"\"abc");
            assert!(matches!(tokenizer.read_token(&cancel), Err(Error::Protocol(_))));
        }
    }

    mod literal_tests {
        use super::*;

        #[test]
        fn test_literal_payload() {
            let cancel = Cancellation::new();
            let mut tokenizer = Tokenizer::new(b"{5}\r\nhello )");
            assert_eq!(tokenizer.read_token(&cancel).unwrap(), Token::Literal(5));
            assert_eq!(tokenizer.read_literal(&cancel).unwrap(), b"hello");
            assert_eq!(tokenizer.read_token(&cancel).unwrap(), Token::CloseParen);
        }

        #[test]
        fn test_literal_plus() {
            let cancel = Cancellation::new();
            let mut tokenizer = Tokenizer::new(b"{3+}\r\nabc");
            assert_eq!(tokenizer.read_token(&cancel).unwrap(), Token::Literal(3));
            assert_eq!(tokenizer.read_literal(&cancel).unwrap(), b"abc");
        }

        #[test]
        fn test_unread_literal_is_skipped() {
            // The payload would otherwise lex as a close paren
            assert_eq!(
                tokens(b"{1}\r\n) NIL"),
                vec![Token::Literal(1), Token::Nil]
            );
        }

        #[test]
        fn test_literal_after_peek() {
            let cancel = Cancellation::new();
            let mut tokenizer = Tokenizer::new(b"{2}\r\nok");
            assert_eq!(tokenizer.peek_token(&cancel).unwrap(), Token::Literal(2));
            assert_eq!(tokenizer.read_token(&cancel).unwrap(), Token::Literal(2));
            assert_eq!(tokenizer.read_literal(&cancel).unwrap(), b"ok");
            assert_eq!(tokenizer.read_token(&cancel).unwrap(), Token::Eof);
        }

        #[test]
        fn test_incomplete_literal() {
            let cancel = Cancellation::new();
            let mut tokenizer = Tokenizer::new(b"{10}\r\nshort");
            assert!(matches!(tokenizer.read_token(&cancel), Err(Error::Protocol(_))));
        }

        #[test]
        fn test_literal_size_limit() {
            let cancel = Cancellation::new();
            let config = ParserConfig::builder().max_literal_size(4).build();
            let mut tokenizer = Tokenizer::with_config(b"{5}\r\nhello", &config);
            assert!(matches!(tokenizer.read_token(&cancel), Err(Error::Protocol(_))));
        }

        #[test]
        fn test_read_literal_without_literal() {
            let cancel = Cancellation::new();
            let mut tokenizer = Tokenizer::new(b"ATOM");
            tokenizer.read_token(&cancel).unwrap();
            assert!(matches!(tokenizer.read_literal(&cancel), Err(Error::Protocol(_))));
        }
    }

    mod cancel_tests {
        use super::*;

        #[test]
        fn test_cancelled_read() {
            let cancel = Cancellation::new();
            cancel.cancel();
            let mut tokenizer = Tokenizer::new(b"ATOM");
            assert!(matches!(tokenizer.read_token(&cancel), Err(Error::Cancelled)));
            assert!(matches!(tokenizer.peek_token(&cancel), Err(Error::Cancelled)));
        }
    }

    #[test]
    fn test_is_atom_char() {
        assert!(is_atom_char(b'a'));
        assert!(is_atom_char(b'$'));
        assert!(is_atom_char(b'/'));
        assert!(!is_atom_char(b' '));
        assert!(!is_atom_char(b'('));
        assert!(!is_atom_char(b'\\'));
        assert!(!is_atom_char(b']'));
        assert!(!is_atom_char(0x80));
    }
}
