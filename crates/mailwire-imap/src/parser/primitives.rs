//! Scalar readers: string, nstring and number slots.
//!
//! Literal payloads are read like quoted strings: UTF-8 when valid,
//! otherwise one character per byte. Readers that word-decode work on the
//! raw bytes.

use mailwire_mime::encoding::decode_text;

use crate::parser::lexer::decode_8bit;
use crate::parser::{Reader, Token, TokenSource};
use crate::{Error, Result};

impl<S: TokenSource + ?Sized> Reader<'_, S> {
    /// Reads an atom, quoted string or literal.
    ///
    /// # Errors
    ///
    /// Returns `Error::Syntax` for any other token.
    pub fn read_string(&mut self) -> Result<String> {
        match self.read_token()? {
            Token::Atom(s) | Token::QString(s) => Ok(s),
            Token::Literal(_) => Ok(decode_8bit(self.read_literal()?)),
            token => Err(Error::syntax(token, false)),
        }
    }

    /// Reads a string slot as raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `Error::Syntax` for any token other than a string.
    pub fn read_string_bytes(&mut self) -> Result<Vec<u8>> {
        match self.read_token()? {
            Token::Atom(s) | Token::QString(s) => Ok(s.into_bytes()),
            Token::Literal(_) => self.read_literal(),
            token => Err(Error::syntax(token, false)),
        }
    }

    /// Reads a string slot as raw bytes, or `None` for NIL.
    ///
    /// # Errors
    ///
    /// Returns `Error::Syntax` for any token other than a string or NIL.
    pub fn read_nstring_bytes(&mut self) -> Result<Option<Vec<u8>>> {
        if self.peek_token()? == Token::Nil {
            self.read_token()?;
            return Ok(None);
        }
        self.read_string_bytes().map(Some)
    }

    /// Reads a string slot, or `None` for NIL.
    ///
    /// When `rfc2047` is set the value is word-decoded into readable text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Syntax` for any token other than a string or NIL.
    pub fn read_nstring(&mut self, rfc2047: bool) -> Result<Option<String>> {
        if rfc2047 {
            return Ok(self.read_nstring_bytes()?.map(|raw| decode_text(&raw)));
        }
        match self.read_token()? {
            Token::Nil => Ok(None),
            Token::Atom(s) | Token::QString(s) => Ok(Some(s)),
            Token::Literal(_) => Ok(Some(decode_8bit(self.read_literal()?))),
            token => Err(Error::syntax(token, false)),
        }
    }

    /// Reads a non-negative number.
    ///
    /// # Errors
    ///
    /// Returns `Error::Syntax` if the token is not an atom, or
    /// `Error::Decode` if the atom is not a 32-bit unsigned number.
    pub fn read_number(&mut self) -> Result<u32> {
        match self.read_token()? {
            Token::Atom(s) => s
                .parse()
                .map_err(|_| Error::Decode(format!("invalid number: {s}"))),
            token => Err(Error::syntax(token, false)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::parser::{Reader, Token, Tokenizer};
    use crate::{Cancellation, Error};

    fn with_reader<T>(input: &[u8], f: impl FnOnce(&mut Reader<'_, Tokenizer<'_>>) -> T) -> T {
        let cancel = Cancellation::new();
        let mut tokenizer = Tokenizer::new(input);
        let mut reader = Reader::new(&mut tokenizer, &cancel);
        f(&mut reader)
    }

    #[test]
    fn test_read_string_kinds() {
        with_reader(b"ATOM \"quoted\" {3}\r\nlit", |r| {
            assert_eq!(r.read_string().unwrap(), "ATOM");
            assert_eq!(r.read_string().unwrap(), "quoted");
            assert_eq!(r.read_string().unwrap(), "lit");
        });
    }

    #[test]
    fn test_read_string_literal_is_latin1() {
        with_reader(b"{4}\r\ncaf\xe9", |r| {
            assert_eq!(r.read_string().unwrap(), "café");
        });
    }

    #[test]
    fn test_read_string_literal_utf8() {
        with_reader("{7}\r\näb\r\nc  NIL".as_bytes(), |r| {
            assert_eq!(r.read_string().unwrap(), "äb\r\nc ");
        });
        with_reader("{6}\r\n日\r\nx\r\n".as_bytes(), |r| {
            assert_eq!(r.read_nstring(false).unwrap(), Some("日\r\nx".to_string()));
        });
    }

    #[test]
    fn test_read_string_rejects_paren() {
        with_reader(b"(", |r| {
            let err = r.read_string().unwrap_err();
            assert!(matches!(
                err,
                Error::Syntax {
                    token: Token::OpenParen,
                    final_token: false
                }
            ));
        });
    }

    #[test]
    fn test_read_nstring() {
        with_reader(b"NIL \"x\"", |r| {
            assert_eq!(r.read_nstring(false).unwrap(), None);
            assert_eq!(r.read_nstring(false).unwrap(), Some("x".to_string()));
        });
    }

    #[test]
    fn test_read_nstring_decodes_words() {
        with_reader(b"\"=?iso-8859-1?q?caf=E9?=\" NIL", |r| {
            assert_eq!(r.read_nstring(true).unwrap(), Some("café".to_string()));
            assert_eq!(r.read_nstring(true).unwrap(), None);
        });
    }

    #[test]
    fn test_read_nstring_decodes_utf8_literal() {
        with_reader("{7}\r\nGrüße".as_bytes(), |r| {
            assert_eq!(r.read_nstring(true).unwrap(), Some("Grüße".to_string()));
        });
    }

    #[test]
    fn test_read_number() {
        with_reader(b"3028 abc (", |r| {
            assert_eq!(r.read_number().unwrap(), 3028);
            assert!(matches!(r.read_number(), Err(Error::Decode(_))));
            assert!(matches!(r.read_number(), Err(Error::Syntax { .. })));
        });
    }
}
