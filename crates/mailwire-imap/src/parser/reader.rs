//! Token source capability and the grammar reader built on it.

use crate::config::ParserConfig;
use crate::parser::Token;
use crate::{Cancellation, Error, Result};

/// Supplies tokens to the grammar readers.
///
/// Implementations fail with [`Error::Protocol`] on malformed input and with
/// [`Error::Cancelled`] once `cancel` has been triggered.
pub trait TokenSource {
    /// Returns the next token without consuming it.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed input or cancellation.
    fn peek_token(&mut self, cancel: &Cancellation) -> Result<Token>;

    /// Consumes and returns the next token.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed input or cancellation.
    fn read_token(&mut self, cancel: &Cancellation) -> Result<Token>;

    /// Returns the payload of the literal token just consumed.
    ///
    /// # Errors
    ///
    /// Returns an error if no literal is pending, on truncated input, or on
    /// cancellation.
    fn read_literal(&mut self, cancel: &Cancellation) -> Result<Vec<u8>>;
}

/// Grammar reader over a token source.
///
/// Checks cancellation before every token and bounds recursion depth.
pub struct Reader<'a, S: TokenSource + ?Sized> {
    source: &'a mut S,
    cancel: &'a Cancellation,
    config: ParserConfig,
    depth: usize,
}

impl<'a, S: TokenSource + ?Sized> Reader<'a, S> {
    /// Creates a reader with the default configuration.
    pub fn new(source: &'a mut S, cancel: &'a Cancellation) -> Self {
        Self::with_config(source, cancel, ParserConfig::default())
    }

    /// Creates a reader with the given configuration.
    pub const fn with_config(
        source: &'a mut S,
        cancel: &'a Cancellation,
        config: ParserConfig,
    ) -> Self {
        Self {
            source,
            cancel,
            config,
            depth: 0,
        }
    }

    /// Returns the current nesting depth.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Peeks at the next token.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed input or cancellation.
    pub fn peek_token(&mut self) -> Result<Token> {
        self.cancel.check()?;
        self.source.peek_token(self.cancel)
    }

    /// Consumes the next token.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed input or cancellation.
    pub fn read_token(&mut self) -> Result<Token> {
        self.cancel.check()?;
        self.source.read_token(self.cancel)
    }

    /// Fetches the payload of the literal just read.
    ///
    /// # Errors
    ///
    /// Returns an error if no literal is pending or on cancellation.
    pub fn read_literal(&mut self) -> Result<Vec<u8>> {
        self.cancel.check()?;
        self.source.read_literal(self.cancel)
    }

    /// Consumes the next token and fails unless it equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Syntax` carrying the actual token on mismatch.
    pub fn expect(&mut self, expected: &Token, final_token: bool) -> Result<()> {
        let token = self.read_token()?;
        if &token == expected {
            Ok(())
        } else {
            Err(Error::syntax(token, final_token))
        }
    }

    /// Returns true if the next token closes the current list.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed input or cancellation.
    pub fn at_close(&mut self) -> Result<bool> {
        Ok(self.peek_token()? == Token::CloseParen)
    }

    /// Enters one nesting level.
    ///
    /// # Errors
    ///
    /// Returns `Error::DepthExceeded` past the configured maximum.
    pub fn enter(&mut self) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(Error::DepthExceeded(self.config.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    /// Leaves one nesting level.
    pub const fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::parser::Tokenizer;

    #[test]
    fn test_expect() {
        let cancel = Cancellation::new();
        let mut tokenizer = Tokenizer::new(b"( )");
        let mut reader = Reader::new(&mut tokenizer, &cancel);

        reader.expect(&Token::OpenParen, false).unwrap();
        let err = reader.expect(&Token::OpenParen, true).unwrap_err();
        assert!(matches!(
            err,
            Error::Syntax {
                token: Token::CloseParen,
                final_token: true
            }
        ));
    }

    #[test]
    fn test_depth_limit() {
        let cancel = Cancellation::new();
        let mut tokenizer = Tokenizer::new(b"");
        let config = ParserConfig::builder().max_depth(2).build();
        let mut reader = Reader::with_config(&mut tokenizer, &cancel, config);

        reader.enter().unwrap();
        reader.enter().unwrap();
        assert!(matches!(reader.enter(), Err(Error::DepthExceeded(2))));
        reader.leave();
        assert_eq!(reader.depth(), 1);
        reader.enter().unwrap();
    }

    #[test]
    fn test_reader_over_trait_object() {
        let cancel = Cancellation::new();
        let mut tokenizer = Tokenizer::new(b")");
        let source: &mut dyn TokenSource = &mut tokenizer;
        let mut reader = Reader::new(source, &cancel);
        assert!(reader.at_close().unwrap());
    }

    #[test]
    fn test_cancel_between_tokens() {
        let cancel = Cancellation::new();
        let mut tokenizer = Tokenizer::new(b"A B");
        let mut reader = Reader::new(&mut tokenizer, &cancel);

        assert_eq!(reader.read_token().unwrap(), Token::Atom("A".to_string()));
        cancel.cancel();
        assert!(reader.read_token().unwrap_err().is_cancelled());
    }
}
