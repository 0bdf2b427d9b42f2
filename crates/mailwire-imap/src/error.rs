//! Error types for the IMAP response grammar.

use crate::parser::Token;

/// Result type alias for grammar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing IMAP syntax.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A token appeared where the grammar did not allow it.
    #[error("syntax error: unexpected token {token}{}", final_suffix(*.final_token))]
    Syntax {
        /// The offending token.
        token: Token,
        /// Whether the token was expected to close the production.
        final_token: bool,
    },

    /// The token was well formed but its value is invalid.
    #[error("decode error: {0}")]
    Decode(String),

    /// The operation was cancelled at a token boundary.
    #[error("operation cancelled")]
    Cancelled,

    /// Malformed input detected by the token source, or a command failure.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Nesting went deeper than the configured limit.
    #[error("nesting depth exceeded limit of {0}")]
    DepthExceeded(usize),
}

impl Error {
    /// Creates a syntax error for an unexpected token.
    #[must_use]
    pub const fn syntax(token: Token, final_token: bool) -> Self {
        Self::Syntax { token, final_token }
    }

    /// Returns true if this error was caused by cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

const fn final_suffix(final_token: bool) -> &'static str {
    if final_token {
        " (expected end of production)"
    } else {
        ""
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_display() {
        let err = Error::syntax(Token::Atom("FOO".to_string()), false);
        assert_eq!(err.to_string(), "syntax error: unexpected token FOO");

        let err = Error::syntax(Token::Eof, true);
        assert_eq!(
            err.to_string(),
            "syntax error: unexpected token EOF (expected end of production)"
        );
    }

    #[test]
    fn test_is_cancelled() {
        assert!(Error::Cancelled.is_cancelled());
        assert!(!Error::Decode("x".to_string()).is_cancelled());
    }
}
