//! IMAP token types.

use std::fmt;

/// Token types produced by a token source.
///
/// Whitespace is never a token. Literals carry only their announced length;
/// the payload is fetched separately through
/// [`TokenSource::read_literal`](crate::parser::TokenSource::read_literal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Atom (unquoted string without special characters).
    Atom(String),
    /// Quoted string, unescaped.
    QString(String),
    /// Literal string with size prefix {n}.
    Literal(usize),
    /// Backslash-prefixed flag such as `\Seen` or `\*`.
    Flag(String),
    /// Opening parenthesis.
    OpenParen,
    /// Closing parenthesis.
    CloseParen,
    /// Opening bracket.
    OpenBracket,
    /// Closing bracket.
    CloseBracket,
    /// Asterisk (untagged response prefix).
    Asterisk,
    /// NIL.
    Nil,
    /// CRLF line ending.
    Eoln,
    /// End of input.
    Eof,
    /// Unrecognized input.
    Error(String),
}

impl Token {
    /// Returns the text of an atom, quoted string or flag.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Atom(s) | Self::QString(s) | Self::Flag(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(s) | Self::Flag(s) => write!(f, "{s}"),
            Self::QString(s) => write!(f, "{s:?}"),
            Self::Literal(n) => write!(f, "{{{n}}}"),
            Self::OpenParen => write!(f, "("),
            Self::CloseParen => write!(f, ")"),
            Self::OpenBracket => write!(f, "["),
            Self::CloseBracket => write!(f, "]"),
            Self::Asterisk => write!(f, "*"),
            Self::Nil => write!(f, "NIL"),
            Self::Eoln => write!(f, "'\\r\\n'"),
            Self::Eof => write!(f, "EOF"),
            Self::Error(s) => write!(f, "[error: {s}]"),
        }
    }
}
