//! Errors for header decoding.

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Header decoding errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed encoded word or Q-encoded text.
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),

    /// B-encoded text that is not valid base64.
    #[error("base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// Charset label not known to the decoder.
    #[error("unknown charset: {0}")]
    UnknownCharset(String),
}
