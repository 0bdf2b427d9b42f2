//! # mailwire-mime
//!
//! Header-level MIME utilities used by the IMAP response grammar.
//!
//! ## Features
//!
//! - **Content types**: `type/subtype` plus an ordered parameter list, and
//!   content dispositions (RFC 2045, RFC 2183)
//! - **Encoded words**: RFC 2047 decoding of unstructured text and phrases,
//!   with charset conversion through `encoding_rs`
//! - **Message ids**: enumeration of `References`/`In-Reply-To` msg-id lists
//! - **Dates**: RFC 5322 date parsing that tolerates trailing comments
//!
//! ## Quick Start
//!
//! ```
//! use mailwire_mime::encoding::{decode_phrase, decode_text};
//!
//! assert_eq!(decode_text(b"=?utf-8?Q?H=C3=A9llo?= world"), "Héllo world");
//! assert_eq!(decode_phrase(b"\"Gray, Terry\""), "Gray, Terry");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;

pub mod date;
pub mod encoding;
pub mod references;

pub use content_type::{ContentDisposition, ContentType, Parameters};
pub use error::{Error, Result};
