//! IMAP response grammar.
//!
//! Recursive-descent readers for the structured values a server sends:
//! BODYSTRUCTURE, ENVELOPE, FLAGS and LIST/LSUB. Every reader pulls tokens
//! from a [`TokenSource`] through a [`Reader`], which checks cancellation
//! at each token boundary and bounds the nesting depth.
//!
//! # Example
//!
//! ```
//! use mailwire_imap::Cancellation;
//! use mailwire_imap::parser::{Reader, Tokenizer, parse_flags_list};
//! use mailwire_imap::types::MessageFlags;
//!
//! let cancel = Cancellation::new();
//! let mut tokenizer = Tokenizer::new(b"(\\Seen $Label \\Draft)");
//! let mut reader = Reader::new(&mut tokenizer, &cancel);
//!
//! let flags = parse_flags_list(&mut reader).unwrap();
//! assert_eq!(flags, MessageFlags::SEEN | MessageFlags::DRAFT);
//! ```

mod body;
mod envelope;
mod flags;
mod lexer;
mod list;
mod primitives;
mod reader;

pub use body::{
    parse_body_structure, parse_content_disposition, parse_content_language, parse_content_type,
    parse_parameter_list, skip_extension,
};
pub use envelope::parse_envelope;
pub use flags::parse_flags_list;
pub use lexer::{Token, Tokenizer, is_atom_char};
pub use list::{ListCollector, parse_list_response};
pub use reader::{Reader, TokenSource};
