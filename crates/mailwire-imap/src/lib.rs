//! # mailwire-imap
//!
//! The response-grammar half of an IMAP client: it turns the structured
//! values servers send (BODYSTRUCTURE, ENVELOPE, FLAGS, LIST) into typed
//! Rust values, and encodes the few values a client sends back.
//!
//! ## Features
//!
//! - **Body structures**: MIME trees with content metadata, extension data
//!   and nested `message/rfc822` parts, bounded by a nesting limit
//! - **Envelopes**: RFC 2047 decoded subjects and display names, lenient
//!   dates, msg-id lists
//! - **Folders**: LIST/LSUB parsing into an identity cache with attribute
//!   merging, parent resolution and modified UTF-7 names
//! - **Codecs**: flag lists, UID sets and internal dates
//! - **Cooperative cancellation** checked at every token boundary
//!
//! ## Quick Start
//!
//! ```
//! use mailwire_imap::types::{BodyPart, parse_uid_set, format_uid_set};
//!
//! let body = BodyPart::parse(
//!     r#"("TEXT" "PLAIN" ("CHARSET" "US-ASCII") NIL NIL "7BIT" 3028 92)"#,
//! ).unwrap();
//! assert!(body.content_type().matches("text", "plain"));
//! assert_eq!(body.lines(), Some(92));
//!
//! let uids = parse_uid_set("1:3,5:6,8").unwrap();
//! assert_eq!(format_uid_set(&uids), "1:3,5:6,8");
//! ```
//!
//! ## Modules
//!
//! - [`command`]: the LIST command and the issuance seam used by parent
//!   resolution
//! - [`config`]: parser limits
//! - [`folder`]: folder identity cache
//! - [`parser`]: token source, reader and grammar productions
//! - [`types`]: parsed values and the scalar codecs

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cancel;
pub mod command;
pub mod config;
mod error;
pub mod folder;
pub mod parser;
pub mod types;

pub use cancel::Cancellation;
pub use command::{Command, CommandIssuer, PendingCommand, UntaggedHandler};
pub use config::{ParserConfig, ParserConfigBuilder};
pub use error::{Error, Result};
pub use folder::{FolderCache, resolve_parents};
pub use parser::{Reader, Token, TokenSource, Tokenizer};
pub use types::{
    Address, BodyPart, Envelope, FolderAttributes, FolderIdentity, Mailbox, MessageFlags,
    SpecialUse, Tag, Uid,
};
