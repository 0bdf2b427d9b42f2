//! LIST and LSUB response grammar.

use tracing::{debug, trace};

use super::{Reader, Token, TokenSource, skip_extension};
use crate::command::UntaggedHandler;
use crate::folder::FolderCache;
use crate::types::{FolderAttributes, Mailbox};
use crate::{Cancellation, Error, ParserConfig, Result};

/// Parses the body of one LIST or LSUB response, after the keyword, and
/// records it in `cache`.
///
/// The folder's key is returned and also appended to `results`. Extended
/// data after the name (RFC 5258) is skipped; the end-of-line token is
/// left for the caller.
///
/// # Errors
///
/// Returns `Error::Syntax` on a malformed attribute list, delimiter or name.
pub fn parse_list_response<S: TokenSource + ?Sized>(
    reader: &mut Reader<'_, S>,
    cache: &mut FolderCache,
    results: &mut Vec<Mailbox>,
) -> Result<Mailbox> {
    let attributes = parse_attributes(reader)?;

    let delimiter = match reader.read_token()? {
        Token::QString(s) => s.chars().next(),
        Token::Nil => None,
        token => return Err(Error::syntax(token, false)),
    };

    let encoded_name = reader.read_string()?;

    while !matches!(reader.peek_token()?, Token::Eoln | Token::Eof) {
        debug!(folder = %encoded_name, "skipping extended list data");
        skip_extension(reader)?;
    }

    let key = cache.upsert(&encoded_name, attributes, delimiter);
    trace!(folder = %key, attributes = ?attributes, "parsed list response");
    results.push(key.clone());

    Ok(key)
}

fn parse_attributes<S: TokenSource + ?Sized>(
    reader: &mut Reader<'_, S>,
) -> Result<FolderAttributes> {
    reader.expect(&Token::OpenParen, false)?;

    let mut attributes = FolderAttributes::empty();
    loop {
        match reader.read_token()? {
            Token::CloseParen => break,
            Token::Flag(name) | Token::Atom(name) => match FolderAttributes::from_wire(&name) {
                Some(bit) => attributes |= bit,
                None => trace!(attribute = %name, "ignoring folder attribute"),
            },
            token => return Err(Error::syntax(token, false)),
        }
    }

    Ok(attributes)
}

/// Feeds LIST and LSUB responses into a folder cache.
///
/// Used as the handler for lookups issued during parent resolution, and by
/// session code that runs its own listings.
#[derive(Debug)]
pub struct ListCollector<'a> {
    cache: &'a mut FolderCache,
    folders: Vec<Mailbox>,
    config: ParserConfig,
}

impl<'a> ListCollector<'a> {
    /// Creates a collector writing into `cache`.
    pub const fn new(cache: &'a mut FolderCache, config: ParserConfig) -> Self {
        Self {
            cache,
            folders: Vec::new(),
            config,
        }
    }

    /// Returns the keys of the folders seen so far, in response order.
    #[must_use]
    pub fn folders(&self) -> &[Mailbox] {
        &self.folders
    }

    /// Consumes the collector, returning the folders it saw.
    #[must_use]
    pub fn into_folders(self) -> Vec<Mailbox> {
        self.folders
    }
}

impl UntaggedHandler for ListCollector<'_> {
    fn handle(
        &mut self,
        keyword: &str,
        source: &mut dyn TokenSource,
        cancel: &Cancellation,
    ) -> Result<()> {
        if !(keyword.eq_ignore_ascii_case("LIST") || keyword.eq_ignore_ascii_case("LSUB")) {
            debug!(keyword, "ignoring untagged response");
            return Ok(());
        }

        let mut reader = Reader::with_config(source, cancel, self.config);
        parse_list_response(&mut reader, self.cache, &mut self.folders)?;
        Ok(())
    }
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
    use crate::parser::Tokenizer;

    fn list(input: &str, cache: &mut FolderCache) -> Result<Mailbox> {
        let cancel = Cancellation::new();
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        let mut reader = Reader::new(&mut tokenizer, &cancel);
        let mut results = Vec::new();
        let key = parse_list_response(&mut reader, cache, &mut results)?;
        assert_eq!(results, vec![key.clone()]);
        Ok(key)
    }

    mod response_tests {
        use super::*;

        #[test]
        fn test_basic_listing() {
            let mut cache = FolderCache::new();
            let input = "(\\HasNoChildren \\Sent) \"/\" \"Sent Items\"\r\n";
            let key = list(input, &mut cache).unwrap();

            let folder = cache.get(key.as_str()).unwrap();
            assert_eq!(folder.full_name, "Sent Items");
            assert_eq!(folder.delimiter, Some('/'));
            assert_eq!(
                folder.attributes,
                FolderAttributes::HAS_NO_CHILDREN | FolderAttributes::SENT
            );
        }

        #[test]
        fn test_nil_delimiter_and_literal_name() {
            let mut cache = FolderCache::new();
            let key = list("() NIL {5}\r\nFlat!\r\n", &mut cache).unwrap();
            assert_eq!(key.as_str(), "Flat!");
            assert_eq!(cache.get("Flat!").unwrap().delimiter, None);
        }

        #[test]
        fn test_unknown_attributes_ignored() {
            let mut cache = FolderCache::new();
            let input = "(\\Marked \\X-Custom Whatever \\Inbox) \".\" INBOX";
            let key = list(input, &mut cache).unwrap();
            assert_eq!(cache.get(key.as_str()).unwrap().attributes, FolderAttributes::MARKED);
        }

        #[test]
        fn test_xlist_synonyms() {
            let mut cache = FolderCache::new();
            let key = list("(\\AllMail \\Spam \\Starred) \"/\" x", &mut cache).unwrap();
            assert_eq!(
                cache.get(key.as_str()).unwrap().attributes,
                FolderAttributes::ALL | FolderAttributes::JUNK | FolderAttributes::FLAGGED
            );
        }

        #[test]
        fn test_extended_data_skipped() {
            let mut cache = FolderCache::new();
            let cancel = Cancellation::new();
            let input = b"(\\Subscribed) \"/\" Work (\"CHILDINFO\" (\"SUBSCRIBED\"))\r\nrest";
            let mut tokenizer = Tokenizer::new(input);
            let mut reader = Reader::new(&mut tokenizer, &cancel);
            let mut results = Vec::new();
            parse_list_response(&mut reader, &mut cache, &mut results).unwrap();

            assert_eq!(reader.read_token().unwrap(), Token::Eoln);
            assert!(cache.contains("Work"));
        }

        #[test]
        fn test_merge_rule() {
            let mut cache = FolderCache::new();
            list("(\\Marked) \"/\" INBOX", &mut cache).unwrap();
            list("(\\Unmarked \\HasChildren) \"/\" INBOX", &mut cache).unwrap();
            assert_eq!(
                cache.get("INBOX").unwrap().attributes,
                FolderAttributes::UNMARKED | FolderAttributes::HAS_CHILDREN
            );
            assert_eq!(cache.len(), 1);
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn test_attributes_must_be_list() {
            let mut cache = FolderCache::new();
            assert!(matches!(
                list("\\Marked \"/\" INBOX", &mut cache),
                Err(Error::Syntax { .. })
            ));
        }

        #[test]
        fn test_bad_delimiter() {
            let mut cache = FolderCache::new();
            assert!(matches!(
                list("() / INBOX", &mut cache),
                Err(Error::Syntax {
                    token: Token::Atom(_),
                    ..
                })
            ));
            assert!(cache.is_empty());
        }

        #[test]
        fn test_missing_name() {
            let mut cache = FolderCache::new();
            assert!(list("() \"/\"\r\n", &mut cache).is_err());
            assert!(cache.is_empty());
        }
    }

    mod collector_tests {
        use super::*;

        #[test]
        fn test_collects_list_and_lsub() {
            let mut cache = FolderCache::new();
            let cancel = Cancellation::new();
            let mut collector = ListCollector::new(&mut cache, ParserConfig::default());

            let mut tokenizer = Tokenizer::new(b"() \"/\" A");
            collector.handle("LIST", &mut tokenizer, &cancel).unwrap();
            let mut tokenizer = Tokenizer::new(b"(\\Subscribed) \"/\" B");
            collector.handle("lsub", &mut tokenizer, &cancel).unwrap();
            let mut tokenizer = Tokenizer::new(b"5");
            collector.handle("EXISTS", &mut tokenizer, &cancel).unwrap();

            assert_eq!(collector.into_folders(), vec![Mailbox::new("A"), Mailbox::new("B")]);
            assert_eq!(cache.len(), 2);
        }
    }
}
