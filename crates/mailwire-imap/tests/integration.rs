//! Integration tests for folder listing and parent resolution.
//!
//! A scripted issuer stands in for the session scheduler: each LIST it is
//! asked to send is answered with canned server bytes.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::HashMap;

use mailwire_imap::parser::ListCollector;
use mailwire_imap::{
    Cancellation, Command, CommandIssuer, Error, FolderAttributes, FolderCache, Mailbox,
    ParserConfig, PendingCommand, Result, SpecialUse, Tag, Token, TokenSource, Tokenizer,
    UntaggedHandler, resolve_parents,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Answers LIST commands from a table of canned responses.
#[derive(Default)]
struct ScriptedIssuer {
    responses: HashMap<String, Vec<u8>>,
    sent: Vec<Vec<u8>>,
    next_tag: u32,
}

impl ScriptedIssuer {
    fn respond(mut self, pattern: &str, untagged: &str) -> Self {
        self.responses
            .insert(pattern.to_string(), untagged.as_bytes().to_vec());
        self
    }

    fn sent_commands(&self) -> Vec<String> {
        self.sent
            .iter()
            .map(|c| String::from_utf8(c.clone()).unwrap())
            .collect()
    }
}

impl CommandIssuer for ScriptedIssuer {
    fn issue(&mut self, command: &Command, cancel: &Cancellation) -> Result<PendingCommand> {
        cancel.check()?;
        self.next_tag += 1;
        let tag = Tag::new(format!("A{:04}", self.next_tag));
        self.sent.push(command.serialize(tag.as_str()));
        Ok(PendingCommand::new(tag, command.clone()))
    }

    fn wait(
        &mut self,
        pending: &PendingCommand,
        handler: &mut dyn UntaggedHandler,
        cancel: &Cancellation,
    ) -> Result<()> {
        let Command::List { pattern, .. } = pending.command() else {
            return Err(Error::Protocol("unexpected command".to_string()));
        };
        let mut script = self.responses.get(pattern).cloned().unwrap_or_default();
        script.extend_from_slice(format!("{} OK LIST completed\r\n", pending.tag()).as_bytes());

        let mut tokenizer = Tokenizer::new(&script);
        dispatch(&mut tokenizer, Some(pending), handler, cancel)
    }
}

/// Routes untagged lines to `handler` until the tagged completion or the
/// end of input.
fn dispatch(
    tokenizer: &mut Tokenizer<'_>,
    pending: Option<&PendingCommand>,
    handler: &mut dyn UntaggedHandler,
    cancel: &Cancellation,
) -> Result<()> {
    loop {
        match tokenizer.read_token(cancel)? {
            Token::Eof => return Ok(()),
            Token::Asterisk => {
                let keyword = match tokenizer.read_token(cancel)? {
                    Token::Atom(keyword) => keyword,
                    token => return Err(Error::syntax(token, false)),
                };
                if pending.is_none_or(|p| p.handles(&keyword)) {
                    handler.handle(&keyword, tokenizer, cancel)?;
                }
                skip_line(tokenizer, cancel)?;
            }
            Token::Atom(tag) if pending.is_some_and(|p| p.tag().as_str() == tag) => {
                return skip_line(tokenizer, cancel);
            }
            token => return Err(Error::syntax(token, false)),
        }
    }
}

fn skip_line(tokenizer: &mut Tokenizer<'_>, cancel: &Cancellation) -> Result<()> {
    loop {
        match tokenizer.read_token(cancel)? {
            Token::Eoln | Token::Eof => return Ok(()),
            Token::Literal(_) => {
                tokenizer.read_literal(cancel)?;
            }
            _ => {}
        }
    }
}

/// Feeds a wildcard listing into `cache`, returning the folders it named.
fn list_all(cache: &mut FolderCache, response: &str) -> Vec<Mailbox> {
    let cancel = Cancellation::new();
    let mut tokenizer = Tokenizer::new(response.as_bytes());
    let mut collector = ListCollector::new(cache, ParserConfig::default());
    dispatch(&mut tokenizer, None, &mut collector, &cancel).unwrap();
    collector.into_folders()
}

fn resolve(
    cache: &mut FolderCache,
    folders: &[Mailbox],
    issuer: &mut ScriptedIssuer,
) -> Result<()> {
    let config = ParserConfig::default();
    resolve_parents(cache, folders, issuer, &config, &Cancellation::new())
}

#[test]
fn test_missing_parent_is_listed() {
    init_tracing();
    let mut cache = FolderCache::new();
    let folders = list_all(
        &mut cache,
        "* LIST (\\HasNoChildren) \"/\" INBOX\r\n\
         * LIST (\\HasChildren) \"/\" Work/Reports\r\n\
         * LIST (\\HasNoChildren) \"/\" Work/Reports/2024\r\n",
    );
    assert_eq!(folders.len(), 3);

    let mut issuer =
        ScriptedIssuer::default().respond("Work", "* LIST (\\HasChildren) \"/\" Work\r\n");
    resolve(&mut cache, &folders, &mut issuer).unwrap();

    assert_eq!(issuer.sent_commands(), vec!["A0001 LIST \"\" Work\r\n"]);
    assert_eq!(cache.parent("Work/Reports/2024").unwrap().full_name, "Work/Reports");
    let work = cache.parent("Work/Reports").unwrap();
    assert_eq!(work.full_name, "Work");
    assert!(!work.is_non_existent());
    assert!(work.attributes.contains(FolderAttributes::HAS_CHILDREN));
    assert!(cache.parent("Work").is_none());
    assert!(cache.parent("INBOX").is_none());
}

#[test]
fn test_unlisted_parent_becomes_placeholder() {
    init_tracing();
    let mut cache = FolderCache::new();
    let folders = list_all(&mut cache, "* LIST () \".\" Archive.2019\r\n");

    let mut issuer = ScriptedIssuer::default();
    resolve(&mut cache, &folders, &mut issuer).unwrap();

    assert_eq!(issuer.sent_commands(), vec!["A0001 LIST \"\" Archive\r\n"]);
    let archive = cache.get("Archive").unwrap();
    assert_eq!(archive.attributes, FolderAttributes::NON_EXISTENT);
    assert_eq!(archive.delimiter, Some('.'));
    assert!(!archive.is_selectable());
    assert_eq!(cache.parent("Archive.2019").unwrap().encoded_name, Mailbox::new("Archive"));
}

#[test]
fn test_whole_chain_is_synthesized() {
    init_tracing();
    let mut cache = FolderCache::new();
    let folders = list_all(&mut cache, "* LIST () \"/\" a/b/c\r\n");

    let mut issuer = ScriptedIssuer::default();
    resolve(&mut cache, &folders, &mut issuer).unwrap();

    assert_eq!(
        issuer.sent_commands(),
        vec!["A0001 LIST \"\" a/b\r\n", "A0002 LIST \"\" a\r\n"]
    );
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.parent("a/b/c").unwrap().full_name, "a/b");
    assert_eq!(cache.parent("a/b").unwrap().full_name, "a");
    assert!(cache.get("a").unwrap().is_non_existent());
}

#[test]
fn test_cached_parent_needs_no_command() {
    init_tracing();
    let mut cache = FolderCache::new();
    let folders = list_all(
        &mut cache,
        "* LIST (\\HasChildren) \"/\" Projects\r\n\
         * LIST () \"/\" Projects/Alpha\r\n\
         * LIST () \"/\" /rooted\r\n\
         * LIST () NIL Flat/Name\r\n",
    );

    let mut issuer = ScriptedIssuer::default();
    resolve(&mut cache, &folders, &mut issuer).unwrap();

    assert!(issuer.sent_commands().is_empty());
    assert_eq!(cache.parent("Projects/Alpha").unwrap().full_name, "Projects");
    assert!(cache.parent("/rooted").is_none());
    assert!(cache.parent("Flat/Name").is_none());
}

#[test]
fn test_parent_lookup_uses_encoded_name() {
    init_tracing();
    let mut cache = FolderCache::new();
    let folders = list_all(&mut cache, "* LIST () \"/\" &ZeVnLIqe-/Lost&-Found\r\n");
    assert_eq!(cache.get("&ZeVnLIqe-/Lost&-Found").unwrap().full_name, "日本語/Lost&Found");

    let mut issuer = ScriptedIssuer::default().respond(
        "&ZeVnLIqe-",
        "* 3 EXISTS\r\n* LIST (\\Marked) \"/\" &ZeVnLIqe-\r\n",
    );
    resolve(&mut cache, &folders, &mut issuer).unwrap();

    assert_eq!(issuer.sent_commands(), vec!["A0001 LIST \"\" &ZeVnLIqe-\r\n"]);
    let parent = cache.parent("&ZeVnLIqe-/Lost&-Found").unwrap();
    assert_eq!(parent.full_name, "日本語");
    assert_eq!(parent.name(), "日本語");
    assert_eq!(parent.attributes, FolderAttributes::MARKED);
}

#[test]
fn test_repeated_listings_merge() {
    init_tracing();
    let mut cache = FolderCache::new();
    list_all(&mut cache, "* LIST (\\Marked \\Trash) \"/\" Bin\r\n");
    list_all(&mut cache, "* LIST (\\Unmarked \\HasChildren) \"/\" Bin\r\n");

    let bin = cache.get("Bin").unwrap();
    assert_eq!(
        bin.attributes,
        FolderAttributes::UNMARKED | FolderAttributes::HAS_CHILDREN | FolderAttributes::TRASH
    );
    assert_eq!(cache.special_folder(SpecialUse::Trash).unwrap().full_name, "Bin");
}

#[test]
fn test_cancelled_resolution() {
    init_tracing();
    let mut cache = FolderCache::new();
    let folders = list_all(&mut cache, "* LIST () \"/\" x/y\r\n");

    let cancel = Cancellation::new();
    cancel.cancel();
    let mut issuer = ScriptedIssuer::default();
    let config = ParserConfig::default();
    let err = resolve_parents(&mut cache, &folders, &mut issuer, &config, &cancel).unwrap_err();

    assert!(err.is_cancelled());
    assert!(issuer.sent_commands().is_empty());
    assert!(cache.get("x/y").unwrap().parent.is_none());
}

#[test]
fn test_malformed_lookup_response_propagates() {
    init_tracing();
    let mut cache = FolderCache::new();
    let folders = list_all(&mut cache, "* LIST () \"/\" p/q\r\n");

    let mut issuer = ScriptedIssuer::default().respond("p", "* LIST \\Marked \"/\" p\r\n");
    let err = resolve(&mut cache, &folders, &mut issuer).unwrap_err();
    assert!(matches!(err, Error::Syntax { .. }));
}

#[test]
fn test_lookup_uses_caller_limits() {
    init_tracing();
    let mut cache = FolderCache::new();
    let folders = list_all(&mut cache, "* LIST () \"/\" m/n\r\n");

    let response = "* LIST () \"/\" m (\"CHILDINFO\" (\"SUBSCRIBED\"))\r\n";
    let mut issuer = ScriptedIssuer::default().respond("m", response);
    let config = ParserConfig::builder().max_depth(1).build();
    let err = resolve_parents(&mut cache, &folders, &mut issuer, &config, &Cancellation::new())
        .unwrap_err();
    assert!(matches!(err, Error::DepthExceeded(1)));

    let mut issuer = ScriptedIssuer::default().respond("m", response);
    resolve(&mut cache, &folders, &mut issuer).unwrap();
    assert_eq!(cache.parent("m/n").unwrap().full_name, "m");
}
