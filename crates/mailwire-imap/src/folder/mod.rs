//! Folder identity cache and parent resolution.
//!
//! The cache is an arena keyed by wire-encoded mailbox name. Parent links
//! are keys into the same arena, so identities never own each other.

mod mutf7;

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::{debug, warn};

pub use mutf7::{decode_folder_name, encode_folder_name};

use crate::command::{Command, CommandIssuer};
use crate::parser::ListCollector;
use crate::types::{FolderAttributes, FolderIdentity, Mailbox, SpecialUse};
use crate::{Cancellation, ParserConfig, Result};

/// Folders seen on one session, keyed by encoded name.
#[derive(Debug, Clone, Default)]
pub struct FolderCache {
    folders: HashMap<Mailbox, FolderIdentity>,
}

impl FolderCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached folders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.folders.len()
    }

    /// Returns true if no folder is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }

    /// Looks up a folder by encoded name.
    #[must_use]
    pub fn get(&self, encoded_name: &str) -> Option<&FolderIdentity> {
        self.folders.get(encoded_name)
    }

    /// Returns true if a folder with this encoded name is cached.
    #[must_use]
    pub fn contains(&self, encoded_name: &str) -> bool {
        self.folders.contains_key(encoded_name)
    }

    /// Iterates over all cached folders in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &FolderIdentity> {
        self.folders.values()
    }

    /// Records a listing for `encoded_name` and returns its key.
    ///
    /// A known folder keeps its delimiter and has `attributes` merged in
    /// with [`FolderAttributes::merge`]; an unknown one is created.
    pub fn upsert(
        &mut self,
        encoded_name: &str,
        attributes: FolderAttributes,
        delimiter: Option<char>,
    ) -> Mailbox {
        let key = Mailbox::new(encoded_name);
        match self.folders.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let folder = entry.get_mut();
                folder.attributes = folder.attributes.merge(attributes);
                debug!(folder = %key, attributes = ?folder.attributes, "merged folder listing");
            }
            Entry::Vacant(entry) => {
                debug!(folder = %key, attributes = ?attributes, "new folder");
                entry.insert(FolderIdentity {
                    encoded_name: key.clone(),
                    full_name: decode_folder_name(encoded_name),
                    attributes,
                    delimiter,
                    parent: None,
                });
            }
        }
        key
    }

    /// Inserts a non-existent stand-in for a folder the server never
    /// listed. Does nothing if the folder is already known.
    pub fn insert_placeholder(&mut self, encoded_name: &str, delimiter: Option<char>) -> Mailbox {
        let key = Mailbox::new(encoded_name);
        self.folders
            .entry(key.clone())
            .or_insert_with(|| FolderIdentity {
                encoded_name: key.clone(),
                full_name: decode_folder_name(encoded_name),
                attributes: FolderAttributes::NON_EXISTENT,
                delimiter,
                parent: None,
            });
        key
    }

    /// Links `child` to `parent`. Returns false if `child` is unknown.
    pub fn set_parent(&mut self, child: &str, parent: Mailbox) -> bool {
        match self.folders.get_mut(child) {
            Some(folder) => {
                folder.parent = Some(parent);
                true
            }
            None => false,
        }
    }

    /// Returns the parent identity of `child`, once resolved.
    #[must_use]
    pub fn parent(&self, child: &str) -> Option<&FolderIdentity> {
        let parent = self.folders.get(child)?.parent.as_ref()?;
        self.folders.get(parent.as_str())
    }

    /// Returns the folder carrying the given special-use attribute.
    ///
    /// When several do, the one with the smallest encoded name wins.
    #[must_use]
    pub fn special_folder(&self, usage: SpecialUse) -> Option<&FolderIdentity> {
        let attribute = usage.attribute();
        self.folders
            .values()
            .filter(|folder| folder.attributes.contains(attribute))
            .min_by(|a, b| a.encoded_name.cmp(&b.encoded_name))
    }
}

/// Computes the encoded name of a folder's expected parent.
///
/// Returns `None` for folders without a hierarchy delimiter in their name,
/// or whose only delimiter is the first character.
fn parent_name(folder: &FolderIdentity) -> Option<String> {
    let delimiter = folder.delimiter?;
    match folder.full_name.rfind(delimiter) {
        None | Some(0) => None,
        Some(index) => Some(encode_folder_name(&folder.full_name[..index])),
    }
}

/// Links every folder in `folders` to its parent, listing missing parents
/// from the server.
///
/// A parent the server does not return is inserted as a non-existent
/// placeholder, so every resolvable link is set afterwards. Parents found
/// along the way are resolved too, up to the top of the hierarchy. The
/// lookup responses are parsed with the limits in `config`.
///
/// # Errors
///
/// Returns an error if issuing or awaiting a LIST lookup fails, or on
/// cancellation. Links made before the failure are kept.
pub fn resolve_parents<I: CommandIssuer + ?Sized>(
    cache: &mut FolderCache,
    folders: &[Mailbox],
    issuer: &mut I,
    config: &ParserConfig,
    cancel: &Cancellation,
) -> Result<()> {
    let mut queue: Vec<Mailbox> = folders.iter().rev().cloned().collect();

    while let Some(key) = queue.pop() {
        cancel.check()?;

        let Some(folder) = cache.get(key.as_str()) else {
            continue;
        };
        if folder.parent.is_some() {
            continue;
        }
        let delimiter = folder.delimiter;
        let Some(parent) = parent_name(folder) else {
            continue;
        };

        if !cache.contains(&parent) {
            lookup_folder(cache, &parent, issuer, config, cancel)?;
        }
        let parent = if cache.contains(&parent) {
            Mailbox::new(parent)
        } else {
            warn!(folder = %key, parent = %parent, "parent not listed; inserting placeholder");
            cache.insert_placeholder(&parent, delimiter)
        };

        cache.set_parent(key.as_str(), parent.clone());
        queue.push(parent);
    }

    Ok(())
}

/// Issues `LIST "" <name>` and feeds the response into the cache.
fn lookup_folder<I: CommandIssuer + ?Sized>(
    cache: &mut FolderCache,
    encoded_name: &str,
    issuer: &mut I,
    config: &ParserConfig,
    cancel: &Cancellation,
) -> Result<()> {
    let command = Command::List {
        reference: String::new(),
        pattern: encoded_name.to_string(),
    };
    let mut pending = issuer.issue(&command, cancel)?;
    pending.register_untagged_handler("LIST");
    debug!(tag = %pending.tag(), folder = %encoded_name, "looking up parent folder");

    let mut collector = ListCollector::new(cache, *config);
    issuer.wait(&pending, &mut collector, cancel)
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

    mod cache_tests {
        use super::*;

        #[test]
        fn test_upsert_creates_and_decodes() {
            let mut cache = FolderCache::new();
            let key = cache.upsert("Lost &- Found", FolderAttributes::MARKED, Some('/'));
            assert_eq!(key.as_str(), "Lost &- Found");

            let folder = cache.get("Lost &- Found").unwrap();
            assert_eq!(folder.full_name, "Lost & Found");
            assert_eq!(folder.delimiter, Some('/'));
            assert_eq!(folder.parent, None);
            assert_eq!(cache.len(), 1);
        }

        #[test]
        fn test_upsert_merges_attributes() {
            let mut cache = FolderCache::new();
            cache.upsert("INBOX", FolderAttributes::MARKED, Some('/'));
            cache.upsert(
                "INBOX",
                FolderAttributes::UNMARKED | FolderAttributes::HAS_CHILDREN,
                Some('.'),
            );

            let folder = cache.get("INBOX").unwrap();
            assert_eq!(
                folder.attributes,
                FolderAttributes::UNMARKED | FolderAttributes::HAS_CHILDREN
            );
            assert_eq!(folder.delimiter, Some('/'));
            assert_eq!(cache.len(), 1);
        }

        #[test]
        fn test_placeholder_does_not_overwrite() {
            let mut cache = FolderCache::new();
            cache.upsert("Work", FolderAttributes::HAS_CHILDREN, Some('/'));
            cache.insert_placeholder("Work", Some('/'));
            assert!(!cache.get("Work").unwrap().is_non_existent());

            cache.insert_placeholder("Gone", Some('/'));
            let gone = cache.get("Gone").unwrap();
            assert!(gone.is_non_existent());
            assert!(!gone.is_selectable());
        }

        #[test]
        fn test_parent_link() {
            let mut cache = FolderCache::new();
            cache.upsert("Work", FolderAttributes::empty(), Some('/'));
            cache.upsert("Work/Reports", FolderAttributes::empty(), Some('/'));
            assert!(cache.set_parent("Work/Reports", Mailbox::new("Work")));
            assert!(!cache.set_parent("Nope", Mailbox::new("Work")));
            assert_eq!(cache.parent("Work/Reports").unwrap().full_name, "Work");
            assert!(cache.parent("Work").is_none());
        }

        #[test]
        fn test_special_folder() {
            let mut cache = FolderCache::new();
            cache.upsert("Trash", FolderAttributes::TRASH, Some('/'));
            cache.upsert("Deleted", FolderAttributes::TRASH, Some('/'));
            cache.upsert("Sent", FolderAttributes::SENT, Some('/'));

            assert_eq!(
                cache.special_folder(SpecialUse::Trash).unwrap().encoded_name.as_str(),
                "Deleted"
            );
            assert_eq!(
                cache.special_folder(SpecialUse::Sent).unwrap().encoded_name.as_str(),
                "Sent"
            );
            assert!(cache.special_folder(SpecialUse::Junk).is_none());
        }
    }

    mod parent_name_tests {
        use super::*;

        fn identity(full_name: &str, delimiter: Option<char>) -> FolderIdentity {
            FolderIdentity {
                encoded_name: Mailbox::new(encode_folder_name(full_name)),
                full_name: full_name.to_string(),
                attributes: FolderAttributes::empty(),
                delimiter,
                parent: None,
            }
        }

        #[test]
        fn test_truncates_at_last_delimiter() {
            assert_eq!(
                parent_name(&identity("a/b/c", Some('/'))).as_deref(),
                Some("a/b")
            );
        }

        #[test]
        fn test_top_level_has_no_parent() {
            assert_eq!(parent_name(&identity("INBOX", Some('/'))), None);
            assert_eq!(parent_name(&identity("/rooted", Some('/'))), None);
            assert_eq!(parent_name(&identity("a/b", None)), None);
        }

        #[test]
        fn test_parent_is_reencoded() {
            assert_eq!(
                parent_name(&identity("日本語/Sub", Some('/'))).as_deref(),
                Some("&ZeVnLIqe-")
            );
        }
    }
}
