//! Values produced and consumed by the response grammar.

mod body;
mod envelope;
mod flags;
mod folder;
mod identifiers;
mod internal_date;
mod uid_set;

pub use body::{BasicFields, BodyPart, BodyPartCommon};
pub use envelope::{Address, Envelope, format_address_list};
pub use flags::{MessageFlags, format_flags_list};
pub use folder::{FolderAttributes, FolderIdentity, SpecialUse};
pub use identifiers::{Mailbox, Tag, Uid};
pub use internal_date::{format_internal_date, parse_internal_date};
pub use uid_set::{format_index_set, format_uid_set, parse_uid_set, parse_uid_set_with_config};
