//! Compact UID-set syntax (`1:3,5,8:9`).

use super::Uid;
use crate::{Error, ParserConfig, Result};

/// Compresses UIDs into the range syntax used by UID commands.
///
/// Consecutive runs become `min:max`, single values stay bare, runs are
/// comma-joined in input order. Callers should sort `uids` ascending; out of
/// order input still yields a valid set, just a fragmented one.
#[must_use]
pub fn format_uid_set(uids: &[Uid]) -> String {
    compress(uids.iter().map(|uid| uid.get()))
}

/// Formats zero-based message indexes as a one-based sequence set.
///
/// # Errors
///
/// Returns `Error::Decode` if an index does not fit a sequence number.
pub fn format_index_set(indexes: &[usize]) -> Result<String> {
    let values = indexes
        .iter()
        .map(|&index| {
            index
                .checked_add(1)
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| Error::Decode(format!("index {index} out of range")))
        })
        .collect::<Result<Vec<u32>>>()?;
    Ok(compress(values))
}

fn compress(values: impl IntoIterator<Item = u32>) -> String {
    let values: Vec<u32> = values.into_iter().collect();
    let mut out = String::new();
    let mut index = 0;

    while index < values.len() {
        let min = values[index];
        let mut max = min;
        index += 1;

        while index < values.len() && max.checked_add(1) == Some(values[index]) {
            max = values[index];
            index += 1;
        }

        if !out.is_empty() {
            out.push(',');
        }
        if max > min {
            out.push_str(&format!("{min}:{max}"));
        } else {
            out.push_str(&min.to_string());
        }
    }

    out
}

/// Expands a UID-set atom into individual UIDs, within the default
/// expansion limit.
///
/// Empty segments are ignored. A `min:max` range with `min > max`
/// contributes nothing. `*` is not accepted since it has no value outside a
/// selected mailbox.
///
/// # Errors
///
/// Returns `Error::Decode` if any component is not a positive number, a
/// segment has more than one `:`, or the set is too large.
pub fn parse_uid_set(atom: &str) -> Result<Vec<Uid>> {
    parse_uid_set_with_config(atom, &ParserConfig::default())
}

/// Expands a UID-set atom, failing once it would exceed
/// `config.max_uid_set_len` UIDs.
///
/// # Errors
///
/// Same as [`parse_uid_set`].
pub fn parse_uid_set_with_config(atom: &str, config: &ParserConfig) -> Result<Vec<Uid>> {
    let limit = config.max_uid_set_len;
    let too_large = || Error::Decode(format!("UID set exceeds {limit} entries"));
    let mut uids = Vec::new();

    for segment in atom.split(',').filter(|s| !s.is_empty()) {
        let mut bounds = segment.split(':');
        let min = parse_uid(bounds.next().unwrap_or_default(), atom)?;

        match (bounds.next(), bounds.next()) {
            (None, _) => {
                if uids.len() >= limit {
                    return Err(too_large());
                }
                uids.push(min);
            }
            (Some(max), None) => {
                let max = parse_uid(max, atom)?;
                let span = (max.get() as usize + 1).saturating_sub(min.get() as usize);
                if span > limit - uids.len() {
                    return Err(too_large());
                }
                uids.extend((min.get()..=max.get()).filter_map(Uid::new));
            }
            (Some(_), Some(_)) => {
                return Err(Error::Decode(format!("invalid UID set: {atom}")));
            }
        }
    }

    Ok(uids)
}

fn parse_uid(text: &str, atom: &str) -> Result<Uid> {
    text.parse::<u32>()
        .ok()
        .and_then(Uid::new)
        .ok_or_else(|| Error::Decode(format!("invalid UID set: {atom}")))
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
    use proptest::prelude::*;

    fn uids(values: &[u32]) -> Vec<Uid> {
        values.iter().map(|&v| Uid::new(v).unwrap()).collect()
    }

    fn values(uids: &[Uid]) -> Vec<u32> {
        uids.iter().map(|uid| uid.get()).collect()
    }

    mod format_tests {
        use super::*;

        #[test]
        fn test_format_runs() {
            assert_eq!(format_uid_set(&uids(&[1, 2, 3, 5, 6, 8])), "1:3,5:6,8");
            assert_eq!(format_uid_set(&uids(&[1, 3, 7, 8, 9, 10])), "1,3,7:10");
        }

        #[test]
        fn test_format_single_and_empty() {
            assert_eq!(format_uid_set(&uids(&[42])), "42");
            assert_eq!(format_uid_set(&[]), "");
        }

        #[test]
        fn test_format_unsorted_is_fragmented() {
            assert_eq!(format_uid_set(&uids(&[3, 1, 2])), "3,1:2");
        }

        #[test]
        fn test_format_at_u32_max() {
            assert_eq!(
                format_uid_set(&uids(&[u32::MAX - 1, u32::MAX])),
                "4294967294:4294967295"
            );
        }

        #[test]
        fn test_format_index_set() {
            assert_eq!(format_index_set(&[0, 1, 2, 4]).unwrap(), "1:3,5");
            assert_eq!(format_index_set(&[]).unwrap(), "");
        }
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_runs() {
            let parsed = parse_uid_set("1:3,5:6,8").unwrap();
            assert_eq!(values(&parsed), vec![1, 2, 3, 5, 6, 8]);
        }

        #[test]
        fn test_parse_skips_empty_segments() {
            assert_eq!(values(&parse_uid_set("1,,2,").unwrap()), vec![1, 2]);
            assert!(parse_uid_set("").unwrap().is_empty());
        }

        #[test]
        fn test_parse_reversed_range_is_empty() {
            // Kept as-is for compatibility: a descending range adds nothing
            assert_eq!(values(&parse_uid_set("7:5,9").unwrap()), vec![9]);
        }

        #[test]
        fn test_parse_rejects_zero() {
            assert!(matches!(parse_uid_set("0"), Err(Error::Decode(_))));
            assert!(matches!(parse_uid_set("1:0"), Err(Error::Decode(_))));
        }

        #[test]
        fn test_parse_limits_expansion() {
            assert!(matches!(parse_uid_set("1:4294967295"), Err(Error::Decode(_))));

            let config = ParserConfig::builder().max_uid_set_len(5).build();
            assert_eq!(
                values(&parse_uid_set_with_config("1:3,7:8", &config).unwrap()),
                vec![1, 2, 3, 7, 8]
            );
            assert!(parse_uid_set_with_config("1:3,7:9", &config).is_err());
            assert!(parse_uid_set_with_config("1,2,3,4,5,6", &config).is_err());
            assert!(parse_uid_set_with_config("9:1,1:5", &config).is_ok());
        }

        #[test]
        fn test_parse_rejects_garbage() {
            assert!(parse_uid_set("1,x").is_err());
            assert!(parse_uid_set("1:2:3").is_err());
            assert!(parse_uid_set("1:*").is_err());
            assert!(parse_uid_set(":5").is_err());
        }
    }

    proptest! {
        #[test]
        fn sorted_sets_round_trip(set in proptest::collection::btree_set(1u32..5000, 0..64)) {
            let input: Vec<Uid> = set.into_iter().filter_map(Uid::new).collect();
            let encoded = format_uid_set(&input);
            prop_assert_eq!(parse_uid_set(&encoded).unwrap(), input);
        }
    }
}
