//! INTERNALDATE / APPEND date-time syntax: `17-Jul-1996 02:23:25 -0700`.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

use crate::{Error, Result};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const LAYOUT: &str = "%d-%b-%Y %H:%M:%S %z";

/// Formats a date-time in the fixed-width internal date layout.
///
/// The value keeps its own UTC offset. Formatting a parsed string gives the
/// same string back, except that a `-0000` zone is written as `+0000`:
/// both name UTC and a fixed offset does not record the sign.
#[must_use]
pub fn format_internal_date(date: &DateTime<FixedOffset>) -> String {
    date.format(LAYOUT).to_string()
}

/// Parses a date-time in the internal date layout.
///
/// Surrounding whitespace is ignored and a single-digit day is accepted;
/// everything else must match exactly, including the month's case.
///
/// # Errors
///
/// Returns `Error::Decode` if the text does not match the layout or names an
/// impossible date.
pub fn parse_internal_date(text: &str) -> Result<DateTime<FixedOffset>> {
    parse_fields(text.trim()).ok_or_else(|| Error::Decode(format!("invalid internal date: {text}")))
}

fn parse_fields(text: &str) -> Option<DateTime<FixedOffset>> {
    let mut parts = text.split(' ');
    let (date, time, zone) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let mut date = date.split('-');
    let day = digits(date.next()?, 1..=2)?;
    let month = date.next()?;
    let month = MONTHS.iter().position(|m| *m == month)?;
    let year = digits(date.next()?, 4..=4)?;
    if date.next().is_some() {
        return None;
    }

    let time = time.as_bytes();
    if time.len() != 8 || time[2] != b':' || time[5] != b':' {
        return None;
    }
    let hour = digits_bytes(&time[0..2])?;
    let minute = digits_bytes(&time[3..5])?;
    let second = digits_bytes(&time[6..8])?;

    let zone = zone.as_bytes();
    if zone.len() != 5 {
        return None;
    }
    let sign = match zone[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let zone_hours = digits_bytes(&zone[1..3])?;
    let zone_minutes = digits_bytes(&zone[3..5])?;
    if zone_minutes >= 60 {
        return None;
    }
    let offset_secs = i32::try_from(zone_hours * 3600 + zone_minutes * 60).ok()? * sign;
    let offset = FixedOffset::east_opt(offset_secs)?;

    let year = i32::try_from(year).ok()?;
    let month = u32::try_from(month + 1).ok()?;
    let naive = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)?;
    offset.from_local_datetime(&naive).single()
}

fn digits(text: &str, len: std::ops::RangeInclusive<usize>) -> Option<u32> {
    if !len.contains(&text.len()) {
        return None;
    }
    digits_bytes(text.as_bytes())
}

fn digits_bytes(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(
        bytes
            .iter()
            .fold(0, |acc, &d| acc * 10 + u32::from(d - b'0')),
    )
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
    use chrono::Timelike;
    use proptest::prelude::*;

    #[test]
    fn test_parse_and_format() {
        let date = parse_internal_date("17-Jul-1996 02:23:25 -0700").unwrap();
        assert_eq!(date.offset().local_minus_utc(), -7 * 3600);
        assert_eq!(date.hour(), 2);
        assert_eq!(format_internal_date(&date), "17-Jul-1996 02:23:25 -0700");
    }

    #[test]
    fn test_format_keeps_offset() {
        let offset = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let date = offset.with_ymd_and_hms(2024, 1, 5, 9, 7, 3).unwrap();
        assert_eq!(format_internal_date(&date), "05-Jan-2024 09:07:03 +0530");
    }

    #[test]
    fn test_format_negative_half_hour_offset() {
        let offset = FixedOffset::west_opt(3 * 3600 + 30 * 60).unwrap();
        let date = offset.with_ymd_and_hms(2020, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(format_internal_date(&date), "31-Dec-2020 23:59:59 -0330");
    }

    #[test]
    fn test_parse_single_digit_day_and_padding() {
        let date = parse_internal_date(" 7-Jul-1996 02:23:25 +0000 ").unwrap();
        assert_eq!(format_internal_date(&date), "07-Jul-1996 02:23:25 +0000");
    }

    #[test]
    fn test_format_utc_offset() {
        let date = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(999, 3, 1, 0, 0, 0)
            .unwrap();
        assert_eq!(format_internal_date(&date), "01-Mar-0999 00:00:00 +0000");
    }

    #[test]
    fn test_parse_minus_zero() {
        let date = parse_internal_date("01-Feb-2000 00:00:00 -0000").unwrap();
        assert_eq!(format_internal_date(&date), "01-Feb-2000 00:00:00 +0000");
    }

    #[test]
    fn test_parse_rejects_deviations() {
        for text in [
            "17-jul-1996 02:23:25 -0700",
            "17-Jul-96 02:23:25 -0700",
            "17-Jul-1996 2:23:25 -0700",
            "17-Jul-1996 02:23:25 0700",
            "17-Jul-1996 02:23:25 -07:00",
            "17-Jul-1996  02:23:25 -0700",
            "31-Feb-1996 02:23:25 -0700",
            "17-Jul-1996 25:23:25 -0700",
            "17-Jul-1996 02:23:25 -0760",
            "",
        ] {
            assert!(parse_internal_date(text).is_err(), "{text}");
        }
    }

    proptest! {
        #[test]
        fn fixed_width_round_trip(
            day in 1u32..=28,
            month in 0usize..12,
            year in 1000u32..=9999,
            hour in 0u32..24,
            minute in 0u32..60,
            second in 0u32..60,
            negative in any::<bool>(),
            zone_hours in 0u32..=14,
            zone_minutes in 0u32..60,
        ) {
            // -0000 comes back as +0000, see format_internal_date
            let sign = if negative && (zone_hours, zone_minutes) != (0, 0) { '-' } else { '+' };
            let text = format!(
                "{day:02}-{}-{year:04} {hour:02}:{minute:02}:{second:02} {sign}{zone_hours:02}{zone_minutes:02}",
                MONTHS[month]
            );
            let date = parse_internal_date(&text).unwrap();
            prop_assert_eq!(format_internal_date(&date), text);
        }
    }
}
