//! Date and time conversion for clinical documents
//!
//! Coded values use the HL7 TS format (`YYYYMMDD[HH[MM[SS[.S+]]]][+-ZZZZ]`).
//! Narrative tables render dates for humans, e.g. `3/14/2019 2:05:00 PM`.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;

/// Timestamp format written to the relational store
pub const DB_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date format written to the relational store
pub const DB_DATE_FORMAT: &str = "%Y-%m-%d";

const NARRATIVE_FORMATS: [&str; 3] = ["%m/%d/%Y %I:%M:%S %p", "%m/%d/%Y %H:%M:%S", "%m/%d/%Y %I:%M %p"];

lazy_static! {
    static ref NARRATIVE_DATE: Regex = Regex::new(r"^\s*\d{1,2}/\d{1,2}/\d{4}").unwrap();
}

fn split_offset(value: &str) -> (&str, Option<&str>) {
    // The sign can only appear after the date part.
    match value
        .char_indices()
        .skip(8)
        .find(|(_, c)| *c == '+' || *c == '-')
    {
        Some((index, _)) => (&value[..index], Some(&value[index..])),
        None => (value, None),
    }
}

fn parse_offset(offset: &str) -> Option<FixedOffset> {
    let sign = match offset.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digits = &offset[1..];
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse an HL7 TS value into a timestamp.
///
/// Missing time components are zero-filled and fractional seconds dropped.
/// A timezone offset, when present, is applied so the result is in UTC.
#[must_use]
pub fn parse_hl7_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    let (local, offset) = split_offset(value);
    let local = local.split('.').next().unwrap_or(local);

    if local.len() < 8
        || local.len() > 14
        || local.len() % 2 != 0
        || !local.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let mut padded = local.to_string();
    padded.push_str(&"000000"[..14 - local.len()]);
    let naive = NaiveDateTime::parse_from_str(&padded, "%Y%m%d%H%M%S").ok()?;

    match offset {
        Some(offset) => {
            let offset = parse_offset(offset)?;
            let zoned = offset.from_local_datetime(&naive).single()?;
            Some(zoned.naive_utc())
        }
        None => Some(naive),
    }
}

/// Parse the date part of an HL7 TS value
#[must_use]
pub fn parse_hl7_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date = value.get(..8)?;
    NaiveDate::parse_from_str(date, "%Y%m%d").ok()
}

/// Whether narrative text starts with a `M/D/YYYY` date
#[must_use]
pub fn looks_like_narrative_date(text: &str) -> bool {
    NARRATIVE_DATE.is_match(text)
}

/// Normalize a narrative date to [`DB_TIMESTAMP_FORMAT`].
///
/// Text that matches none of the known layouts is returned trimmed but
/// otherwise unchanged.
#[must_use]
pub fn normalize_narrative_date(text: &str) -> String {
    let text = text.trim();

    for format in NARRATIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return parsed.format(DB_TIMESTAMP_FORMAT).to_string();
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%m/%d/%Y") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return midnight.format(DB_TIMESTAMP_FORMAT).to_string();
        }
    }

    text.to_string()
}
