// hydromet-store/src/temporal.rs
// ============================================================================
// Module: Temporal Codec
// Description: Encodes and decodes vendor timestamp representations.
// Purpose: Survive a decade of timestamp encodings without ever throwing.
// Dependencies: rusqlite, time, tracing
// ============================================================================

//! ## Overview
//! Timestamp columns in deployed databases carry one of several historical
//! encodings: a packed 7-byte binary value, dotted text with an explicit zone
//! token, dotted text with a bare UTC-offset suffix, integer epoch seconds,
//! or plain `yyyy-MM-dd HH:mm:ss` text in the session zone. Decoding tries an
//! ordered chain of parsers and takes the first success; a value no parser
//! accepts decodes to `None` with a warning. Encoding writes either the
//! packed form or the plain text form, both reconstructible by the chain, at
//! whole-second precision.

// ============================================================================
// SECTION: Imports
// ============================================================================

use hydromet_config::DateEncoding;
use rusqlite::types::Value;
use rusqlite::types::ValueRef;
use time::Date;
use time::Month;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::Time;
use time::UtcOffset;
use tracing::warn;

use crate::error::DbError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Byte length of the packed vendor timestamp encoding.
const PACKED_LEN: usize = 7;
/// Bias applied to the two packed year bytes.
const YEAR_BIAS: i32 = 100;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Timestamp codec fixed to one session zone and one write encoding.
#[derive(Debug, Clone, Copy)]
pub struct TemporalCodec {
    /// Session zone applied to zone-less representations.
    offset: UtcOffset,
    /// Encoding used for writes.
    encoding: DateEncoding,
}

impl TemporalCodec {
    /// Builds a codec for the given session zone string and write encoding.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Invalid`] when the zone string is not `UTC` or a
    /// fixed `±HH:MM` offset.
    pub fn new(zone: &str, encoding: DateEncoding) -> Result<Self, DbError> {
        let offset = parse_zone(zone)
            .ok_or_else(|| DbError::Invalid(format!("unusable session time zone '{zone}'")))?;
        Ok(Self { offset, encoding })
    }

    /// Returns the session zone offset.
    #[must_use]
    pub const fn offset(&self) -> UtcOffset {
        self.offset
    }

    /// Current time in the session zone, truncated to whole seconds.
    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
            .to_offset(self.offset)
            .replace_nanosecond(0)
            .unwrap_or_else(|_| OffsetDateTime::now_utc().to_offset(self.offset))
    }

    // ------------------------------------------------------------------
    // Decoding
    // ------------------------------------------------------------------

    /// Decodes a driver value holding a timestamp in any supported encoding.
    ///
    /// `NULL` decodes to `None` silently; a non-null value that no parser
    /// accepts decodes to `None` with a warning.
    #[must_use]
    pub fn decode(&self, value: ValueRef<'_>) -> Option<OffsetDateTime> {
        let decoded = match value {
            ValueRef::Null => return None,
            ValueRef::Blob(bytes) => self.decode_packed(bytes),
            ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                .ok()
                .and_then(|text| self.decode_text(text)),
            ValueRef::Integer(epoch) => OffsetDateTime::from_unix_timestamp(epoch)
                .ok()
                .map(|ts| ts.to_offset(self.offset)),
            ValueRef::Real(_) => None,
        };
        if decoded.is_none() {
            warn!("undecodable timestamp value, treating as unset");
        }
        decoded
    }

    /// Decodes the packed 7-byte vendor encoding.
    ///
    /// Layout: `year = (b0-100)*100 + (b1-100)`, month `b2`, day `b3`, then
    /// hour/minute/second in `b4`/`b5`/`b6`, each stored as `value + 1`. The
    /// encoding carries no zone; the session zone is applied.
    #[must_use]
    pub fn decode_packed(&self, bytes: &[u8]) -> Option<OffsetDateTime> {
        if bytes.len() != PACKED_LEN {
            return None;
        }
        let year = (i32::from(bytes[0]) - YEAR_BIAS) * 100 + (i32::from(bytes[1]) - YEAR_BIAS);
        let month = Month::try_from(bytes[2]).ok()?;
        let date = Date::from_calendar_date(year, month, bytes[3]).ok()?;
        let time = Time::from_hms(
            bytes[4].checked_sub(1)?,
            bytes[5].checked_sub(1)?,
            bytes[6].checked_sub(1)?,
        )
        .ok()?;
        Some(PrimitiveDateTime::new(date, time).assume_offset(self.offset))
    }

    /// Decodes text through the ordered parser chain, first success wins.
    fn decode_text(&self, text: &str) -> Option<OffsetDateTime> {
        decode_dotted_with_zone(text)
            .or_else(|| decode_dotted_with_offset(text))
            .or_else(|| self.decode_plain(text))
    }

    /// Plain `yyyy-MM-dd HH:mm:ss` text interpreted in the session zone.
    fn decode_plain(&self, text: &str) -> Option<OffsetDateTime> {
        let (date_part, time_part) = text.trim().split_once(' ')?;
        let date = parse_date(date_part)?;
        let time = parse_time(time_part, ':')?;
        Some(PrimitiveDateTime::new(date, time).assume_offset(self.offset))
    }

    // ------------------------------------------------------------------
    // Encoding
    // ------------------------------------------------------------------

    /// Encodes an optional timestamp as a bindable driver value.
    ///
    /// `None` encodes as SQL `NULL`. Sub-second precision is discarded.
    #[must_use]
    pub fn encode(&self, value: Option<OffsetDateTime>) -> Value {
        let Some(ts) = value else {
            return Value::Null;
        };
        let ts = ts.to_offset(self.offset);
        match self.encoding {
            DateEncoding::Packed => Value::Blob(pack(&ts)),
            DateEncoding::Text => Value::Text(format_plain(&ts)),
        }
    }
}

// ============================================================================
// SECTION: Packed Encoding
// ============================================================================

/// Packs a timestamp into the 7-byte vendor encoding.
fn pack(ts: &OffsetDateTime) -> Vec<u8> {
    let year = ts.year();
    let century = year.div_euclid(100) + YEAR_BIAS;
    let remainder = year.rem_euclid(100) + YEAR_BIAS;
    vec![
        u8::try_from(century).unwrap_or(100),
        u8::try_from(remainder).unwrap_or(100),
        u8::from(ts.month()),
        ts.day(),
        ts.hour() + 1,
        ts.minute() + 1,
        ts.second() + 1,
    ]
}

/// Formats the plain locale-independent text form.
fn format_plain(ts: &OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        ts.year(),
        u8::from(ts.month()),
        ts.day(),
        ts.hour(),
        ts.minute(),
        ts.second()
    )
}

// ============================================================================
// SECTION: Text Parsers
// ============================================================================

/// Stage one: `yyyy-MM-dd HH.mm.ss.0 zzz` with a named zone token.
fn decode_dotted_with_zone(text: &str) -> Option<OffsetDateTime> {
    let (date_part, time_part, zone_part) = split_three(text)?;
    let date = parse_date(date_part)?;
    let time = parse_dotted_time(time_part)?;
    let offset = parse_zone_token(zone_part)?;
    Some(PrimitiveDateTime::new(date, time).assume_offset(offset))
}

/// Stage two: `yyyy-MM-dd HH.mm.ss.0 -H:MM` with a bare UTC-offset suffix
/// located after exactly two embedded spaces.
fn decode_dotted_with_offset(text: &str) -> Option<OffsetDateTime> {
    let (date_part, time_part, offset_part) = split_three(text)?;
    let date = parse_date(date_part)?;
    let time = parse_dotted_time(time_part)?;
    let offset = parse_manual_offset(offset_part)?;
    Some(PrimitiveDateTime::new(date, time).assume_offset(offset))
}

/// Splits text containing exactly two spaces into three tokens.
fn split_three(text: &str) -> Option<(&str, &str, &str)> {
    let trimmed = text.trim();
    if trimmed.bytes().filter(|&b| b == b' ').count() != 2 {
        return None;
    }
    let (first, rest) = trimmed.split_once(' ')?;
    let (second, third) = rest.split_once(' ')?;
    Some((first, second, third))
}

/// Parses a `yyyy-MM-dd` date.
fn parse_date(text: &str) -> Option<Date> {
    let mut parts = text.split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Date::from_calendar_date(year, Month::try_from(month).ok()?, day).ok()
}

/// Parses `HH<sep>mm<sep>ss` with an optional trailing fraction field.
fn parse_time(text: &str, sep: char) -> Option<Time> {
    let mut parts = text.split(sep);
    let hour: u8 = parts.next()?.parse().ok()?;
    let minute: u8 = parts.next()?.parse().ok()?;
    let second: u8 = parts.next()?.parse().ok()?;
    if let Some(fraction) = parts.next() {
        // Only the legacy ".0" fraction is tolerated.
        let _: u32 = fraction.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Time::from_hms(hour, minute, second).ok()
}

/// Parses the dotted legacy time-of-day form `HH.mm.ss.0`.
fn parse_dotted_time(text: &str) -> Option<Time> {
    parse_time(text, '.')
}

/// Maps a named zone token to an offset.
///
/// Only the UTC-equivalent tokens `UTC`, `GMT`, and `Z` are recognized:
/// with no zone-name table available, regional abbreviations such as `EST`
/// cannot be resolved to an offset. A literal carrying one falls through
/// every decoder stage and reads as undecodable, where older readers with
/// a platform zone table would have accepted it.
fn parse_zone_token(token: &str) -> Option<UtcOffset> {
    if token.eq_ignore_ascii_case("utc")
        || token.eq_ignore_ascii_case("gmt")
        || token.eq_ignore_ascii_case("z")
    {
        Some(UtcOffset::UTC)
    } else {
        None
    }
}

/// Parses a bare `±H:MM` or `±HH:MM` offset suffix.
fn parse_manual_offset(token: &str) -> Option<UtcOffset> {
    let (sign, rest) = match token.as_bytes().first()? {
        b'+' => (1_i8, &token[1..]),
        b'-' => (-1_i8, &token[1..]),
        _ => return None,
    };
    let (hours_part, minutes_part) = rest.split_once(':')?;
    let hours: i8 = hours_part.parse().ok()?;
    let minutes: i8 = minutes_part.parse().ok()?;
    UtcOffset::from_hms(sign * hours, sign * minutes, 0).ok()
}

/// Parses a session zone string: `UTC` or a fixed `±HH:MM` offset.
#[must_use]
pub fn parse_zone(zone: &str) -> Option<UtcOffset> {
    if zone.eq_ignore_ascii_case("utc") {
        return Some(UtcOffset::UTC);
    }
    parse_manual_offset(zone)
}
