// hydromet-store/src/dao/mod.rs
// ============================================================================
// Module: DAO Set
// Description: Per-aggregate data access objects and shared row helpers.
// Purpose: One DAO per aggregate root, uniform write and delete algorithms.
// Dependencies: rusqlite, hydromet-core
// ============================================================================

//! ## Overview
//! Each aggregate root has one DAO offering `read` (complete), `list`
//! (partial: natural key and display fields), `write` (insert-or-update by
//! natural key), `delete` (manual cascade, deepest-first), and
//! `last_modified`. Every write or delete runs inside one explicit
//! transaction; failure rolls the whole operation back. Legacy boolean
//! columns store `'TRUE'`/`'FALSE'` text; single-character columns store
//! one-character strings.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
/// Persistence for data source records.
pub mod data_source;
/// Persistence for enumeration sets and their values.
pub mod enums;
pub mod network_list;
pub mod platform;
pub mod presentation;
/// Shared reader/writer for the name/value property tables.
pub mod properties;
/// Persistence for routing specifications.
pub mod routing_spec;
/// Persistence for sites and their typed name records.
pub mod site;
pub mod units;

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Row;
use rusqlite::types::Value;
use time::OffsetDateTime;

use crate::temporal::TemporalCodec;

// ============================================================================
// SECTION: Row Helpers
// ============================================================================

/// Encodes a boolean the way the legacy schema stores it.
pub(crate) const fn sql_bool(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

/// Decodes a legacy boolean column; `TRUE`/`YES` prefixes are true.
pub(crate) fn parse_bool(text: Option<String>) -> bool {
    text.as_deref().is_some_and(|t| {
        matches!(t.trim().chars().next(), Some(c) if c.eq_ignore_ascii_case(&'t') || c.eq_ignore_ascii_case(&'y'))
    })
}

/// Encodes an optional single-character column value.
pub(crate) fn char_to_sql(value: Option<char>) -> Option<String> {
    value.map(|c| c.to_string())
}

/// Decodes an optional single-character column value.
pub(crate) fn first_char(text: Option<String>) -> Option<char> {
    text.as_deref().and_then(|t| t.chars().next())
}

/// Decodes a timestamp column through the codec; undecodable values and SQL
/// `NULL` both yield `None`.
pub(crate) fn get_timestamp(
    codec: &TemporalCodec,
    row: &Row<'_>,
    idx: usize,
) -> Result<Option<OffsetDateTime>, rusqlite::Error> {
    Ok(codec.decode(row.get_ref(idx)?))
}

/// Optional text as a driver value.
pub(crate) fn opt_text(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::Text)
}

/// Optional raw key as a driver value.
pub(crate) fn opt_int(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}

/// Optional 32-bit integer as a driver value.
pub(crate) fn opt_i32(value: Option<i32>) -> Value {
    value.map_or(Value::Null, |v| Value::Integer(i64::from(v)))
}
