// hydromet-core/src/keys.rs
// ============================================================================
// Module: Surrogate Keys
// Description: Database surrogate key and timestamp primitives.
// Purpose: Provide a strongly typed key distinct from natural identifiers.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Every aggregate root carries an optional [`DbKey`]: `None` means the
//! object is transient (never persisted), `Some` means it matches a database
//! row. Keys are allocated by the store's key generator and are unique per
//! table for the process lifetime. A deleted object has its key cleared and
//! becomes transient again.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use time::OffsetDateTime;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Timestamp type used throughout the model.
///
/// Sub-second precision is not preserved by the relational store; values are
/// truncated to whole seconds on write.
pub type DbTimestamp = OffsetDateTime;

/// Database surrogate key.
///
/// Opaque and database-generated; distinct from any natural key such as a
/// platform display name or network list name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DbKey(i64);

impl DbKey {
    /// Wraps a raw key value.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw key value.
    #[must_use]
    pub const fn as_raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DbKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for DbKey {
    fn from(raw: i64) -> Self {
        Self::new(raw)
    }
}
