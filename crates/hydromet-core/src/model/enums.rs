// hydromet-core/src/model/enums.rs
// ============================================================================
// Module: Enumeration Model
// Description: Named enumerations of reference values.
// Purpose: Hold pick-list values (medium types, script types, etc.).
// Dependencies: crate::keys
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::keys::DbKey;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One value within an enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnumValue {
    /// The enumerated value string.
    pub value: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Sort position within the enumeration.
    pub sort_number: Option<i32>,
}

impl EnumValue {
    /// Creates an enumeration value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }
}

/// Enumeration aggregate root: a named set of reference values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Enumeration {
    /// Surrogate key; `None` while transient.
    pub id: Option<DbKey>,
    /// Enumeration name: the natural key.
    pub name: String,
    /// Owned values.
    pub values: Vec<EnumValue>,
}

impl Enumeration {
    /// Creates a named, empty enumeration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
