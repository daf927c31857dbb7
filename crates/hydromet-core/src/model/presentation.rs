// hydromet-core/src/model/presentation.rs
// ============================================================================
// Module: Presentation Group Model
// Description: Presentation group root with data presentations and rounding.
// Purpose: Control units and rounding applied to decoded output by data type.
// Dependencies: crate::keys
// ============================================================================

//! ## Overview
//! A presentation group maps data types to display units and rounding rules.
//! Data presentations are keyed children; rounding rules hang off data
//! presentations, making them grandchildren of the group — deletes collect
//! the presentation ids first, then remove rules by id list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::keys::DbKey;
use crate::keys::DbTimestamp;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Significant-digits rule applied to values up to an upper limit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoundingRule {
    /// Values at or below this limit use this rule; `None` means unbounded.
    pub upper_limit: Option<f64>,
    /// Number of significant digits to present.
    pub sig_digits: i32,
}

/// Units and rounding for one data type: a keyed child of a group.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataPresentation {
    /// Surrogate key; `None` while transient.
    pub id: Option<DbKey>,
    /// Data type code this presentation applies to.
    pub data_type: String,
    /// Display units abbreviation.
    pub unit_abbr: Option<String>,
    /// Maximum decimal places (schema v6+).
    pub max_decimals: Option<i32>,
    /// Minimum displayable value (schema v10+).
    pub min_value: Option<f64>,
    /// Maximum displayable value (schema v10+).
    pub max_value: Option<f64>,
    /// Owned rounding rules.
    pub rounding_rules: Vec<RoundingRule>,
}

/// Presentation group aggregate root.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PresentationGroup {
    /// Surrogate key; `None` while transient.
    pub id: Option<DbKey>,
    /// Group name: the natural key.
    pub name: String,
    /// Name of a parent group this group inherits from.
    pub inherits_from: Option<String>,
    /// Last modification time, set by the store on every write.
    pub last_modify_time: Option<DbTimestamp>,
    /// Whether this group is in production use.
    pub is_production: bool,
    /// Owned data presentations.
    pub presentations: Vec<DataPresentation>,
}

impl PresentationGroup {
    /// Creates a named, empty presentation group.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
