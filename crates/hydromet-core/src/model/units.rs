// hydromet-core/src/model/units.rs
// ============================================================================
// Module: Engineering Unit Model
// Description: Engineering unit reference records.
// Purpose: Name the units measured values are presented in.
// Dependencies: none
// ============================================================================

// ============================================================================
// SECTION: Types
// ============================================================================

/// Engineering unit reference record.
///
/// Units are keyed by abbreviation, not by surrogate key; the abbreviation
/// is both natural and primary key in every schema version.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineeringUnit {
    /// Unit abbreviation, e.g. `"ft"` or `"cms"`.
    pub abbr: String,
    /// Full unit name.
    pub name: Option<String>,
    /// Unit family, e.g. `"english"` or `"metric"`.
    pub family: Option<String>,
    /// Physical quantity measured, e.g. `"length"`.
    pub measures: Option<String>,
}

impl EngineeringUnit {
    /// Creates a unit record for the given abbreviation.
    #[must_use]
    pub fn new(abbr: impl Into<String>) -> Self {
        Self {
            abbr: abbr.into(),
            ..Self::default()
        }
    }
}
