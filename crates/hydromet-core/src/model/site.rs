// hydromet-core/src/model/site.rs
// ============================================================================
// Module: Site Model
// Description: Monitoring site aggregate root and its name records.
// Purpose: Identify physical measurement locations referenced by platforms.
// Dependencies: crate::keys
// ============================================================================

//! ## Overview
//! A site is a physical location where measurements are taken. Sites carry
//! one or more typed names (different agencies assign different identifiers
//! to the same location); the first name in the list is the preferred name
//! and serves as the site's natural key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::keys::DbKey;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A typed name assigned to a site (e.g. a local agency identifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteName {
    /// Name type label, such as `"local"` or an agency code.
    pub name_type: String,
    /// The identifier value itself.
    pub name_value: String,
}

impl SiteName {
    /// Creates a site name from type and value.
    #[must_use]
    pub fn new(name_type: impl Into<String>, name_value: impl Into<String>) -> Self {
        Self {
            name_type: name_type.into(),
            name_value: name_value.into(),
        }
    }
}

/// Monitoring site aggregate root.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Site {
    /// Surrogate key; `None` while transient.
    pub id: Option<DbKey>,
    /// Typed names; the first entry is the preferred name.
    pub names: Vec<SiteName>,
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
    /// Elevation in meters.
    pub elevation: Option<f64>,
    /// Local time zone identifier.
    pub time_zone: Option<String>,
    /// Country name or code.
    pub country: Option<String>,
    /// State or province.
    pub state: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

impl Site {
    /// Returns the preferred (first) site name, if any.
    #[must_use]
    pub fn preferred_name(&self) -> Option<&SiteName> {
        self.names.first()
    }

    /// Returns a human-readable display name for list panels.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.preferred_name()
            .map_or_else(|| "(unnamed site)".to_string(), |n| n.name_value.clone())
    }
}
