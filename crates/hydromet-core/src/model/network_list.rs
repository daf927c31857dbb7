// hydromet-core/src/model/network_list.rs
// ============================================================================
// Module: Network List Model
// Description: Named collections of transport identifiers.
// Purpose: Select which platforms a routing specification retrieves.
// Dependencies: crate::keys
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::keys::DbKey;
use crate::keys::DbTimestamp;

// ============================================================================
// SECTION: Types
// ============================================================================

/// One transport identifier within a network list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkListEntry {
    /// Transport identifier, e.g. a GOES DCP address.
    pub transport_id: String,
    /// Cached platform display name (schema v11+).
    pub platform_name: Option<String>,
    /// Free-text description (schema v11+).
    pub description: Option<String>,
}

impl NetworkListEntry {
    /// Creates an entry for the given transport identifier.
    #[must_use]
    pub fn new(transport_id: impl Into<String>) -> Self {
        Self {
            transport_id: transport_id.into(),
            ..Self::default()
        }
    }
}

/// Network list aggregate root: a named set of transport identifiers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetworkList {
    /// Surrogate key; `None` while transient.
    pub id: Option<DbKey>,
    /// List name: the natural key.
    pub name: String,
    /// Transport medium type all entries share, e.g. `"goes"`.
    pub transport_medium_type: Option<String>,
    /// Preferred site name type for display purposes.
    pub site_name_type_preference: Option<String>,
    /// Last modification time (schema v6+; synthesized below v6).
    pub last_modify_time: Option<DbTimestamp>,
    /// Owned entries.
    pub entries: Vec<NetworkListEntry>,
}

impl NetworkList {
    /// Creates a named, empty network list.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
