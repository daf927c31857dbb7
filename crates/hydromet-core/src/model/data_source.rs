// hydromet-core/src/model/data_source.rs
// ============================================================================
// Module: Data Source Model
// Description: Data source aggregate root.
// Purpose: Name a message source a routing specification retrieves from.
// Dependencies: crate::keys
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::keys::DbKey;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Data source aggregate root: where routing specs retrieve messages from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataSource {
    /// Surrogate key; `None` while transient.
    pub id: Option<DbKey>,
    /// Source name: the natural key.
    pub name: String,
    /// Source type, e.g. `"lrgs"`, `"directory"`, `"socketstream"`.
    pub source_type: String,
    /// Type-specific argument string (host, port, path, options).
    pub argument: Option<String>,
}

impl DataSource {
    /// Creates a data source with name and type set.
    #[must_use]
    pub fn new(name: impl Into<String>, source_type: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            source_type: source_type.into(),
            argument: None,
        }
    }
}
