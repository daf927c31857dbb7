// hydromet-core/src/model/routing_spec.rs
// ============================================================================
// Module: Routing Specification Model
// Description: Routing spec aggregate root.
// Purpose: Describe a retrieval/decode/output run: source, lists, consumer.
// Dependencies: crate::{keys, properties}, crate::model::data_source
// ============================================================================

//! ## Overview
//! A routing specification names a data source to pull messages from, the
//! network lists selecting which platforms to retrieve, the output format
//! and time zone, a presentation group for rounding/units, and a consumer
//! that receives the decoded output. Network list membership and properties
//! are owned child rows keyed by the spec's surrogate key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::keys::DbKey;
use crate::keys::DbTimestamp;
use crate::model::data_source::DataSource;
use crate::properties::PropertyList;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Routing specification aggregate root.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoutingSpec {
    /// Surrogate key; `None` while transient.
    pub id: Option<DbKey>,
    /// Spec name: the natural key, matched case-insensitively.
    pub name: String,
    /// Data source to retrieve from; shared via the identity cache.
    pub data_source: Option<Arc<DataSource>>,
    /// Whether computed/equation sensors are evaluated.
    pub enable_equations: bool,
    /// Whether performance measurements are produced.
    pub use_performance_measurements: bool,
    /// Output formatter name.
    pub output_format: Option<String>,
    /// Output time zone abbreviation.
    pub output_time_zone: Option<String>,
    /// Presentation group name applied to output.
    pub presentation_group_name: Option<String>,
    /// Retrieval window start, as entered by the operator.
    pub since_time: Option<String>,
    /// Retrieval window end, as entered by the operator.
    pub until_time: Option<String>,
    /// Consumer type name.
    pub consumer_type: Option<String>,
    /// Consumer argument string.
    pub consumer_arg: Option<String>,
    /// Last modification time, set by the store on every write.
    pub last_modify_time: Option<DbTimestamp>,
    /// Whether this spec is in production use.
    pub is_production: bool,
    /// Names of the network lists this spec retrieves.
    pub network_list_names: Vec<String>,
    /// Free-form spec properties.
    pub properties: PropertyList,
}

impl RoutingSpec {
    /// Creates a named, empty routing specification.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
