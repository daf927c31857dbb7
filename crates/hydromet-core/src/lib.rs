// hydromet-core/src/lib.rs
// ============================================================================
// Module: hydromet Core Library
// Description: Public API surface for the hydromet configuration model.
// Purpose: Expose surrogate keys, aggregate roots, and child entity types.
// Dependencies: crate::{keys, model, properties}
// ============================================================================

//! ## Overview
//! hydromet-core holds the in-memory configuration model persisted by the
//! hydromet store: monitoring sites, telemetry platforms, platform
//! configurations with decoding scripts, network lists, routing
//! specifications, data sources, and presentation groups. Types here carry
//! no persistence logic; the store layer owns all SQL.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod keys;
pub mod model;
pub mod properties;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use keys::DbKey;
pub use keys::DbTimestamp;
pub use model::ConfigSensor;
pub use model::DataPresentation;
pub use model::DataSource;
pub use model::DecodingScript;
pub use model::EngineeringUnit;
pub use model::EnumValue;
pub use model::Enumeration;
pub use model::FormatStatement;
pub use model::NetworkList;
pub use model::NetworkListEntry;
pub use model::Platform;
pub use model::PlatformConfig;
pub use model::PlatformSensor;
pub use model::PresentationGroup;
pub use model::RoundingRule;
pub use model::RoutingSpec;
pub use model::ScriptSensor;
pub use model::Site;
pub use model::SiteName;
pub use model::TransportMedium;
pub use model::UnitConverter;
pub use properties::Property;
pub use properties::PropertyList;
