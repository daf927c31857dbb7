// hydromet-core/src/model/mod.rs
// ============================================================================
// Module: Configuration Model
// Description: Aggregate roots and child entities of the configuration model.
// Purpose: Group entity modules and re-export their types.
// Dependencies: crate::{keys, properties}
// ============================================================================

//! ## Overview
//! Each aggregate root (platform, platform configuration, network list,
//! routing specification, data source, presentation group, site) owns its
//! child collections outright: children have no independent lifecycle and
//! are replaced wholesale whenever the root is written.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
/// Data source aggregate root.
pub mod data_source;
/// Named enumerations of reference values.
pub mod enums;
/// Named collections of transport identifiers.
pub mod network_list;
pub mod platform;
pub mod presentation;
pub mod routing_spec;
pub mod site;
/// Engineering unit reference records.
pub mod units;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigSensor;
pub use config::DecodingScript;
pub use config::FormatStatement;
pub use config::PlatformConfig;
pub use config::ScriptSensor;
pub use config::UnitConverter;
pub use data_source::DataSource;
pub use enums::EnumValue;
pub use enums::Enumeration;
pub use network_list::NetworkList;
pub use network_list::NetworkListEntry;
pub use platform::Platform;
pub use platform::PlatformSensor;
pub use platform::TransportMedium;
pub use presentation::DataPresentation;
pub use presentation::PresentationGroup;
pub use presentation::RoundingRule;
pub use routing_spec::RoutingSpec;
pub use site::Site;
pub use site::SiteName;
pub use units::EngineeringUnit;
