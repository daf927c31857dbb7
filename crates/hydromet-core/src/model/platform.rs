// hydromet-core/src/model/platform.rs
// ============================================================================
// Module: Platform Model
// Description: Telemetry platform aggregate root and its child entities.
// Purpose: Model a deployed data-collection platform with transport media.
// Dependencies: crate::{keys, properties}, crate::model::{config, site}
// ============================================================================

//! ## Overview
//! A platform is a deployed data-collection installation: a site, a platform
//! configuration describing how to decode its messages, zero or more
//! transport media (the channels the platform transmits over), per-sensor
//! overrides, and free-form properties. Transport media and sensors have no
//! lifecycle of their own; they are replaced in full whenever the platform
//! is written.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::keys::DbKey;
use crate::keys::DbTimestamp;
use crate::model::config::PlatformConfig;
use crate::model::site::Site;
use crate::properties::PropertyList;

// ============================================================================
// SECTION: Transport Medium
// ============================================================================

/// A transmission channel owned by one platform.
///
/// The `(medium_type, medium_id)` pair identifies the channel, e.g.
/// `("goes", "CE123456")` for a GOES DCP address.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransportMedium {
    /// Medium type, e.g. `"goes"` or `"iridium"`.
    pub medium_type: String,
    /// Medium identifier (DCP address, IMEI, etc.).
    pub medium_id: String,
    /// Name of the decoding script used for messages on this medium.
    pub script_name: Option<String>,
    /// Assigned channel number.
    pub channel_num: Option<i32>,
    /// Assigned transmit time, seconds of day.
    pub assigned_time: Option<i32>,
    /// Transmit window length in seconds.
    pub transmit_window: Option<i32>,
    /// Transmit interval in seconds.
    pub transmit_interval: Option<i32>,
    /// Equipment model reference, if recorded.
    pub equipment_id: Option<DbKey>,
    /// Clock adjustment in seconds applied to message times (schema v6+).
    pub time_adjustment: i32,
    /// Preamble classification character (schema v6+).
    pub preamble: Option<char>,
    /// Time zone for self-timed messages (schema v7+).
    pub time_zone: Option<String>,
    /// Logger type for direct-connect media (schema v11+).
    pub logger_type: Option<String>,
    /// Serial baud rate (schema v11+).
    pub baud: Option<i32>,
    /// Serial stop bits (schema v11+).
    pub stop_bits: Option<i32>,
    /// Serial parity character (schema v11+).
    pub parity: Option<char>,
    /// Serial data bits (schema v11+).
    pub data_bits: Option<i32>,
    /// Whether a login is required for direct-connect media (schema v11+).
    pub do_login: bool,
    /// Login username (schema v11+).
    pub username: Option<String>,
    /// Login password (schema v11+).
    pub password: Option<String>,
}

impl TransportMedium {
    /// Creates a transport medium with the identifying pair set.
    #[must_use]
    pub fn new(medium_type: impl Into<String>, medium_id: impl Into<String>) -> Self {
        Self {
            medium_type: medium_type.into(),
            medium_id: medium_id.into(),
            ..Self::default()
        }
    }

    /// Returns true when the identifying pair is blank.
    ///
    /// Empty media are skipped on write; a row without both type and id
    /// could never be matched on read.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.medium_type.trim().is_empty() || self.medium_id.trim().is_empty()
    }
}

// ============================================================================
// SECTION: Platform Sensor
// ============================================================================

/// Per-platform sensor override.
///
/// Only stored when it carries actual data; an override with no site, no
/// DDNO, and no properties is omitted from the database.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlatformSensor {
    /// Sensor number within the platform's configuration.
    pub sensor_number: i32,
    /// Actual site for this sensor when it differs from the platform site.
    pub site_id: Option<DbKey>,
    /// USGS data-descriptor number (schema v7+ column, else a property).
    pub usgs_ddno: Option<i32>,
    /// Free-form sensor properties.
    pub properties: PropertyList,
}

impl PlatformSensor {
    /// Creates an empty sensor override for the given sensor number.
    #[must_use]
    pub fn new(sensor_number: i32) -> Self {
        Self {
            sensor_number,
            ..Self::default()
        }
    }

    /// Returns true when this override carries no data worth persisting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.site_id.is_none() && self.usgs_ddno.is_none() && self.properties.is_empty()
    }
}

// ============================================================================
// SECTION: Platform
// ============================================================================

/// Telemetry platform aggregate root.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Platform {
    /// Surrogate key; `None` while transient.
    pub id: Option<DbKey>,
    /// Owning agency.
    pub agency: Option<String>,
    /// Whether this platform is in production use.
    pub is_production: bool,
    /// Site where this platform is installed; shared via the identity cache.
    pub site: Option<Arc<Site>>,
    /// Platform configuration; shared via the identity cache.
    pub config: Option<Arc<PlatformConfig>>,
    /// Free-text description.
    pub description: Option<String>,
    /// Last modification time, set by the store on every write.
    pub last_modify_time: Option<DbTimestamp>,
    /// Expiration time for historical platform versions.
    pub expiration: Option<DbTimestamp>,
    /// Designator distinguishing multiple platforms at one site (schema v7+).
    pub designator: Option<String>,
    /// Owned transport media.
    pub transport_media: Vec<TransportMedium>,
    /// Owned per-sensor overrides.
    pub sensors: Vec<PlatformSensor>,
    /// Free-form platform properties (schema v6+).
    pub properties: PropertyList,
}

impl Platform {
    /// Returns the natural display name: site name plus designator.
    #[must_use]
    pub fn display_name(&self) -> String {
        let base = self
            .site
            .as_ref()
            .map_or_else(|| "(no site)".to_string(), |s| s.display_name());
        match self.designator.as_deref() {
            Some(d) if !d.is_empty() => format!("{base}-{d}"),
            _ => base,
        }
    }
}
