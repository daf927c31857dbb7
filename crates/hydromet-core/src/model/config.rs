// hydromet-core/src/model/config.rs
// ============================================================================
// Module: Platform Configuration Model
// Description: Platform configuration root with decoding scripts and sensors.
// Purpose: Describe how raw messages from a platform class are decoded.
// Dependencies: crate::keys
// ============================================================================

//! ## Overview
//! A platform configuration is shared by all platforms of the same hardware
//! setup. It owns config sensors (what each sensor measures) and decoding
//! scripts. A decoding script is itself a keyed child with two collections of
//! its own: ordered format statements and per-sensor unit conversion
//! assignments. Unit converters hang off script sensors, which makes them
//! grandchildren of the configuration; deletes must clean them deepest-first.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::keys::DbKey;

// ============================================================================
// SECTION: Unit Converter
// ============================================================================

/// A conversion from raw sensor output to engineering units.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitConverter {
    /// Surrogate key; `None` while transient.
    pub id: Option<DbKey>,
    /// Source units abbreviation (`"raw"` for script-sensor converters).
    pub from_abbr: String,
    /// Destination units abbreviation.
    pub to_abbr: String,
    /// Algorithm name, e.g. `"linear"` or `"usgs-standard"`.
    pub algorithm: String,
    /// Algorithm coefficients a through f.
    pub coefficients: [f64; 6],
}

impl UnitConverter {
    /// Creates a converter with all coefficients zeroed.
    #[must_use]
    pub fn new(
        from_abbr: impl Into<String>,
        to_abbr: impl Into<String>,
        algorithm: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            from_abbr: from_abbr.into(),
            to_abbr: to_abbr.into(),
            algorithm: algorithm.into(),
            coefficients: [0.0; 6],
        }
    }
}

// ============================================================================
// SECTION: Decoding Script Children
// ============================================================================

/// One ordered statement of a decoding script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatStatement {
    /// Execution order within the script.
    pub sequence_num: i32,
    /// Statement label, target of script jumps.
    pub label: String,
    /// The format statement text itself.
    pub format: String,
}

/// Assignment of a unit converter to one sensor within a script.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptSensor {
    /// Sensor number this assignment applies to.
    pub sensor_number: i32,
    /// Conversion from raw values; owned by this script sensor.
    pub unit_converter: Option<UnitConverter>,
}

/// Decoding script: a keyed child of one platform configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodingScript {
    /// Surrogate key; `None` while transient.
    pub id: Option<DbKey>,
    /// Script name, unique within the owning configuration.
    pub name: String,
    /// Script type, e.g. `"DECODES"`.
    pub script_type: String,
    /// Data order indicator: `'A'`scending, `'D'`escending, `'U'`ndefined.
    pub data_order: Option<char>,
    /// Ordered format statements.
    pub format_statements: Vec<FormatStatement>,
    /// Per-sensor unit conversion assignments.
    pub script_sensors: Vec<ScriptSensor>,
}

// ============================================================================
// SECTION: Config Sensor
// ============================================================================

/// What one sensor of the configuration measures and how it records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigSensor {
    /// Sensor number, unique within the configuration.
    pub sensor_number: i32,
    /// Sensor name, e.g. `"stage"` or `"precip"`.
    pub sensor_name: String,
    /// Recording mode character: `'F'`ixed or `'V'`ariable.
    pub recording_mode: Option<char>,
    /// Recording interval in seconds.
    pub recording_interval: Option<i32>,
    /// Absolute minimum plausible value.
    pub abs_min: Option<f64>,
    /// Absolute maximum plausible value.
    pub abs_max: Option<f64>,
}

// ============================================================================
// SECTION: Platform Config
// ============================================================================

/// Platform configuration aggregate root.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlatformConfig {
    /// Surrogate key; `None` while transient.
    pub id: Option<DbKey>,
    /// Configuration name: the natural key.
    pub name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Owned config sensors.
    pub sensors: Vec<ConfigSensor>,
    /// Owned decoding scripts.
    pub scripts: Vec<DecodingScript>,
}

impl PlatformConfig {
    /// Creates a named, empty configuration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
