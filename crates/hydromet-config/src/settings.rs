// hydromet-config/src/settings.rs
// ============================================================================
// Module: hydromet Settings
// Description: Settings loading and validation for the persistence layer.
// Purpose: Provide strict, fail-closed settings parsing with hard limits.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! Settings come from a TOML file resolved from an explicit path, the
//! `HYDROMET_CONFIG` environment variable, or the default filename in the
//! working directory. Every field has a default so a minimal file (or none
//! at all, via [`Settings::default`]) yields a working local configuration.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default settings filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "hydromet.toml";
/// Environment variable used to override the settings path.
pub const CONFIG_ENV_VAR: &str = "HYDROMET_CONFIG";
/// Maximum settings file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;
/// Default connect retry budget in milliseconds.
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 30_000;
/// Default spacing between connect attempts in milliseconds.
const DEFAULT_CONNECT_RETRY_MS: u64 = 5_000;
/// Default driver busy timeout in milliseconds.
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default per-table sequence name suffix.
const DEFAULT_SEQUENCE_SUFFIX: &str = "IdSeq";
/// Default key generator strategy name.
const DEFAULT_KEY_GENERATOR: &str = "sequence";
/// Default session time zone.
const DEFAULT_TIME_ZONE: &str = "UTC";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Settings loading and validation errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file could not be read.
    #[error("cannot read settings file '{path}': {reason}")]
    Io {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying failure description.
        reason: String,
    },
    /// Settings file exceeds the size limit.
    #[error("settings file '{path}' exceeds {MAX_CONFIG_FILE_SIZE} bytes")]
    TooLarge {
        /// Path that failed the size check.
        path: PathBuf,
    },
    /// Settings file is not valid TOML for the expected shape.
    #[error("invalid settings file '{path}': {reason}")]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// Parser failure description.
        reason: String,
    },
    /// A field value failed validation.
    #[error("invalid setting {field}: {reason}")]
    Invalid {
        /// Field name that failed validation.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

// ============================================================================
// SECTION: Settings Types
// ============================================================================

/// Vendor temporal encoding used for timestamp columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateEncoding {
    /// Quoted locale-independent string literals (default).
    #[default]
    Text,
    /// Packed 7-byte century/year/month/day/hour/min/sec binary values.
    Packed,
}

/// Persistence layer settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Database location string the driver accepts (file path for local
    /// databases).
    pub database_location: String,
    /// Path to the credential store file, if password auth may be needed.
    #[serde(default)]
    pub auth_file: Option<PathBuf>,
    /// Attempt a credential-less, OS-trusted open before consulting the
    /// credential store.
    #[serde(default = "default_true")]
    pub trust_os_auth: bool,
    /// Session time zone applied to timestamp encoding/decoding.
    /// Accepts `"UTC"` or a fixed offset `"+HH:MM"` / `"-HH:MM"`.
    #[serde(default = "default_time_zone")]
    pub sql_time_zone: String,
    /// Vendor temporal encoding for timestamp columns.
    #[serde(default)]
    pub date_encoding: DateEncoding,
    /// Registry name of the key generator strategy.
    #[serde(default = "default_key_generator")]
    pub key_generator: String,
    /// Per-table sequence object name suffix.
    #[serde(default = "default_sequence_suffix")]
    pub sequence_suffix: String,
    /// First value a freshly reset sequence issues.
    #[serde(default = "default_sequence_start")]
    pub sequence_start: i64,
    /// Total wall-clock budget for connection establishment (ms).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Spacing between connection attempts (ms).
    #[serde(default = "default_connect_retry_ms")]
    pub connect_retry_ms: u64,
    /// Driver busy timeout applied to every connection (ms).
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_location: String::new(),
            auth_file: None,
            trust_os_auth: true,
            sql_time_zone: DEFAULT_TIME_ZONE.to_string(),
            date_encoding: DateEncoding::Text,
            key_generator: DEFAULT_KEY_GENERATOR.to_string(),
            sequence_suffix: DEFAULT_SEQUENCE_SUFFIX.to_string(),
            sequence_start: 1,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            connect_retry_ms: DEFAULT_CONNECT_RETRY_MS,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Returns `true`; serde default helper.
const fn default_true() -> bool {
    true
}

/// Returns the default session time zone.
fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}

/// Returns the default key generator strategy name.
fn default_key_generator() -> String {
    DEFAULT_KEY_GENERATOR.to_string()
}

/// Returns the default sequence suffix.
fn default_sequence_suffix() -> String {
    DEFAULT_SEQUENCE_SUFFIX.to_string()
}

/// Returns the default sequence start value.
const fn default_sequence_start() -> i64 {
    1
}

/// Returns the default connect retry budget.
const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

/// Returns the default connect attempt spacing.
const fn default_connect_retry_ms() -> u64 {
    DEFAULT_CONNECT_RETRY_MS
}

/// Returns the default busy timeout.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl Settings {
    /// Loads settings from an explicit path, the `HYDROMET_CONFIG`
    /// environment variable, or `hydromet.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the file cannot be read, exceeds the
    /// size limit, fails to parse, or fails validation.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => env::var_os(CONFIG_ENV_VAR)
                .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_NAME), PathBuf::from),
        };
        Self::from_path(&path)
    }

    /// Loads and validates settings from the given TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the file cannot be read, exceeds the
    /// size limit, fails to parse, or fails validation.
    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let metadata = fs::metadata(path).map_err(|err| SettingsError::Io {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(SettingsError::TooLarge {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|err| SettingsError::Io {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let settings: Self = toml::from_str(&text).map_err(|err| SettingsError::Parse {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates field values and cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.database_location.trim().is_empty() {
            return Err(SettingsError::Invalid {
                field: "database_location",
                reason: "must not be empty".to_string(),
            });
        }
        validate_time_zone(&self.sql_time_zone)?;
        if self.sequence_suffix.is_empty()
            || !self.sequence_suffix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(SettingsError::Invalid {
                field: "sequence_suffix",
                reason: "must be a non-empty alphanumeric identifier".to_string(),
            });
        }
        if self.sequence_start < 1 {
            return Err(SettingsError::Invalid {
                field: "sequence_start",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.key_generator.trim().is_empty() {
            return Err(SettingsError::Invalid {
                field: "key_generator",
                reason: "must not be empty".to_string(),
            });
        }
        if self.connect_retry_ms == 0 || self.connect_retry_ms > self.connect_timeout_ms {
            return Err(SettingsError::Invalid {
                field: "connect_retry_ms",
                reason: "must be nonzero and no greater than connect_timeout_ms".to_string(),
            });
        }
        Ok(())
    }
}

/// Validates the session time zone string: `UTC` or `±HH:MM`.
fn validate_time_zone(zone: &str) -> Result<(), SettingsError> {
    if zone.eq_ignore_ascii_case("utc") {
        return Ok(());
    }
    let bytes = zone.as_bytes();
    let well_formed = zone.len() == 6
        && (bytes[0] == b'+' || bytes[0] == b'-')
        && bytes[3] == b':'
        && zone[1..3].parse::<u8>().map(|h| h < 24).unwrap_or(false)
        && zone[4..6].parse::<u8>().map(|m| m < 60).unwrap_or(false);
    if well_formed {
        Ok(())
    } else {
        Err(SettingsError::Invalid {
            field: "sql_time_zone",
            reason: format!("'{zone}' is not 'UTC' or a fixed offset '+HH:MM'"),
        })
    }
}
