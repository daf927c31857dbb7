// hydromet-store/src/version.rs
// ============================================================================
// Module: Schema Version Gate
// Description: Probes and represents the database schema version.
// Purpose: Let every statement include exactly the columns its era defines.
// Dependencies: rusqlite, tracing
// ============================================================================

//! ## Overview
//! Deployed databases span a decade of schema revisions. The version lives in
//! a one-row marker table whose own name changed across eras:
//! `DecodesDatabaseVersion` (current) or `DatabaseVersion` (legacy). The gate
//! probes both, takes the highest version row, and falls back to the floor
//! version when neither table answers. Resolution never fails; it degrades.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Connection;
use tracing::warn;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Floor version assumed when no marker table exists.
pub const VERSION_5: i32 = 5;
/// Adds `timeAdjustment`/`preamble` to TransportMedium, `lastModifyTime` to
/// NetworkList, the property tables, and `maxDecimals` to DataPresentation.
pub const VERSION_6: i32 = 6;
/// Adds `platformDesignator`, TransportMedium `timeZone`, and PlatformSensor
/// USGS DDNO.
pub const VERSION_7: i32 = 7;
/// No column changes relevant to this layer.
pub const VERSION_8: i32 = 8;
/// No column changes relevant to this layer.
pub const VERSION_9: i32 = 9;
/// Adds `minValue`/`maxValue` to DataPresentation.
pub const VERSION_10: i32 = 10;
/// Adds the TransportMedium logger/serial columns and NetworkListEntry
/// `platform_name`/`description`.
pub const VERSION_11: i32 = 11;
/// No column changes relevant to this layer.
pub const VERSION_12: i32 = 12;
/// No column changes relevant to this layer.
pub const VERSION_13: i32 = 13;
/// No column changes relevant to this layer.
pub const VERSION_14: i32 = 14;
/// Current version.
pub const VERSION_15: i32 = 15;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Resolved schema version plus free-form option flags stored beside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseVersion {
    /// Numeric schema version, at least [`VERSION_5`].
    pub version: i32,
    /// Option flags recorded with the winning version row.
    pub options: String,
}

impl DatabaseVersion {
    /// Floor version with empty options.
    #[must_use]
    pub fn floor() -> Self {
        Self {
            version: VERSION_5,
            options: String::new(),
        }
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves the schema version for an open connection.
///
/// Probes `DecodesDatabaseVersion` first, then the legacy `DatabaseVersion`
/// table. The highest version row wins and its paired options are retained.
/// When neither probe answers, the floor version is returned with a warning.
#[must_use]
pub fn resolve(conn: &Connection) -> DatabaseVersion {
    for table in ["DecodesDatabaseVersion", "DatabaseVersion"] {
        match probe(conn, table) {
            Ok(Some(found)) => return found,
            Ok(None) => {
                warn!(table, "version marker table is empty");
            }
            Err(err) => {
                warn!(table, error = %err, "version marker probe failed");
            }
        }
    }
    warn!(
        fallback = VERSION_5,
        "no schema version marker found, assuming floor version"
    );
    DatabaseVersion::floor()
}

/// Reads the highest version row from one marker table.
fn probe(conn: &Connection, table: &str) -> Result<Option<DatabaseVersion>, rusqlite::Error> {
    let sql = format!("SELECT version, options FROM {table}");
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    let mut best: Option<DatabaseVersion> = None;
    while let Some(row) = rows.next()? {
        let version: i32 = row.get(0)?;
        let options: Option<String> = row.get(1)?;
        if best.as_ref().is_none_or(|b| version > b.version) {
            best = Some(DatabaseVersion {
                version,
                options: options.unwrap_or_default(),
            });
        }
    }
    Ok(best)
}
