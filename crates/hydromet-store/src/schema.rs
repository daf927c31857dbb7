// hydromet-store/src/schema.rs
// ============================================================================
// Module: Schema Provisioning
// Description: Creates the versioned schema family at any supported version.
// Purpose: Stand-in for the legacy SQL install scripts; bootstrap and tests.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! Provisions an empty database at an exact historical schema version,
//! including the version marker row and the per-table sequence counter
//! tables the key generator advances. Version 5 databases predate the marker
//! table entirely; versions 6 through 9 carry the legacy `DatabaseVersion`
//! marker; version 10 onward use `DecodesDatabaseVersion`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Connection;
use rusqlite::params;

use crate::error::DbError;
use crate::version::VERSION_5;
use crate::version::VERSION_6;
use crate::version::VERSION_7;
use crate::version::VERSION_10;
use crate::version::VERSION_11;
use crate::version::VERSION_15;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tables whose surrogate keys come from sequence objects.
const KEYED_TABLES: &[&str] = &[
    "Site",
    "Platform",
    "PlatformConfig",
    "DecodesScript",
    "UnitConverter",
    "NetworkList",
    "RoutingSpec",
    "DataSource",
    "PresentationGroup",
    "DataPresentation",
    "Enum",
];

// ============================================================================
// SECTION: Provisioning
// ============================================================================

/// Provisions an empty database at the given schema version.
///
/// Creates every table with exactly the columns that version defines, the
/// version marker row (none below version 6), and a sequence counter table
/// per keyed table, each starting so the first allocated key is 1.
///
/// # Errors
///
/// Returns [`DbError::Invalid`] for an unsupported version, or
/// [`DbError::Statement`] when DDL execution fails.
pub fn provision(conn: &Connection, version: i32) -> Result<(), DbError> {
    if !(VERSION_5..=VERSION_15).contains(&version) {
        return Err(DbError::Invalid(format!(
            "unsupported schema version {version}"
        )));
    }
    conn.execute_batch(&build_ddl(version))
        .map_err(|err| DbError::Statement(format!("schema provisioning failed: {err}")))?;
    write_marker(conn, version)?;
    for table in KEYED_TABLES {
        let seq = format!("{table}IdSeq");
        conn.execute_batch(&format!(
            "CREATE TABLE {seq} (value INTEGER NOT NULL);
             INSERT INTO {seq} (value) VALUES (0);"
        ))
        .map_err(|err| DbError::Statement(format!("sequence provisioning failed: {err}")))?;
    }
    Ok(())
}

/// Writes the era-appropriate version marker row.
fn write_marker(conn: &Connection, version: i32) -> Result<(), DbError> {
    let table = if version < VERSION_6 {
        return Ok(());
    } else if version < VERSION_10 {
        "DatabaseVersion"
    } else {
        "DecodesDatabaseVersion"
    };
    conn.execute_batch(&format!(
        "CREATE TABLE {table} (version INTEGER NOT NULL, options TEXT);"
    ))
    .map_err(|err| DbError::Statement(format!("marker provisioning failed: {err}")))?;
    conn.execute(
        &format!("INSERT INTO {table} (version, options) VALUES (?1, ?2)"),
        params![version, ""],
    )
    .map_err(|err| DbError::Statement(format!("marker row insert failed: {err}")))?;
    Ok(())
}

// ============================================================================
// SECTION: DDL Generation
// ============================================================================

/// Builds the full DDL batch for one schema version.
fn build_ddl(version: i32) -> String {
    let mut ddl = String::new();

    ddl.push_str(
        "CREATE TABLE Site (
            id INTEGER PRIMARY KEY,
            latitude REAL,
            longitude REAL,
            elevation REAL,
            timeZone TEXT,
            country TEXT,
            state_abbr TEXT,
            description TEXT
        );
        CREATE TABLE SiteName (
            siteId INTEGER NOT NULL,
            nameType TEXT NOT NULL,
            siteName TEXT NOT NULL
        );",
    );

    ddl.push_str(
        "CREATE TABLE Platform (
            id INTEGER PRIMARY KEY,
            agency TEXT,
            isProduction TEXT NOT NULL,
            siteId INTEGER,
            configId INTEGER,
            description TEXT,
            lastModifyTime TEXT,
            expiration TEXT",
    );
    if version >= VERSION_7 {
        ddl.push_str(",\n            platformDesignator TEXT");
    }
    ddl.push_str("\n        );");

    ddl.push_str(
        "CREATE TABLE TransportMedium (
            platformId INTEGER NOT NULL,
            mediumType TEXT NOT NULL,
            mediumId TEXT NOT NULL,
            scriptName TEXT,
            channelNum INTEGER,
            assignedTime INTEGER,
            transmitWindow INTEGER,
            transmitInterval INTEGER,
            equipmentId INTEGER",
    );
    if version >= VERSION_6 {
        ddl.push_str(
            ",\n            timeAdjustment INTEGER,
            preamble TEXT",
        );
    }
    if version >= VERSION_7 {
        ddl.push_str(",\n            timeZone TEXT");
    }
    if version >= VERSION_11 {
        ddl.push_str(
            ",\n            loggerType TEXT,
            baud INTEGER,
            stopBits INTEGER,
            parity TEXT,
            dataBits INTEGER,
            doLogin TEXT,
            username TEXT,
            password TEXT",
        );
    }
    ddl.push_str("\n        );");

    ddl.push_str(
        "CREATE TABLE PlatformSensor (
            platformId INTEGER NOT NULL,
            sensorNumber INTEGER NOT NULL,
            siteId INTEGER",
    );
    if version >= VERSION_7 {
        ddl.push_str(",\n            dd_nu INTEGER");
    }
    ddl.push_str("\n        );");

    if version >= VERSION_6 {
        ddl.push_str(
            "CREATE TABLE PlatformProperty (
                platformId INTEGER NOT NULL,
                name TEXT NOT NULL,
                value TEXT NOT NULL
            );
            CREATE TABLE PlatformSensorProperty (
                platformId INTEGER NOT NULL,
                sensorNumber INTEGER NOT NULL,
                name TEXT NOT NULL,
                value TEXT NOT NULL
            );",
        );
    }

    ddl.push_str(
        "CREATE TABLE PlatformConfig (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT
        );
        CREATE TABLE ConfigSensor (
            configId INTEGER NOT NULL,
            sensorNumber INTEGER NOT NULL,
            sensorName TEXT NOT NULL,
            recordingMode TEXT,
            recordingInterval INTEGER,
            absMin REAL,
            absMax REAL
        );
        CREATE TABLE DecodesScript (
            id INTEGER PRIMARY KEY,
            configId INTEGER NOT NULL,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            dataOrder TEXT
        );
        CREATE TABLE FormatStatement (
            decodesScriptId INTEGER NOT NULL,
            sequenceNum INTEGER NOT NULL,
            label TEXT NOT NULL,
            format TEXT
        );
        CREATE TABLE ScriptSensor (
            decodesScriptId INTEGER NOT NULL,
            sensorNumber INTEGER NOT NULL,
            unitConverterId INTEGER
        );
        CREATE TABLE UnitConverter (
            id INTEGER PRIMARY KEY,
            fromUnitsAbbr TEXT NOT NULL,
            toUnitsAbbr TEXT NOT NULL,
            algorithm TEXT NOT NULL,
            a REAL, b REAL, c REAL, d REAL, e REAL, f REAL
        );",
    );

    ddl.push_str(
        "CREATE TABLE NetworkList (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            transportMediumType TEXT,
            siteNameTypePreference TEXT",
    );
    if version >= VERSION_6 {
        ddl.push_str(",\n            lastModifyTime TEXT");
    }
    ddl.push_str("\n        );");

    ddl.push_str(
        "CREATE TABLE NetworkListEntry (
            networkListId INTEGER NOT NULL,
            transportId TEXT NOT NULL",
    );
    if version >= VERSION_11 {
        ddl.push_str(
            ",\n            platform_name TEXT,
            description TEXT",
        );
    }
    ddl.push_str("\n        );");

    ddl.push_str(
        "CREATE TABLE RoutingSpec (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            dataSourceId INTEGER,
            enableEquations TEXT NOT NULL,
            usePerformanceMeasurements TEXT NOT NULL,
            outputFormat TEXT,
            outputTimeZone TEXT,
            presentationGroupName TEXT,
            sinceTime TEXT,
            untilTime TEXT,
            consumerType TEXT,
            consumerArg TEXT,
            lastModifyTime TEXT,
            isProduction TEXT NOT NULL
        );
        CREATE TABLE RoutingSpecNetworkList (
            routingSpecId INTEGER NOT NULL,
            networkListName TEXT NOT NULL
        );
        CREATE TABLE RoutingSpecProperty (
            routingSpecId INTEGER NOT NULL,
            name TEXT NOT NULL,
            value TEXT NOT NULL
        );
        CREATE TABLE DataSource (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            dataSourceType TEXT NOT NULL,
            dataSourceArg TEXT
        );",
    );

    ddl.push_str(
        "CREATE TABLE PresentationGroup (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            inheritsFrom TEXT,
            lastModifyTime TEXT,
            isProduction TEXT NOT NULL
        );",
    );

    ddl.push_str(
        "CREATE TABLE DataPresentation (
            id INTEGER PRIMARY KEY,
            groupId INTEGER NOT NULL,
            dataType TEXT NOT NULL,
            unitAbbr TEXT",
    );
    if version >= VERSION_6 {
        ddl.push_str(",\n            maxDecimals INTEGER");
    }
    if version >= VERSION_10 {
        ddl.push_str(
            ",\n            minValue REAL,
            maxValue REAL",
        );
    }
    ddl.push_str("\n        );");

    ddl.push_str(
        "CREATE TABLE RoundingRule (
            dataPresentationId INTEGER NOT NULL,
            upperLimit REAL,
            sigDigits INTEGER NOT NULL
        );
        CREATE TABLE Enum (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );
        CREATE TABLE EnumValue (
            enumId INTEGER NOT NULL,
            enumValue TEXT NOT NULL,
            description TEXT,
            sortNumber INTEGER
        );
        CREATE TABLE EngineeringUnit (
            unitAbbr TEXT PRIMARY KEY,
            name TEXT,
            family TEXT,
            measures TEXT
        );",
    );

    ddl
}
