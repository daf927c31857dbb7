// hydromet-store/tests/version_gate.rs
// ============================================================================
// Module: Version Gate Tests
// Description: Marker table probing, fallback, and memoization tests.
// Purpose: Verify the schema version resolves once and resolves right.
// Dependencies: hydromet-store, rusqlite, tempfile
// ============================================================================

//! Marker table probing, fallback, and memoization tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

// ============================================================================
// SECTION: Imports
// ============================================================================

use hydromet_store::DatabaseVersion;
use hydromet_store::VERSION_5;
use hydromet_store::VERSION_6;
use hydromet_store::VERSION_8;
use hydromet_store::VERSION_10;
use hydromet_store::VERSION_15;
use hydromet_store::version::resolve;
use rusqlite::Connection;
use rusqlite::params;

// ============================================================================
// SECTION: Resolution
// ============================================================================

#[test]
fn no_marker_table_falls_back_to_the_floor() {
    let conn = Connection::open_in_memory().expect("open");
    assert_eq!(resolve(&conn), DatabaseVersion::floor());
    assert_eq!(resolve(&conn).version, VERSION_5);
}

#[test]
fn empty_marker_table_falls_back_to_the_floor() {
    let conn = Connection::open_in_memory().expect("open");
    conn.execute_batch(
        "CREATE TABLE DecodesDatabaseVersion (version INTEGER NOT NULL, options VARCHAR(400));",
    )
    .expect("create");
    assert_eq!(resolve(&conn), DatabaseVersion::floor());
}

#[test]
fn legacy_marker_table_answers() {
    let conn = Connection::open_in_memory().expect("open");
    conn.execute_batch(
        "CREATE TABLE DatabaseVersion (version INTEGER NOT NULL, options VARCHAR(400));
         INSERT INTO DatabaseVersion VALUES (6, 'legacy');",
    )
    .expect("seed");
    let resolved = resolve(&conn);
    assert_eq!(resolved.version, VERSION_6);
    assert_eq!(resolved.options, "legacy");
}

#[test]
fn highest_version_row_wins_with_its_paired_options() {
    let conn = Connection::open_in_memory().expect("open");
    conn.execute_batch(
        "CREATE TABLE DecodesDatabaseVersion (version INTEGER NOT NULL, options VARCHAR(400));
         INSERT INTO DecodesDatabaseVersion VALUES (10, 'older');
         INSERT INTO DecodesDatabaseVersion VALUES (15, 'newer');
         INSERT INTO DecodesDatabaseVersion VALUES (12, NULL);",
    )
    .expect("seed");
    let resolved = resolve(&conn);
    assert_eq!(resolved.version, VERSION_15);
    assert_eq!(resolved.options, "newer");
}

#[test]
fn current_marker_table_shadows_the_legacy_one() {
    let conn = Connection::open_in_memory().expect("open");
    conn.execute_batch(
        "CREATE TABLE DecodesDatabaseVersion (version INTEGER NOT NULL, options VARCHAR(400));
         CREATE TABLE DatabaseVersion (version INTEGER NOT NULL, options VARCHAR(400));
         INSERT INTO DecodesDatabaseVersion VALUES (10, '');
         INSERT INTO DatabaseVersion VALUES (15, 'stale');",
    )
    .expect("seed");
    assert_eq!(resolve(&conn).version, VERSION_10);
}

#[test]
fn null_options_resolve_to_an_empty_string() {
    let conn = Connection::open_in_memory().expect("open");
    conn.execute_batch(
        "CREATE TABLE DecodesDatabaseVersion (version INTEGER NOT NULL, options VARCHAR(400));
         INSERT INTO DecodesDatabaseVersion VALUES (11, NULL);",
    )
    .expect("seed");
    assert_eq!(resolve(&conn).options, "");
}

// ============================================================================
// SECTION: Provisioned Databases
// ============================================================================

#[test]
fn provisioned_versions_resolve_to_themselves() {
    for version in [VERSION_5, VERSION_6, VERSION_8, VERSION_10, VERSION_15] {
        let (_dir, db) = common::provisioned(version);
        assert_eq!(db.version().version, version, "version {version}");
    }
}

#[test]
fn provisioning_writes_the_era_appropriate_marker() {
    let (_dir, db) = common::provisioned(VERSION_6);
    let session = db.session();
    let guard = session.conn().expect("lock");
    let legacy: i64 = guard
        .query_row("SELECT COUNT(*) FROM DatabaseVersion", [], |row| row.get(0))
        .expect("count");
    assert_eq!(legacy, 1);
    assert!(
        guard
            .query_row("SELECT 1 FROM DecodesDatabaseVersion", [], |row| row
                .get::<_, i64>(0))
            .is_err(),
        "current marker table must not exist at version 6"
    );
}

#[test]
fn resolved_version_is_memoized_for_the_connection_lifetime() {
    let (_dir, db) = common::provisioned(VERSION_10);
    let session = db.session();
    {
        let guard = session.conn().expect("lock");
        guard
            .execute(
                "INSERT INTO DecodesDatabaseVersion (version, options) VALUES (?1, ?2)",
                params![VERSION_15, ""],
            )
            .expect("insert");
    }
    assert_eq!(db.version().version, VERSION_10);
}
