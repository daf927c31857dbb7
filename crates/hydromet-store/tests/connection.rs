// hydromet-store/tests/connection.rs
// ============================================================================
// Module: Connection Coordinator Tests
// Description: Connect retry, session checkout, and close behavior tests.
// Purpose: Verify the retry budget, lease pooling, and credential policy.
// Dependencies: hydromet-store, hydromet-config, rusqlite, tempfile
// ============================================================================

//! Connect retry, session checkout, and close behavior tests.

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

use std::time::Instant;

use hydromet_config::Settings;
use hydromet_store::Database;
use hydromet_store::DbError;
use hydromet_store::VERSION_15;
use tempfile::TempDir;

// ============================================================================
// SECTION: Connect
// ============================================================================

#[test]
fn connect_fails_after_the_retry_budget_expires() {
    let dir = TempDir::new().expect("tempdir");
    let settings = Settings {
        // A directory cannot be opened as a database file.
        database_location: dir.path().to_string_lossy().into_owned(),
        connect_timeout_ms: 300,
        connect_retry_ms: 100,
        ..Settings::default()
    };
    let started = Instant::now();
    let err = Database::connect(settings).expect_err("must fail");
    assert!(matches!(err, DbError::Connect(_)));
    assert!(started.elapsed().as_millis() < 5_000, "budget not honored");
}

#[test]
fn connect_rejects_unusable_settings() {
    let settings = Settings {
        database_location: String::new(),
        ..Settings::default()
    };
    let err = Database::connect(settings).expect_err("must fail");
    assert!(matches!(err, DbError::Connect(_)));
}

#[test]
fn disabled_os_trust_without_credentials_refuses_to_connect() {
    let dir = TempDir::new().expect("tempdir");
    let settings = Settings {
        database_location: dir.path().join("db.sqlite").to_string_lossy().into_owned(),
        trust_os_auth: false,
        auth_file: None,
        ..Settings::default()
    };
    let err = Database::connect(settings).expect_err("must fail");
    match err {
        DbError::Connect(message) => {
            assert!(message.contains("credential setup"), "{message}");
        }
        other => panic!("unexpected error {other}"),
    }
}

// ============================================================================
// SECTION: Sessions
// ============================================================================

#[test]
fn checked_out_sessions_are_isolated_from_the_primary() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let primary = db.session();
    let _held = primary.conn().expect("hold primary");

    // With the primary locked, a checked-out session must still answer.
    let lease = db.checkout_session().expect("checkout");
    let count: i64 = {
        let guard = lease.session().conn().expect("lock");
        guard
            .query_row("SELECT COUNT(*) FROM Site", [], |row| row.get(0))
            .expect("count")
    };
    assert_eq!(count, 0);
}

#[test]
fn leased_connections_return_to_the_pool() {
    let (_dir, db) = common::provisioned(VERSION_15);
    {
        let lease = db.checkout_session().expect("checkout");
        lease
            .session()
            .conn()
            .expect("lock")
            .execute_batch("CREATE TEMP TABLE lease_marker (x INTEGER);")
            .expect("create temp");
    }
    // The same physical connection comes back, temp table and all.
    let lease = db.checkout_session().expect("checkout again");
    let count: i64 = lease
        .session()
        .conn()
        .expect("lock")
        .query_row("SELECT COUNT(*) FROM lease_marker", [], |row| row.get(0))
        .expect("temp table survived");
    assert_eq!(count, 0);
}

#[test]
fn sessions_share_one_store_context() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    assert_eq!(session.context().version.version, VERSION_15);
    let lease = db.checkout_session().expect("checkout");
    assert_eq!(lease.session().context().version.version, VERSION_15);
}

// ============================================================================
// SECTION: Close
// ============================================================================

#[test]
fn close_is_idempotent_and_stops_checkouts() {
    let (_dir, db) = common::provisioned(VERSION_15);
    db.close();
    db.close();
    let err = db.checkout_session().expect_err("must fail after close");
    assert!(matches!(err, DbError::Connect(_)));
}
