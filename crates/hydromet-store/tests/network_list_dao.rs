// hydromet-store/tests/network_list_dao.rs
// ============================================================================
// Module: Network List DAO Tests
// Description: Round-trip, gating, and legacy last-modified tests.
// Purpose: Verify entry replacement and the half-hour substitute timestamp.
// Dependencies: hydromet-store, hydromet-core, tempfile
// ============================================================================

//! Round-trip, gating, and legacy last-modified tests.

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

use hydromet_core::DbKey;
use hydromet_core::NetworkList;
use hydromet_core::NetworkListEntry;
use hydromet_store::NetworkListDao;
use hydromet_store::VERSION_5;
use hydromet_store::VERSION_10;
use hydromet_store::VERSION_11;
use hydromet_store::VERSION_15;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// A GOES list with two annotated entries.
fn basin_list() -> NetworkList {
    NetworkList {
        transport_medium_type: Some("goes".to_string()),
        site_name_type_preference: Some("local".to_string()),
        entries: vec![
            NetworkListEntry {
                platform_name: Some("CHERRY-CRK".to_string()),
                description: Some("Cherry Creek gage".to_string()),
                ..NetworkListEntry::new("CE123456")
            },
            NetworkListEntry::new("CE654321"),
        ],
        ..NetworkList::new("upper-basin")
    }
}

// ============================================================================
// SECTION: Round Trips
// ============================================================================

#[test]
fn list_round_trips_with_entries() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = NetworkListDao::new(&session);

    let mut list = basin_list();
    let key = dao.write(&mut list).expect("write");
    assert!(list.last_modify_time.is_some());

    let read_back = dao.read(key).expect("read");
    assert_eq!(read_back.name, "upper-basin");
    assert_eq!(read_back.transport_medium_type.as_deref(), Some("goes"));
    assert_eq!(read_back.entries, list.entries);
}

#[test]
fn rewriting_by_name_replaces_entries_in_full() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = NetworkListDao::new(&session);

    let mut first = basin_list();
    let key = dao.write(&mut first).expect("first write");

    let mut second = basin_list();
    second.entries = vec![NetworkListEntry::new("CE999999")];
    let adopted = dao.write(&mut second).expect("second write");
    assert_eq!(adopted, key);
    assert_eq!(common::count_rows(&db, "NetworkList"), 1);
    assert_eq!(common::count_rows(&db, "NetworkListEntry"), 1);
}

#[test]
fn delete_removes_the_list_and_its_entries() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = NetworkListDao::new(&session);

    let mut list = basin_list();
    dao.write(&mut list).expect("write");
    dao.delete(&mut list).expect("delete");
    assert!(list.id.is_none());
    assert_eq!(common::count_rows(&db, "NetworkList"), 0);
    assert_eq!(common::count_rows(&db, "NetworkListEntry"), 0);
}

#[test]
fn lookup_finds_by_exact_name() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = NetworkListDao::new(&session);
    let mut list = basin_list();
    let key = dao.write(&mut list).expect("write");
    assert_eq!(dao.lookup("upper-basin").expect("lookup"), Some(key));
    assert_eq!(dao.lookup("lower-basin").expect("lookup"), None);
}

// ============================================================================
// SECTION: Version Gating
// ============================================================================

#[test]
fn entry_annotations_are_dropped_below_version_11() {
    let (_dir, db) = common::provisioned(VERSION_10);
    let session = db.session();
    let dao = NetworkListDao::new(&session);

    let mut list = basin_list();
    let key = dao.write(&mut list).expect("write");
    let read_back = dao.read(key).expect("read");
    assert_eq!(read_back.entries.len(), 2);
    assert!(read_back.entries.iter().all(|e| e.platform_name.is_none()));
    assert!(read_back.entries.iter().all(|e| e.description.is_none()));
}

#[test]
fn entry_annotations_round_trip_from_version_11() {
    let (_dir, db) = common::provisioned(VERSION_11);
    let session = db.session();
    let dao = NetworkListDao::new(&session);

    let mut list = basin_list();
    let key = dao.write(&mut list).expect("write");
    let read_back = dao.read(key).expect("read");
    assert_eq!(read_back.entries[0].platform_name.as_deref(), Some("CHERRY-CRK"));
    assert_eq!(
        read_back.entries[0].description.as_deref(),
        Some("Cherry Creek gage")
    );
}

#[test]
fn last_modify_time_is_not_stored_below_version_6() {
    let (_dir, db) = common::provisioned(VERSION_5);
    let session = db.session();
    let dao = NetworkListDao::new(&session);

    let mut list = basin_list();
    let key = dao.write(&mut list).expect("write");
    assert!(list.last_modify_time.is_none());
    let read_back = dao.read(key).expect("read");
    assert!(read_back.last_modify_time.is_none());
}

#[test]
fn legacy_last_modified_substitutes_a_half_hour_boundary() {
    let (_dir, db) = common::provisioned(VERSION_5);
    let session = db.session();
    let dao = NetworkListDao::new(&session);

    // The substitute answers even for keys that do not exist.
    let stored = dao
        .last_modified(DbKey::new(42))
        .expect("query")
        .expect("substitute");
    assert_eq!(stored.unix_timestamp() % 1800, 0);
}
