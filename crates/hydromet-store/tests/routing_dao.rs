// hydromet-store/tests/routing_dao.rs
// ============================================================================
// Module: Routing Spec DAO Tests
// Description: Round-trip, lookup, and cascade tests for routing specs.
// Purpose: Verify case-insensitive naming and data source resolution.
// Dependencies: hydromet-store, hydromet-core, tempfile
// ============================================================================

//! Round-trip, lookup, and cascade tests for routing specs.

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

use std::sync::Arc;

use hydromet_core::DataSource;
use hydromet_core::Property;
use hydromet_core::RoutingSpec;
use hydromet_store::Database;
use hydromet_store::DataSourceDao;
use hydromet_store::RoutingSpecDao;
use hydromet_store::VERSION_15;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes an LRGS data source and returns it with its key set.
fn saved_source(db: &Database) -> DataSource {
    let session = db.session();
    let mut source = DataSource::new("cdadata", "lrgs");
    source.argument = Some("cdadata.wcda.noaa.gov:16003".to_string());
    DataSourceDao::new(&session).write(&mut source).expect("write source");
    source
}

/// A fully populated routing spec retrieving one network list.
fn nightly_spec(source: &DataSource) -> RoutingSpec {
    RoutingSpec {
        data_source: Some(Arc::new(source.clone())),
        enable_equations: true,
        output_format: Some("shef".to_string()),
        output_time_zone: Some("MST".to_string()),
        presentation_group_name: Some("shef-english".to_string()),
        since_time: Some("now - 1 day".to_string()),
        until_time: Some("now".to_string()),
        consumer_type: Some("file".to_string()),
        consumer_arg: Some("/data/shef/nightly.out".to_string()),
        is_production: true,
        network_list_names: vec!["upper-basin".to_string(), "lower-basin".to_string()],
        properties: vec![Property::new("sc:DAPS_STATUS", "false")],
        ..RoutingSpec::new("nightly-shef")
    }
}

// ============================================================================
// SECTION: Round Trips
// ============================================================================

#[test]
fn routing_spec_round_trips_with_children() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let source = saved_source(&db);
    let dao = RoutingSpecDao::new(&session);

    let mut spec = nightly_spec(&source);
    let key = dao.write(&mut spec).expect("write");
    assert!(spec.last_modify_time.is_some());

    let read_back = dao.read(key).expect("read");
    assert_eq!(read_back.name, "nightly-shef");
    assert_eq!(
        read_back.network_list_names,
        vec!["upper-basin".to_string(), "lower-basin".to_string()]
    );
    assert_eq!(read_back.properties, spec.properties);
    assert!(read_back.enable_equations);
    assert!(read_back.is_production);
    assert!(!read_back.use_performance_measurements);
    let resolved = read_back.data_source.expect("data source");
    assert_eq!(resolved.name, "cdadata");
}

#[test]
fn lookup_is_case_insensitive() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let source = saved_source(&db);
    let dao = RoutingSpecDao::new(&session);

    let mut spec = nightly_spec(&source);
    let key = dao.write(&mut spec).expect("write");
    assert_eq!(dao.lookup("NIGHTLY-SHEF").expect("lookup"), Some(key));
    assert_eq!(dao.lookup("Nightly-Shef").expect("lookup"), Some(key));
    assert_eq!(dao.lookup("weekly-shef").expect("lookup"), None);
}

#[test]
fn rewriting_by_name_replaces_children_without_duplicating() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let source = saved_source(&db);
    let dao = RoutingSpecDao::new(&session);

    let mut first = nightly_spec(&source);
    let key = dao.write(&mut first).expect("first write");

    let mut second = nightly_spec(&source);
    second.name = "NIGHTLY-shef".to_string();
    second.network_list_names = vec!["upper-basin".to_string()];
    let adopted = dao.write(&mut second).expect("second write");
    assert_eq!(adopted, key);
    assert_eq!(common::count_rows(&db, "RoutingSpec"), 1);
    assert_eq!(common::count_rows(&db, "RoutingSpecNetworkList"), 1);
}

#[test]
fn delete_cascades_through_lists_and_properties() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let source = saved_source(&db);
    let dao = RoutingSpecDao::new(&session);

    let mut spec = nightly_spec(&source);
    dao.write(&mut spec).expect("write");
    dao.delete(&mut spec).expect("delete");
    assert!(spec.id.is_none());
    assert_eq!(common::count_rows(&db, "RoutingSpec"), 0);
    assert_eq!(common::count_rows(&db, "RoutingSpecNetworkList"), 0);
    assert_eq!(common::count_rows(&db, "RoutingSpecProperty"), 0);
    // The referenced data source is a separate aggregate and survives.
    assert_eq!(common::count_rows(&db, "DataSource"), 1);
}

// ============================================================================
// SECTION: References and Timestamps
// ============================================================================

#[test]
fn data_source_references_share_one_identity() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let source = saved_source(&db);
    let dao = RoutingSpecDao::new(&session);

    let mut one = nightly_spec(&source);
    let mut two = nightly_spec(&source);
    two.name = "weekly-shef".to_string();
    let one_key = dao.write(&mut one).expect("write one");
    let two_key = dao.write(&mut two).expect("write two");

    let first = dao.read(one_key).expect("read one").data_source.expect("source");
    let second = dao.read(two_key).expect("read two").data_source.expect("source");
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn unsaved_data_source_reference_is_stored_as_null() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = RoutingSpecDao::new(&session);

    let mut spec = RoutingSpec {
        data_source: Some(Arc::new(DataSource::new("transient", "lrgs"))),
        ..RoutingSpec::new("orphan-source")
    };
    let key = dao.write(&mut spec).expect("write");
    let read_back = dao.read(key).expect("read");
    assert!(read_back.data_source.is_none());
}

#[test]
fn last_modified_reflects_the_write() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let source = saved_source(&db);
    let dao = RoutingSpecDao::new(&session);

    let mut spec = nightly_spec(&source);
    let key = dao.write(&mut spec).expect("write");
    let stored = dao.last_modified(key).expect("query").expect("some");
    assert_eq!(Some(stored), spec.last_modify_time);
}
