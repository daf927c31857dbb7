// hydromet-store/tests/reference_dao.rs
// ============================================================================
// Module: Reference DAO Tests
// Description: Tests for sites, enumerations, units, and data sources.
// Purpose: Verify the flat reference aggregates upsert and delete cleanly.
// Dependencies: hydromet-store, hydromet-core, tempfile
// ============================================================================

//! Tests for sites, enumerations, units, and data sources.

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

use hydromet_core::DataSource;
use hydromet_core::EngineeringUnit;
use hydromet_core::EnumValue;
use hydromet_core::Enumeration;
use hydromet_core::Site;
use hydromet_core::SiteName;
use hydromet_core::UnitConverter;
use hydromet_store::DataSourceDao;
use hydromet_store::EnumDao;
use hydromet_store::SiteDao;
use hydromet_store::UnitDao;
use hydromet_store::VERSION_15;

// ============================================================================
// SECTION: Sites
// ============================================================================

#[test]
fn site_round_trips_with_ordered_names() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = SiteDao::new(&session);

    let mut site = Site {
        names: vec![
            SiteName::new("local", "CHERRY-CRK"),
            SiteName::new("usgs", "06713500"),
        ],
        latitude: Some(39.65),
        longitude: Some(-104.85),
        elevation: Some(1650.0),
        time_zone: Some("America/Denver".to_string()),
        country: Some("US".to_string()),
        state: Some("CO".to_string()),
        description: Some("Cherry Creek at Denver".to_string()),
        ..Site::default()
    };
    let key = dao.write(&mut site).expect("write");

    let read_back = dao.read(key).expect("read");
    assert_eq!(read_back, site);
    assert_eq!(read_back.display_name(), "CHERRY-CRK");
    assert_eq!(
        dao.lookup(&SiteName::new("usgs", "06713500")).expect("lookup"),
        Some(key)
    );
}

#[test]
fn rewriting_a_site_by_preferred_name_adopts_the_row() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = SiteDao::new(&session);

    let mut first = Site {
        names: vec![SiteName::new("local", "ADOPTME")],
        ..Site::default()
    };
    let key = dao.write(&mut first).expect("first write");

    let mut second = Site {
        names: vec![SiteName::new("local", "ADOPTME"), SiteName::new("usgs", "123")],
        description: Some("revised".to_string()),
        ..Site::default()
    };
    let adopted = dao.write(&mut second).expect("second write");
    assert_eq!(adopted, key);
    assert_eq!(common::count_rows(&db, "Site"), 1);
    assert_eq!(common::count_rows(&db, "SiteName"), 2);
}

#[test]
fn deleting_a_site_removes_its_names() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = SiteDao::new(&session);

    let mut site = Site {
        names: vec![SiteName::new("local", "GONE")],
        ..Site::default()
    };
    dao.write(&mut site).expect("write");
    dao.delete(&mut site).expect("delete");
    assert!(site.id.is_none());
    assert_eq!(common::count_rows(&db, "Site"), 0);
    assert_eq!(common::count_rows(&db, "SiteName"), 0);
}

// ============================================================================
// SECTION: Enumerations
// ============================================================================

#[test]
fn enumeration_round_trips_in_sort_order() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = EnumDao::new(&session);

    let mut enumeration = Enumeration {
        values: vec![
            EnumValue {
                sort_number: Some(2),
                description: Some("Iridium SBD".to_string()),
                ..EnumValue::new("iridium")
            },
            EnumValue {
                sort_number: Some(1),
                ..EnumValue::new("goes")
            },
        ],
        ..Enumeration::new("TransportMediumType")
    };
    let key = dao.write(&mut enumeration).expect("write");

    let read_back = dao.read(key).expect("read");
    assert_eq!(read_back.values.len(), 2);
    assert_eq!(read_back.values[0].value, "goes");
    assert_eq!(read_back.values[1].value, "iridium");
    assert_eq!(dao.lookup("TransportMediumType").expect("lookup"), Some(key));
}

#[test]
fn rewriting_an_enumeration_replaces_its_values() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = EnumDao::new(&session);

    let mut enumeration = Enumeration {
        values: vec![EnumValue::new("DECODES")],
        ..Enumeration::new("ScriptType")
    };
    let key = dao.write(&mut enumeration).expect("first write");

    let mut second = Enumeration {
        values: vec![EnumValue::new("DECODES"), EnumValue::new("EDL")],
        ..Enumeration::new("ScriptType")
    };
    assert_eq!(dao.write(&mut second).expect("second write"), key);
    assert_eq!(common::count_rows(&db, "Enum"), 1);
    assert_eq!(common::count_rows(&db, "EnumValue"), 2);

    dao.delete(&mut second).expect("delete");
    assert_eq!(common::count_rows(&db, "EnumValue"), 0);
}

// ============================================================================
// SECTION: Engineering Units
// ============================================================================

#[test]
fn unit_writes_are_upserts_by_abbreviation() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = UnitDao::new(&session);

    let mut unit = EngineeringUnit {
        name: Some("feet".to_string()),
        family: Some("english".to_string()),
        measures: Some("length".to_string()),
        ..EngineeringUnit::new("ft")
    };
    dao.write(&unit).expect("insert");
    unit.name = Some("foot".to_string());
    dao.write(&unit).expect("upsert");

    assert_eq!(common::count_rows(&db, "EngineeringUnit"), 1);
    let read_back = dao.read("ft").expect("read").expect("some");
    assert_eq!(read_back.name.as_deref(), Some("foot"));
    assert!(dao.read("cms").expect("read").is_none());

    dao.delete("ft").expect("delete");
    assert_eq!(common::count_rows(&db, "EngineeringUnit"), 0);
}

#[test]
fn standalone_converter_listing_excludes_raw_converters() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = UnitDao::new(&session);

    let mut standalone = UnitConverter::new("ft", "m", "linear");
    standalone.coefficients[0] = 0.3048;
    dao.write_converter(&mut standalone).expect("write standalone");

    let mut raw = UnitConverter::new("raw", "ft", "linear");
    dao.write_converter(&mut raw).expect("write raw");

    let listed = dao.list_converters().expect("list");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].from_abbr, "ft");
    assert_eq!(listed[0].to_abbr, "m");

    dao.delete_converter(&mut standalone).expect("delete");
    assert!(standalone.id.is_none());
    assert_eq!(dao.list_converters().expect("list").len(), 0);
}

// ============================================================================
// SECTION: Data Sources
// ============================================================================

#[test]
fn data_source_upserts_by_name_and_lists_ordered() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = DataSourceDao::new(&session);

    let mut hub = DataSource::new("hub", "lrgs");
    let key = dao.write(&mut hub).expect("write");

    let mut again = DataSource::new("hub", "lrgs");
    again.argument = Some("hub.example.gov:16003".to_string());
    assert_eq!(dao.write(&mut again).expect("rewrite"), key);
    assert_eq!(common::count_rows(&db, "DataSource"), 1);

    let mut archive = DataSource::new("archive", "directory");
    dao.write(&mut archive).expect("write archive");
    let listed = dao.list().expect("list");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].name, "archive");
    assert_eq!(listed[1].name, "hub");

    dao.delete(&mut again).expect("delete");
    assert!(again.id.is_none());
    assert_eq!(dao.lookup("hub").expect("lookup"), None);
}
