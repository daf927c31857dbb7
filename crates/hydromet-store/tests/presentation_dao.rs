// hydromet-store/tests/presentation_dao.rs
// ============================================================================
// Module: Presentation Group DAO Tests
// Description: Round-trip, gating, and cleanup tests for presentation groups.
// Purpose: Verify rounding rule replacement and version-gated columns.
// Dependencies: hydromet-store, hydromet-core, tempfile
// ============================================================================

//! Round-trip, gating, and cleanup tests for presentation groups.

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

use hydromet_core::DataPresentation;
use hydromet_core::PresentationGroup;
use hydromet_core::RoundingRule;
use hydromet_store::PresentationGroupDao;
use hydromet_store::VERSION_5;
use hydromet_store::VERSION_6;
use hydromet_store::VERSION_15;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// A group presenting stage in feet with two rounding rules.
fn english_group() -> PresentationGroup {
    PresentationGroup {
        inherits_from: Some("default".to_string()),
        is_production: true,
        presentations: vec![DataPresentation {
            data_type: "HG".to_string(),
            unit_abbr: Some("ft".to_string()),
            max_decimals: Some(2),
            min_value: Some(-5.0),
            max_value: Some(100.0),
            rounding_rules: vec![
                RoundingRule {
                    upper_limit: Some(10.0),
                    sig_digits: 3,
                },
                RoundingRule {
                    upper_limit: None,
                    sig_digits: 5,
                },
            ],
            ..DataPresentation::default()
        }],
        ..PresentationGroup::new("shef-english")
    }
}

// ============================================================================
// SECTION: Round Trips
// ============================================================================

#[test]
fn group_round_trips_with_rules_at_the_current_version() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = PresentationGroupDao::new(&session);

    let mut group = english_group();
    let key = dao.write(&mut group).expect("write");
    assert!(group.presentations[0].id.is_some());

    let read_back = dao.read(key).expect("read");
    assert_eq!(read_back.name, "shef-english");
    assert_eq!(read_back.inherits_from.as_deref(), Some("default"));
    assert_eq!(read_back.presentations.len(), 1);
    let presentation = &read_back.presentations[0];
    assert_eq!(presentation.max_decimals, Some(2));
    assert_eq!(presentation.min_value, Some(-5.0));
    assert_eq!(presentation.max_value, Some(100.0));
    // NULL upper limits sort first under SQLite's ordering.
    assert_eq!(presentation.rounding_rules.len(), 2);
    assert!(presentation.rounding_rules.iter().any(|r| r.sig_digits == 3));
    assert!(presentation.rounding_rules.iter().any(|r| r.upper_limit.is_none()));
}

#[test]
fn rewriting_replaces_presentations_and_rules_in_full() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = PresentationGroupDao::new(&session);

    let mut group = english_group();
    let key = dao.write(&mut group).expect("first write");

    let mut group = english_group();
    group.presentations[0].rounding_rules.truncate(1);
    let adopted = dao.write(&mut group).expect("second write");
    assert_eq!(adopted, key);
    assert_eq!(common::count_rows(&db, "PresentationGroup"), 1);
    assert_eq!(common::count_rows(&db, "DataPresentation"), 1);
    assert_eq!(common::count_rows(&db, "RoundingRule"), 1);
}

#[test]
fn delete_cascades_through_presentations_and_rules() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = PresentationGroupDao::new(&session);

    let mut group = english_group();
    dao.write(&mut group).expect("write");
    dao.delete(&mut group).expect("delete");
    assert!(group.id.is_none());
    assert_eq!(common::count_rows(&db, "PresentationGroup"), 0);
    assert_eq!(common::count_rows(&db, "DataPresentation"), 0);
    assert_eq!(common::count_rows(&db, "RoundingRule"), 0);
}

// ============================================================================
// SECTION: Version Gating
// ============================================================================

#[test]
fn decimals_and_range_are_dropped_below_version_6() {
    let (_dir, db) = common::provisioned(VERSION_5);
    let session = db.session();
    let dao = PresentationGroupDao::new(&session);

    let mut group = english_group();
    let key = dao.write(&mut group).expect("write");
    let read_back = dao.read(key).expect("read");
    let presentation = &read_back.presentations[0];
    assert_eq!(presentation.max_decimals, None);
    assert_eq!(presentation.min_value, None);
    assert_eq!(presentation.max_value, None);
    // The rounding rules themselves predate no schema version.
    assert_eq!(presentation.rounding_rules.len(), 2);
}

#[test]
fn range_alone_is_dropped_between_versions_6_and_10() {
    let (_dir, db) = common::provisioned(VERSION_6);
    let session = db.session();
    let dao = PresentationGroupDao::new(&session);

    let mut group = english_group();
    let key = dao.write(&mut group).expect("write");
    let read_back = dao.read(key).expect("read");
    let presentation = &read_back.presentations[0];
    assert_eq!(presentation.max_decimals, Some(2));
    assert_eq!(presentation.min_value, None);
    assert_eq!(presentation.max_value, None);
}

#[test]
fn lookup_and_last_modified_answer() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = PresentationGroupDao::new(&session);

    let mut group = english_group();
    let key = dao.write(&mut group).expect("write");
    assert_eq!(dao.lookup("shef-english").expect("lookup"), Some(key));
    assert_eq!(dao.lookup("metric").expect("lookup"), None);
    let stored = dao.last_modified(key).expect("query").expect("some");
    assert_eq!(Some(stored), group.last_modify_time);
}
