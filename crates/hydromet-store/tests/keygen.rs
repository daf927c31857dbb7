// hydromet-store/tests/keygen.rs
// ============================================================================
// Module: Key Generation Tests
// Description: Sequence allocation, reset, and registry resolution tests.
// Purpose: Verify surrogate keys are unique, resettable, and fail loudly.
// Dependencies: hydromet-store, hydromet-core, rusqlite, tempfile
// ============================================================================

//! Sequence allocation, reset, and registry resolution tests.

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

use std::collections::HashSet;

use hydromet_store::DbError;
use hydromet_store::KeyGeneratorRegistry;
use hydromet_store::SEQUENCE_STRATEGY;
use hydromet_store::SequenceKeyGenerator;
use hydromet_store::VERSION_15;

// ============================================================================
// SECTION: Allocation
// ============================================================================

#[test]
fn allocated_keys_are_unique_and_ascending() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let guard = session.conn().expect("lock");
    let keygen = &session.context().keygen;
    let mut seen = HashSet::new();
    let mut previous = 0_i64;
    for _ in 0..50 {
        let key = keygen.key("Site", &guard).expect("key");
        assert!(seen.insert(key.as_raw()), "duplicate key issued");
        assert!(key.as_raw() > previous);
        previous = key.as_raw();
    }
}

#[test]
fn sequences_are_independent_per_table() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let guard = session.conn().expect("lock");
    let keygen = &session.context().keygen;
    let site = keygen.key("Site", &guard).expect("site key");
    let platform = keygen.key("Platform", &guard).expect("platform key");
    assert_eq!(site.as_raw(), 1);
    assert_eq!(platform.as_raw(), 1);
}

#[test]
fn reset_restarts_at_the_configured_start() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let guard = session.conn().expect("lock");
    let keygen = &session.context().keygen;
    for _ in 0..10 {
        keygen.key("Enum", &guard).expect("key");
    }
    keygen.reset("Enum", &guard).expect("reset");
    let next = keygen.key("Enum", &guard).expect("key after reset");
    assert_eq!(next.as_raw(), 1);
}

#[test]
fn missing_sequence_is_fatal() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let guard = session.conn().expect("lock");
    let keygen = &session.context().keygen;
    let err = keygen.key("NoSuchTable", &guard).expect_err("must fail");
    assert!(matches!(err, DbError::KeyGeneration(_)));
    let err = keygen.reset("NoSuchTable", &guard).expect_err("must fail");
    assert!(matches!(err, DbError::KeyGeneration(_)));
}

// ============================================================================
// SECTION: Naming and Registry
// ============================================================================

#[test]
fn equipment_model_uses_the_irregular_sequence_name() {
    let generator = SequenceKeyGenerator::new("IdSeq", 1);
    assert_eq!(generator.sequence_name("EquipmentModel"), "EquipmentIdSeq");
    assert_eq!(generator.sequence_name("Site"), "SiteIdSeq");
}

#[test]
fn registry_resolves_the_default_strategy() {
    let registry = KeyGeneratorRegistry::with_defaults("IdSeq", 1);
    assert!(registry.resolve(SEQUENCE_STRATEGY).is_ok());
    let err = registry.resolve("oracle-rowid").expect_err("must fail");
    assert!(matches!(err, DbError::Invalid(_)));
}
