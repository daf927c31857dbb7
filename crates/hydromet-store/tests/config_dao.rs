// hydromet-store/tests/config_dao.rs
// ============================================================================
// Module: Config DAO Tests
// Description: Round-trip and cascade tests for platform configurations.
// Purpose: Verify script rekeying and two-step unit converter cleanup.
// Dependencies: hydromet-store, hydromet-core, tempfile
// ============================================================================

//! Round-trip and cascade tests for platform configurations.

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

use hydromet_core::ConfigSensor;
use hydromet_core::DecodingScript;
use hydromet_core::FormatStatement;
use hydromet_core::PlatformConfig;
use hydromet_core::ScriptSensor;
use hydromet_core::UnitConverter;
use hydromet_store::ConfigDao;
use hydromet_store::VERSION_15;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// A configuration with one sensor and one script owning a converter.
fn sutron_config() -> PlatformConfig {
    let mut converter = UnitConverter::new("raw", "ft", "linear");
    converter.coefficients[0] = 0.01;
    converter.coefficients[1] = -2.5;
    PlatformConfig {
        description: Some("Sutron 8200 standard".to_string()),
        sensors: vec![ConfigSensor {
            sensor_number: 1,
            sensor_name: "stage".to_string(),
            recording_mode: Some('F'),
            recording_interval: Some(900),
            abs_min: Some(0.0),
            abs_max: Some(40.0),
        }],
        scripts: vec![DecodingScript {
            name: "ST".to_string(),
            script_type: "DECODES".to_string(),
            data_order: Some('D'),
            format_statements: vec![
                FormatStatement {
                    sequence_num: 0,
                    label: "start".to_string(),
                    format: "4x, F(S1, B, 4, 1)".to_string(),
                },
                FormatStatement {
                    sequence_num: 1,
                    label: "next".to_string(),
                    format: ">start".to_string(),
                },
            ],
            script_sensors: vec![ScriptSensor {
                sensor_number: 1,
                unit_converter: Some(converter),
            }],
            ..DecodingScript::default()
        }],
        ..PlatformConfig::new("sutron-8200")
    }
}

// ============================================================================
// SECTION: Round Trips
// ============================================================================

#[test]
fn full_configuration_round_trips() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = ConfigDao::new(&session);

    let mut config = sutron_config();
    let key = dao.write(&mut config).expect("write");
    assert_eq!(config.id, Some(key));
    assert!(config.scripts[0].id.is_some());

    let read_back = dao.read(key).expect("read");
    assert_eq!(read_back, config);
}

#[test]
fn list_is_partial_and_name_ordered() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = ConfigDao::new(&session);

    let mut b = sutron_config();
    b.name = "b-config".to_string();
    let mut a = sutron_config();
    a.name = "a-config".to_string();
    dao.write(&mut b).expect("write b");
    dao.write(&mut a).expect("write a");

    let listed = dao.list().expect("list");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].name, "a-config");
    assert_eq!(listed[1].name, "b-config");
    assert!(listed[0].scripts.is_empty());
    assert!(listed[0].sensors.is_empty());
}

#[test]
fn rewriting_by_name_adopts_the_existing_row() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = ConfigDao::new(&session);

    let mut first = sutron_config();
    let key = dao.write(&mut first).expect("first write");

    let mut second = sutron_config();
    second.description = Some("revised".to_string());
    let adopted = dao.write(&mut second).expect("second write");
    assert_eq!(adopted, key);
    assert_eq!(common::count_rows(&db, "PlatformConfig"), 1);
    assert_eq!(dao.lookup("sutron-8200").expect("lookup"), Some(key));
}

// ============================================================================
// SECTION: Converter Cleanup
// ============================================================================

#[test]
fn updates_leave_no_orphaned_unit_converters() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = ConfigDao::new(&session);

    let mut config = sutron_config();
    dao.write(&mut config).expect("first write");
    assert_eq!(common::count_rows(&db, "UnitConverter"), 1);

    // Rewrite with a fresh converter: the old one must go, not accumulate.
    let mut config = sutron_config();
    dao.write(&mut config).expect("second write");
    assert_eq!(common::count_rows(&db, "UnitConverter"), 1);
    assert_eq!(common::count_rows(&db, "ScriptSensor"), 1);
    assert_eq!(common::count_rows(&db, "DecodesScript"), 1);
    assert_eq!(common::count_rows(&db, "FormatStatement"), 2);
}

#[test]
fn delete_cascades_through_scripts_and_converters() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = ConfigDao::new(&session);

    let mut config = sutron_config();
    dao.write(&mut config).expect("write");
    dao.delete(&mut config).expect("delete");
    assert!(config.id.is_none());

    for table in [
        "PlatformConfig",
        "ConfigSensor",
        "DecodesScript",
        "FormatStatement",
        "ScriptSensor",
        "UnitConverter",
    ] {
        assert_eq!(common::count_rows(&db, table), 0, "{table} not empty");
    }
}

#[test]
fn script_sensor_without_converter_reads_as_none() {
    let (_dir, db) = common::provisioned(VERSION_15);
    let session = db.session();
    let dao = ConfigDao::new(&session);

    let mut config = PlatformConfig {
        scripts: vec![DecodingScript {
            name: "EDL".to_string(),
            script_type: "DECODES".to_string(),
            script_sensors: vec![ScriptSensor {
                sensor_number: 3,
                unit_converter: None,
            }],
            ..DecodingScript::default()
        }],
        ..PlatformConfig::new("edl-only")
    };
    let key = dao.write(&mut config).expect("write");
    let read_back = dao.read(key).expect("read");
    assert_eq!(read_back.scripts[0].script_sensors.len(), 1);
    assert!(read_back.scripts[0].script_sensors[0].unit_converter.is_none());
}
