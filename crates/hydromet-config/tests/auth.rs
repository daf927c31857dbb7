// hydromet-config/tests/auth.rs
// ============================================================================
// Module: Credential Store Tests
// Description: Credential file loading tests.
// Purpose: Verify credential parsing and fail-closed behavior.
// Dependencies: hydromet-config, tempfile
// ============================================================================

//! Credential file loading tests.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;

use hydromet_config::AuthFile;
use hydromet_config::AuthFileError;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes `contents` to a temp credential file and loads it.
fn load(contents: &str) -> Result<AuthFile, AuthFileError> {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("auth.toml");
    fs::write(&path, contents).expect("write auth");
    AuthFile::from_path(&path)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn credentials_load() {
    let auth = load(
        r#"
username = "dcs_proc"
password = "s3cret"
"#,
    )
    .expect("load");
    assert_eq!(auth.username, "dcs_proc");
    assert_eq!(auth.password, "s3cret");
}

#[test]
fn password_defaults_to_empty() {
    let auth = load(r#"username = "dcs_proc""#).expect("load");
    assert!(auth.password.is_empty());
}

#[test]
fn empty_username_is_rejected() {
    let err = load(r#"username = """#).expect_err("empty username must fail");
    assert!(matches!(err, AuthFileError::EmptyUsername { .. }));
}

#[test]
fn unknown_field_is_rejected() {
    let err = load(
        r#"
username = "dcs_proc"
realm = "prod"
"#,
    )
    .expect_err("unknown field must fail");
    assert!(matches!(err, AuthFileError::Parse { .. }));
}

#[test]
fn missing_file_reports_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let err = AuthFile::from_path(&dir.path().join("absent.toml")).expect_err("must fail");
    assert!(matches!(err, AuthFileError::Io { .. }));
}
