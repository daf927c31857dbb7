// hydromet-config/src/lib.rs
// ============================================================================
// Module: hydromet Configuration Library
// Description: Settings and credential-store loading for the hydromet store.
// Purpose: Expose strict, fail-closed configuration parsing.
// Dependencies: crate::{auth, settings}
// ============================================================================

//! ## Overview
//! Settings are loaded from a TOML file with hard size limits and strict
//! validation; missing or invalid configuration fails closed. The credential
//! store is a separate file read only when trusted authentication is
//! disabled or fails.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod auth;
pub mod settings;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use auth::AuthFile;
pub use auth::AuthFileError;
pub use settings::DateEncoding;
pub use settings::Settings;
pub use settings::SettingsError;
