// hydromet-store/src/error.rs
// ============================================================================
// Module: Store Errors
// Description: Error taxonomy for the relational persistence layer.
// Purpose: Separate connect-time, statement, and key-generation failures.
// Dependencies: thiserror, rusqlite
// ============================================================================

//! ## Overview
//! Four coarse categories cover every surfaced failure. Two failure classes
//! are deliberately *not* errors: a schema-version probe that fails falls
//! back to the floor version, and an undecodable timestamp decodes to `None`;
//! both are logged and recovery continues.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Errors surfaced by the persistence layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Connection establishment failed: driver open, credential resolution,
    /// or retry budget exhausted. Callers may show setup guidance.
    #[error("database connect failed: {0}")]
    Connect(String),
    /// A statement failed to prepare or execute.
    #[error("statement failed: {0}")]
    Statement(String),
    /// The key generator could not allocate a key. Fatal: the database is
    /// not provisioned for this table.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
    /// Stored data is malformed beyond local recovery.
    #[error("invalid stored data: {0}")]
    Invalid(String),
}

impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Statement(err.to_string())
    }
}
