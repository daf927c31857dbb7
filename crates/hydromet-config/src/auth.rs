// hydromet-config/src/auth.rs
// ============================================================================
// Module: Credential Store
// Description: Reads database credentials from a separate protected file.
// Purpose: Keep credentials out of the main settings file.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! The credential store is a small TOML file holding the database username
//! and password. It is consulted only when a trusted, credential-less open
//! is disabled or fails.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum credential file size in bytes.
pub const MAX_AUTH_FILE_SIZE: u64 = 64 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Credential store loading errors.
#[derive(Debug, Error)]
pub enum AuthFileError {
    /// Credential file could not be read.
    #[error("cannot read credential file '{path}': {reason}")]
    Io {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying failure description.
        reason: String,
    },
    /// Credential file exceeds the size limit.
    #[error("credential file '{path}' exceeds {MAX_AUTH_FILE_SIZE} bytes")]
    TooLarge {
        /// Path that failed the size check.
        path: PathBuf,
    },
    /// Credential file is not valid TOML for the expected shape.
    #[error("invalid credential file '{path}': {reason}")]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// Parser failure description.
        reason: String,
    },
    /// Credential file is missing a required field value.
    #[error("credential file '{path}': username must not be empty")]
    EmptyUsername {
        /// Path that failed validation.
        path: PathBuf,
    },
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Database credentials read from the credential store.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthFile {
    /// Database username.
    pub username: String,
    /// Database password; may be empty for password-less accounts.
    #[serde(default)]
    pub password: String,
}

impl AuthFile {
    /// Loads credentials from the given TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`AuthFileError`] when the file cannot be read, exceeds the
    /// size limit, fails to parse, or has an empty username.
    pub fn from_path(path: &Path) -> Result<Self, AuthFileError> {
        let metadata = fs::metadata(path).map_err(|err| AuthFileError::Io {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        if metadata.len() > MAX_AUTH_FILE_SIZE {
            return Err(AuthFileError::TooLarge {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|err| AuthFileError::Io {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let auth: Self = toml::from_str(&text).map_err(|err| AuthFileError::Parse {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        if auth.username.trim().is_empty() {
            return Err(AuthFileError::EmptyUsername {
                path: path.to_path_buf(),
            });
        }
        Ok(auth)
    }
}
