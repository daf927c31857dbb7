// hydromet-store/src/keygen.rs
// ============================================================================
// Module: Key Generation
// Description: Surrogate key allocation strategies and their registry.
// Purpose: Allocate table-unique surrogate keys from sequence objects.
// Dependencies: rusqlite, hydromet-core
// ============================================================================

//! ## Overview
//! Surrogate keys come from per-table sequence objects named
//! `<table><suffix>`, emulated here as one-row counter tables advanced
//! atomically. Strategies implement [`KeyGenerator`] and are selected by name
//! through a registry populated at startup, so deployments can swap the
//! allocation scheme without touching DAO code. A missing sequence object is
//! fatal: it means the database was never provisioned for that table.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use hydromet_core::DbKey;
use rusqlite::Connection;

use crate::error::DbError;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Surrogate key allocation strategy.
///
/// Keys are unique per table for the process lifetime unless [`reset`] is
/// called, and `reset` must never run while rows referencing the table exist.
///
/// [`reset`]: KeyGenerator::reset
pub trait KeyGenerator: Send + Sync + std::fmt::Debug {
    /// Allocates the next key for `table`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::KeyGeneration`] when the backing sequence object
    /// is missing or cannot be advanced.
    fn key(&self, table: &str, conn: &Connection) -> Result<DbKey, DbError>;

    /// Restarts the sequence for `table` so the next key is the configured
    /// start value. Bootstrap and test use only.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::KeyGeneration`] when the backing sequence object
    /// is missing.
    fn reset(&self, table: &str, conn: &Connection) -> Result<(), DbError>;
}

// ============================================================================
// SECTION: Sequence Strategy
// ============================================================================

/// Default strategy backed by per-table sequence counter tables.
#[derive(Debug, Clone)]
pub struct SequenceKeyGenerator {
    /// Sequence object name suffix appended to the table name.
    suffix: String,
    /// First value a freshly reset sequence issues.
    start: i64,
}

impl SequenceKeyGenerator {
    /// Creates a sequence strategy with the given suffix and start value.
    #[must_use]
    pub fn new(suffix: impl Into<String>, start: i64) -> Self {
        Self {
            suffix: suffix.into(),
            start,
        }
    }

    /// Maps a table name to its sequence object name.
    ///
    /// The one irregular legacy mapping: table `EquipmentModel` uses the
    /// sequence `EquipmentIdSeq`, not `EquipmentModelIdSeq`.
    #[must_use]
    pub fn sequence_name(&self, table: &str) -> String {
        if table.eq_ignore_ascii_case("EquipmentModel") {
            format!("Equipment{}", self.suffix)
        } else {
            format!("{table}{}", self.suffix)
        }
    }
}

impl KeyGenerator for SequenceKeyGenerator {
    fn key(&self, table: &str, conn: &Connection) -> Result<DbKey, DbError> {
        let seq = self.sequence_name(table);
        let sql = format!("UPDATE {seq} SET value = value + 1 RETURNING value");
        let raw: i64 = conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|err| missing_sequence(&seq, table, &err))?;
        Ok(DbKey::new(raw))
    }

    fn reset(&self, table: &str, conn: &Connection) -> Result<(), DbError> {
        let seq = self.sequence_name(table);
        let sql = format!("UPDATE {seq} SET value = ?1");
        let affected = conn
            .execute(&sql, [self.start - 1])
            .map_err(|err| missing_sequence(&seq, table, &err))?;
        if affected == 0 {
            return Err(DbError::KeyGeneration(format!(
                "sequence '{seq}' for table '{table}' holds no counter row"
            )));
        }
        Ok(())
    }
}

/// Builds the fatal error for a sequence that cannot be advanced.
fn missing_sequence(seq: &str, table: &str, err: &rusqlite::Error) -> DbError {
    DbError::KeyGeneration(format!(
        "sequence '{seq}' for table '{table}' is missing or unusable \
         (database not provisioned?): {err}"
    ))
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Name for the default sequence strategy.
pub const SEQUENCE_STRATEGY: &str = "sequence";

/// Name-keyed registry of key generation strategies.
#[derive(Clone, Default)]
pub struct KeyGeneratorRegistry {
    /// Registered strategies by name.
    entries: HashMap<String, Arc<dyn KeyGenerator>>,
}

impl KeyGeneratorRegistry {
    /// Builds a registry holding the built-in strategies configured with the
    /// given sequence suffix and start value.
    #[must_use]
    pub fn with_defaults(suffix: &str, start: i64) -> Self {
        let mut registry = Self::default();
        registry.register(
            SEQUENCE_STRATEGY,
            Arc::new(SequenceKeyGenerator::new(suffix, start)),
        );
        registry
    }

    /// Registers a strategy under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &str, strategy: Arc<dyn KeyGenerator>) {
        self.entries.insert(name.to_string(), strategy);
    }

    /// Resolves a strategy by name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Invalid`] for an unregistered name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn KeyGenerator>, DbError> {
        self.entries.get(name).cloned().ok_or_else(|| {
            DbError::Invalid(format!("unknown key generator strategy '{name}'"))
        })
    }
}

impl std::fmt::Debug for KeyGeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyGeneratorRegistry")
            .field("strategies", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}
