// hydromet-store/src/dao/properties.rs
// ============================================================================
// Module: Properties DAO
// Description: Shared reader/writer for the name/value property tables.
// Purpose: One helper for every `(ownerId [, secondary]) -> (name, value)`
//          table so property handling stays uniform across aggregates.
// Dependencies: rusqlite, hydromet-core
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use hydromet_core::Property;
use hydromet_core::PropertyList;
use rusqlite::Connection;
use rusqlite::params;

use crate::error::DbError;

// ============================================================================
// SECTION: DAO
// ============================================================================

/// Shared helper for property tables keyed by one owner id, with an optional
/// secondary discriminator column (e.g. sensor number).
pub struct PropertiesDao;

impl PropertiesDao {
    /// Reads all properties for one owner, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn read(
        conn: &Connection,
        table: &str,
        owner_col: &str,
        owner: i64,
    ) -> Result<PropertyList, DbError> {
        let sql = format!("SELECT name, value FROM {table} WHERE {owner_col} = ?1 ORDER BY rowid");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![owner], |row| {
            Ok(Property::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        rows.collect::<Result<PropertyList, _>>().map_err(DbError::from)
    }

    /// Reads properties for one owner plus a secondary discriminator.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn read_secondary(
        conn: &Connection,
        table: &str,
        owner_col: &str,
        owner: i64,
        secondary_col: &str,
        secondary: i32,
    ) -> Result<PropertyList, DbError> {
        let sql = format!(
            "SELECT name, value FROM {table} \
             WHERE {owner_col} = ?1 AND {secondary_col} = ?2 ORDER BY rowid"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![owner, secondary], |row| {
            Ok(Property::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        rows.collect::<Result<PropertyList, _>>().map_err(DbError::from)
    }

    /// Replaces all properties for one owner: delete, then reinsert.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on statement failure.
    pub fn replace(
        conn: &Connection,
        table: &str,
        owner_col: &str,
        owner: i64,
        list: &[Property],
    ) -> Result<(), DbError> {
        conn.execute(
            &format!("DELETE FROM {table} WHERE {owner_col} = ?1"),
            params![owner],
        )?;
        let sql = format!("INSERT INTO {table} ({owner_col}, name, value) VALUES (?1, ?2, ?3)");
        let mut stmt = conn.prepare(&sql)?;
        for property in list {
            stmt.execute(params![owner, property.name, property.value])?;
        }
        Ok(())
    }

    /// Replaces properties for one owner plus a secondary discriminator.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on statement failure.
    pub fn replace_secondary(
        conn: &Connection,
        table: &str,
        owner_col: &str,
        owner: i64,
        secondary_col: &str,
        secondary: i32,
        list: &[Property],
    ) -> Result<(), DbError> {
        conn.execute(
            &format!("DELETE FROM {table} WHERE {owner_col} = ?1 AND {secondary_col} = ?2"),
            params![owner, secondary],
        )?;
        let sql = format!(
            "INSERT INTO {table} ({owner_col}, {secondary_col}, name, value) \
             VALUES (?1, ?2, ?3, ?4)"
        );
        let mut stmt = conn.prepare(&sql)?;
        for property in list {
            stmt.execute(params![owner, secondary, property.name, property.value])?;
        }
        Ok(())
    }

    /// Deletes every property row for one owner.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on statement failure.
    pub fn delete(
        conn: &Connection,
        table: &str,
        owner_col: &str,
        owner: i64,
    ) -> Result<(), DbError> {
        conn.execute(
            &format!("DELETE FROM {table} WHERE {owner_col} = ?1"),
            params![owner],
        )?;
        Ok(())
    }
}
