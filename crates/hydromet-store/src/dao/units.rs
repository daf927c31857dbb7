// hydromet-store/src/dao/units.rs
// ============================================================================
// Module: Engineering Unit DAO
// Description: Persistence for engineering units and standalone converters.
// Purpose: Units are keyed by abbreviation, not by surrogate key.
// Dependencies: rusqlite, hydromet-core
// ============================================================================

//! ## Overview
//! Engineering units have no surrogate key in any schema version; the
//! abbreviation is both natural and primary key, so writes are plain
//! upserts. The same table of unit converters used by decoding scripts also
//! holds the standalone conversions between engineering units; the
//! standalone set is managed here by converter key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use hydromet_core::DbKey;
use hydromet_core::EngineeringUnit;
use hydromet_core::UnitConverter;
use rusqlite::OptionalExtension;
use rusqlite::params;
use rusqlite::params_from_iter;

use crate::connection::Session;
use crate::error::DbError;

// ============================================================================
// SECTION: DAO
// ============================================================================

/// DAO for engineering units and the standalone unit converter set.
pub struct UnitDao<'a> {
    /// Session the DAO executes on.
    session: &'a Session,
}

impl<'a> UnitDao<'a> {
    /// Creates a unit DAO on the given session.
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Reads one unit by abbreviation.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn read(&self, abbr: &str) -> Result<Option<EngineeringUnit>, DbError> {
        let guard = self.session.conn()?;
        let unit = guard
            .query_row(
                "SELECT unitAbbr, name, family, measures FROM EngineeringUnit \
                 WHERE unitAbbr = ?1",
                params![abbr],
                unit_from_row,
            )
            .optional()?;
        Ok(unit)
    }

    /// Lists all engineering units.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn list(&self) -> Result<Vec<EngineeringUnit>, DbError> {
        let guard = self.session.conn()?;
        let mut stmt = guard.prepare(
            "SELECT unitAbbr, name, family, measures FROM EngineeringUnit ORDER BY unitAbbr",
        )?;
        let rows = stmt.query_map([], unit_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Inserts or updates a unit by abbreviation.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on statement failure.
    pub fn write(&self, unit: &EngineeringUnit) -> Result<(), DbError> {
        let guard = self.session.conn()?;
        guard.execute(
            "INSERT INTO EngineeringUnit (unitAbbr, name, family, measures) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT (unitAbbr) DO UPDATE SET \
             name = excluded.name, family = excluded.family, measures = excluded.measures",
            params![unit.abbr, unit.name, unit.family, unit.measures],
        )?;
        Ok(())
    }

    /// Deletes a unit by abbreviation.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on statement failure.
    pub fn delete(&self, abbr: &str) -> Result<(), DbError> {
        let guard = self.session.conn()?;
        guard.execute("DELETE FROM EngineeringUnit WHERE unitAbbr = ?1", params![abbr])?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Standalone converters
    // ------------------------------------------------------------------

    /// Lists the standalone converters between two named unit sets, i.e.
    /// every converter whose source is a real unit rather than raw sensor
    /// output.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn list_converters(&self) -> Result<Vec<UnitConverter>, DbError> {
        let guard = self.session.conn()?;
        let mut stmt = guard.prepare(
            "SELECT id, fromUnitsAbbr, toUnitsAbbr, algorithm, a, b, c, d, e, f \
             FROM UnitConverter WHERE LOWER(fromUnitsAbbr) <> 'raw' ORDER BY id",
        )?;
        let rows = stmt.query_map([], converter_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Inserts or updates one standalone converter.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on statement or key generation failure.
    pub fn write_converter(&self, converter: &mut UnitConverter) -> Result<DbKey, DbError> {
        let ctx = self.session.context();
        let guard = self.session.conn()?;
        let key = match converter.id {
            Some(key) => {
                guard.execute(
                    "UPDATE UnitConverter SET fromUnitsAbbr = ?2, toUnitsAbbr = ?3, \
                     algorithm = ?4, a = ?5, b = ?6, c = ?7, d = ?8, e = ?9, f = ?10 \
                     WHERE id = ?1",
                    params_from_iter(converter_params(key, converter)),
                )?;
                key
            }
            None => {
                let key = ctx.keygen.key("UnitConverter", &guard)?;
                guard.execute(
                    "INSERT INTO UnitConverter (id, fromUnitsAbbr, toUnitsAbbr, algorithm, \
                     a, b, c, d, e, f) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params_from_iter(converter_params(key, converter)),
                )?;
                converter.id = Some(key);
                key
            }
        };
        Ok(key)
    }

    /// Deletes one standalone converter; clears its key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on statement failure.
    pub fn delete_converter(&self, converter: &mut UnitConverter) -> Result<(), DbError> {
        let Some(key) = converter.id else {
            return Ok(());
        };
        let guard = self.session.conn()?;
        guard.execute("DELETE FROM UnitConverter WHERE id = ?1", params![key.as_raw()])?;
        converter.id = None;
        Ok(())
    }
}

// ============================================================================
// SECTION: Row Mapping
// ============================================================================

/// Builds a unit from one row.
fn unit_from_row(row: &rusqlite::Row<'_>) -> Result<EngineeringUnit, rusqlite::Error> {
    Ok(EngineeringUnit {
        abbr: row.get(0)?,
        name: row.get(1)?,
        family: row.get(2)?,
        measures: row.get(3)?,
    })
}

/// Builds a converter from one row.
fn converter_from_row(row: &rusqlite::Row<'_>) -> Result<UnitConverter, rusqlite::Error> {
    Ok(UnitConverter {
        id: Some(DbKey::new(row.get(0)?)),
        from_abbr: row.get(1)?,
        to_abbr: row.get(2)?,
        algorithm: row.get(3)?,
        coefficients: [
            row.get::<_, Option<f64>>(4)?.unwrap_or(0.0),
            row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
            row.get::<_, Option<f64>>(6)?.unwrap_or(0.0),
            row.get::<_, Option<f64>>(7)?.unwrap_or(0.0),
            row.get::<_, Option<f64>>(8)?.unwrap_or(0.0),
            row.get::<_, Option<f64>>(9)?.unwrap_or(0.0),
        ],
    })
}

/// Binds the converter columns for insert or update.
fn converter_params(key: DbKey, converter: &UnitConverter) -> [rusqlite::types::Value; 10] {
    use rusqlite::types::Value;
    [
        Value::Integer(key.as_raw()),
        Value::Text(converter.from_abbr.clone()),
        Value::Text(converter.to_abbr.clone()),
        Value::Text(converter.algorithm.clone()),
        Value::Real(converter.coefficients[0]),
        Value::Real(converter.coefficients[1]),
        Value::Real(converter.coefficients[2]),
        Value::Real(converter.coefficients[3]),
        Value::Real(converter.coefficients[4]),
        Value::Real(converter.coefficients[5]),
    ]
}
