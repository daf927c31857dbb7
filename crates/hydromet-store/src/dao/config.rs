// hydromet-store/src/dao/config.rs
// ============================================================================
// Module: Config DAO
// Description: Persistence for platform configurations and decoding scripts.
// Purpose: Natural key is the configuration name; scripts are keyed children
//          whose unit converters need two-step cleanup.
// Dependencies: rusqlite, hydromet-core
// ============================================================================

//! ## Overview
//! A configuration owns config sensors and decoding scripts; each script owns
//! format statements and script sensors, and each script sensor may own one
//! unit converter. Converters live in a separate keyed table referenced by
//! id, so deletes collect the converter ids first and then remove them by id
//! list rather than relying on a cross-table delete.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use hydromet_core::ConfigSensor;
use hydromet_core::DbKey;
use hydromet_core::DecodingScript;
use hydromet_core::FormatStatement;
use hydromet_core::PlatformConfig;
use hydromet_core::ScriptSensor;
use hydromet_core::UnitConverter;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::connection::Session;
use crate::connection::StoreContext;
use crate::dao::char_to_sql;
use crate::dao::first_char;
use crate::error::DbError;

// ============================================================================
// SECTION: DAO
// ============================================================================

/// DAO for the `PlatformConfig` aggregate root.
pub struct ConfigDao<'a> {
    /// Session the DAO executes on.
    session: &'a Session,
}

impl<'a> ConfigDao<'a> {
    /// Creates a config DAO on the given session.
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Reads one complete configuration by key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Invalid`] when no row exists for the key, or
    /// [`DbError::Statement`] on query failure.
    pub fn read(&self, key: DbKey) -> Result<PlatformConfig, DbError> {
        let guard = self.session.conn()?;
        read_config(&guard, key)
    }

    /// Reads a configuration through the identity cache, caching on miss.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn read_shared(&self, key: DbKey) -> Result<Arc<PlatformConfig>, DbError> {
        let cache = &self.session.context().cache;
        if let Some(config) = cache.config(key.as_raw()) {
            return Ok(config);
        }
        let config = Arc::new(self.read(key)?);
        cache.put_config(key.as_raw(), Arc::clone(&config));
        Ok(config)
    }

    /// Lists all configurations, partially populated: key, name, description.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn list(&self) -> Result<Vec<PlatformConfig>, DbError> {
        let guard = self.session.conn()?;
        let mut stmt =
            guard.prepare("SELECT id, name, description FROM PlatformConfig ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(PlatformConfig {
                id: Some(DbKey::new(row.get(0)?)),
                name: row.get(1)?,
                description: row.get(2)?,
                sensors: Vec::new(),
                scripts: Vec::new(),
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Finds a configuration key by name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn lookup(&self, name: &str) -> Result<Option<DbKey>, DbError> {
        let guard = self.session.conn()?;
        lookup_by_name(&guard, name)
    }

    /// Inserts or updates a configuration and replaces all children.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on statement or key generation failure; the
    /// transaction rolls back.
    pub fn write(&self, config: &mut PlatformConfig) -> Result<DbKey, DbError> {
        let ctx = self.session.context();
        let mut guard = self.session.conn()?;
        let tx = guard.transaction()?;
        let key = write_config(&tx, ctx, config)?;
        tx.commit()?;
        ctx.cache.put_config(key.as_raw(), Arc::new(config.clone()));
        Ok(key)
    }

    /// Deletes a configuration and all its children, deepest-first; clears
    /// the configuration's key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on failure; the transaction rolls back.
    pub fn delete(&self, config: &mut PlatformConfig) -> Result<(), DbError> {
        let Some(key) = config.id else {
            return Ok(());
        };
        let ctx = self.session.context();
        let mut guard = self.session.conn()?;
        let tx = guard.transaction()?;
        delete_children(&tx, key)?;
        tx.execute("DELETE FROM PlatformConfig WHERE id = ?1", params![key.as_raw()])?;
        tx.commit()?;
        ctx.cache.evict_config(key.as_raw());
        config.id = None;
        Ok(())
    }
}

// ============================================================================
// SECTION: Row Operations
// ============================================================================

/// Finds a configuration key by name.
fn lookup_by_name(conn: &Connection, name: &str) -> Result<Option<DbKey>, DbError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM PlatformConfig WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.map(DbKey::new))
}

/// Reads one configuration with sensors and scripts.
fn read_config(conn: &Connection, key: DbKey) -> Result<PlatformConfig, DbError> {
    let mut config = conn
        .query_row(
            "SELECT name, description FROM PlatformConfig WHERE id = ?1",
            params![key.as_raw()],
            |row| {
                Ok(PlatformConfig {
                    id: Some(key),
                    name: row.get(0)?,
                    description: row.get(1)?,
                    sensors: Vec::new(),
                    scripts: Vec::new(),
                })
            },
        )
        .optional()?
        .ok_or_else(|| DbError::Invalid(format!("no platform config with key {key}")))?;

    let mut stmt = conn.prepare(
        "SELECT sensorNumber, sensorName, recordingMode, recordingInterval, absMin, absMax \
         FROM ConfigSensor WHERE configId = ?1 ORDER BY sensorNumber",
    )?;
    let sensors = stmt.query_map(params![key.as_raw()], |row| {
        Ok(ConfigSensor {
            sensor_number: row.get(0)?,
            sensor_name: row.get(1)?,
            recording_mode: first_char(row.get(2)?),
            recording_interval: row.get(3)?,
            abs_min: row.get(4)?,
            abs_max: row.get(5)?,
        })
    })?;
    config.sensors = sensors.collect::<Result<Vec<_>, _>>()?;
    drop(stmt);

    let mut stmt = conn.prepare(
        "SELECT id, name, type, dataOrder FROM DecodesScript WHERE configId = ?1 ORDER BY id",
    )?;
    let scripts = stmt.query_map(params![key.as_raw()], |row| {
        Ok(DecodingScript {
            id: Some(DbKey::new(row.get(0)?)),
            name: row.get(1)?,
            script_type: row.get(2)?,
            data_order: first_char(row.get(3)?),
            format_statements: Vec::new(),
            script_sensors: Vec::new(),
        })
    })?;
    config.scripts = scripts.collect::<Result<Vec<_>, _>>()?;
    drop(stmt);

    for script in &mut config.scripts {
        if let Some(script_id) = script.id {
            read_script_children(conn, script_id, script)?;
        }
    }
    Ok(config)
}

/// Reads the format statements and script sensors of one script.
fn read_script_children(
    conn: &Connection,
    script_id: DbKey,
    script: &mut DecodingScript,
) -> Result<(), DbError> {
    let mut stmt = conn.prepare(
        "SELECT sequenceNum, label, format FROM FormatStatement \
         WHERE decodesScriptId = ?1 ORDER BY sequenceNum",
    )?;
    let statements = stmt.query_map(params![script_id.as_raw()], |row| {
        Ok(FormatStatement {
            sequence_num: row.get(0)?,
            label: row.get(1)?,
            format: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        })
    })?;
    script.format_statements = statements.collect::<Result<Vec<_>, _>>()?;
    drop(stmt);

    let mut stmt = conn.prepare(
        "SELECT s.sensorNumber, u.id, u.fromUnitsAbbr, u.toUnitsAbbr, u.algorithm, \
         u.a, u.b, u.c, u.d, u.e, u.f \
         FROM ScriptSensor s LEFT JOIN UnitConverter u ON s.unitConverterId = u.id \
         WHERE s.decodesScriptId = ?1 ORDER BY s.sensorNumber",
    )?;
    let sensors = stmt.query_map(params![script_id.as_raw()], |row| {
        let converter = match row.get::<_, Option<i64>>(1)? {
            Some(uc_id) => Some(UnitConverter {
                id: Some(DbKey::new(uc_id)),
                from_abbr: row.get(2)?,
                to_abbr: row.get(3)?,
                algorithm: row.get(4)?,
                coefficients: [
                    row.get::<_, Option<f64>>(5)?.unwrap_or(0.0),
                    row.get::<_, Option<f64>>(6)?.unwrap_or(0.0),
                    row.get::<_, Option<f64>>(7)?.unwrap_or(0.0),
                    row.get::<_, Option<f64>>(8)?.unwrap_or(0.0),
                    row.get::<_, Option<f64>>(9)?.unwrap_or(0.0),
                    row.get::<_, Option<f64>>(10)?.unwrap_or(0.0),
                ],
            }),
            None => None,
        };
        Ok(ScriptSensor {
            sensor_number: row.get(0)?,
            unit_converter: converter,
        })
    })?;
    script.script_sensors = sensors.collect::<Result<Vec<_>, _>>()?;
    Ok(())
}

/// The write algorithm body, run inside the caller's transaction.
fn write_config(
    conn: &Connection,
    ctx: &StoreContext,
    config: &mut PlatformConfig,
) -> Result<DbKey, DbError> {
    if config.id.is_none()
        && let Some(found) = lookup_by_name(conn, &config.name)?
    {
        config.id = Some(found);
    }
    let key = match config.id {
        Some(key) => {
            conn.execute(
                "UPDATE PlatformConfig SET name = ?2, description = ?3 WHERE id = ?1",
                params![key.as_raw(), config.name, config.description],
            )?;
            delete_children(conn, key)?;
            key
        }
        None => {
            let key = ctx.keygen.key("PlatformConfig", conn)?;
            conn.execute(
                "INSERT INTO PlatformConfig (id, name, description) VALUES (?1, ?2, ?3)",
                params![key.as_raw(), config.name, config.description],
            )?;
            config.id = Some(key);
            key
        }
    };

    let mut stmt = conn.prepare(
        "INSERT INTO ConfigSensor (configId, sensorNumber, sensorName, recordingMode, \
         recordingInterval, absMin, absMax) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for sensor in &config.sensors {
        stmt.execute(params![
            key.as_raw(),
            sensor.sensor_number,
            sensor.sensor_name,
            char_to_sql(sensor.recording_mode),
            sensor.recording_interval,
            sensor.abs_min,
            sensor.abs_max
        ])?;
    }
    drop(stmt);

    for script in &mut config.scripts {
        write_script(conn, ctx, key, script)?;
    }
    Ok(key)
}

/// Inserts one decoding script with a fresh key and all its children.
fn write_script(
    conn: &Connection,
    ctx: &StoreContext,
    config_id: DbKey,
    script: &mut DecodingScript,
) -> Result<(), DbError> {
    let script_id = ctx.keygen.key("DecodesScript", conn)?;
    conn.execute(
        "INSERT INTO DecodesScript (id, configId, name, type, dataOrder) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            script_id.as_raw(),
            config_id.as_raw(),
            script.name,
            script.script_type,
            char_to_sql(script.data_order)
        ],
    )?;
    script.id = Some(script_id);

    let mut stmt = conn.prepare(
        "INSERT INTO FormatStatement (decodesScriptId, sequenceNum, label, format) \
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for statement in &script.format_statements {
        stmt.execute(params![
            script_id.as_raw(),
            statement.sequence_num,
            statement.label,
            statement.format
        ])?;
    }
    drop(stmt);

    for sensor in &mut script.script_sensors {
        let uc_id = match sensor.unit_converter.as_mut() {
            Some(converter) => {
                let uc_id = ctx.keygen.key("UnitConverter", conn)?;
                conn.execute(
                    "INSERT INTO UnitConverter (id, fromUnitsAbbr, toUnitsAbbr, algorithm, \
                     a, b, c, d, e, f) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    params![
                        uc_id.as_raw(),
                        converter.from_abbr,
                        converter.to_abbr,
                        converter.algorithm,
                        converter.coefficients[0],
                        converter.coefficients[1],
                        converter.coefficients[2],
                        converter.coefficients[3],
                        converter.coefficients[4],
                        converter.coefficients[5]
                    ],
                )?;
                converter.id = Some(uc_id);
                Some(uc_id.as_raw())
            }
            None => None,
        };
        conn.execute(
            "INSERT INTO ScriptSensor (decodesScriptId, sensorNumber, unitConverterId) \
             VALUES (?1, ?2, ?3)",
            params![script_id.as_raw(), sensor.sensor_number, uc_id],
        )?;
    }
    Ok(())
}

/// Deletes all children of one configuration, deepest-first.
///
/// Unit converters are referenced by id from script sensors, so their ids
/// are collected first and the converters removed by id list.
fn delete_children(conn: &Connection, key: DbKey) -> Result<(), DbError> {
    let mut stmt = conn.prepare(
        "SELECT s.unitConverterId FROM ScriptSensor s \
         JOIN DecodesScript d ON s.decodesScriptId = d.id \
         WHERE d.configId = ?1 AND s.unitConverterId IS NOT NULL",
    )?;
    let converter_ids = stmt
        .query_map(params![key.as_raw()], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);
    let mut delete_uc = conn.prepare("DELETE FROM UnitConverter WHERE id = ?1")?;
    for uc_id in converter_ids {
        delete_uc.execute(params![uc_id])?;
    }
    drop(delete_uc);
    conn.execute(
        "DELETE FROM ScriptSensor WHERE decodesScriptId IN \
         (SELECT id FROM DecodesScript WHERE configId = ?1)",
        params![key.as_raw()],
    )?;
    conn.execute(
        "DELETE FROM FormatStatement WHERE decodesScriptId IN \
         (SELECT id FROM DecodesScript WHERE configId = ?1)",
        params![key.as_raw()],
    )?;
    conn.execute(
        "DELETE FROM DecodesScript WHERE configId = ?1",
        params![key.as_raw()],
    )?;
    conn.execute(
        "DELETE FROM ConfigSensor WHERE configId = ?1",
        params![key.as_raw()],
    )?;
    Ok(())
}
