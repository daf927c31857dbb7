// hydromet-store/src/dao/platform.rs
// ============================================================================
// Module: Platform DAO
// Description: Persistence for platforms, transport media, and sensors.
// Purpose: Natural key is (site, designator); children replaced in full.
// Dependencies: rusqlite, hydromet-core, tracing
// ============================================================================

//! ## Overview
//! The platform root references a site and a configuration by key; complete
//! reads resolve both through the identity cache. The transport-medium column
//! set grew across schema versions, so every generated statement includes
//! exactly the columns the resolved version defines and values for younger
//! columns are dropped with a warning. Empty transport media (blank type or
//! id) are never written: such a row could not be matched on read.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;

use hydromet_core::DbKey;
use hydromet_core::DbTimestamp;
use hydromet_core::Platform;
use hydromet_core::PlatformSensor;
use hydromet_core::TransportMedium;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use tracing::warn;

use crate::connection::Session;
use crate::connection::StoreContext;
use crate::dao::char_to_sql;
use crate::dao::first_char;
use crate::dao::get_timestamp;
use crate::dao::opt_i32;
use crate::dao::opt_int;
use crate::dao::opt_text;
use crate::dao::parse_bool;
use crate::dao::properties::PropertiesDao;
use crate::dao::sql_bool;
use crate::error::DbError;
use crate::version::VERSION_6;
use crate::version::VERSION_7;
use crate::version::VERSION_11;

// ============================================================================
// SECTION: DAO
// ============================================================================

/// DAO for the `Platform` aggregate root.
pub struct PlatformDao<'a> {
    /// Session the DAO executes on.
    session: &'a Session,
}

impl<'a> PlatformDao<'a> {
    /// Creates a platform DAO on the given session.
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Reads one complete platform: root, children, and resolved site and
    /// configuration references.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Invalid`] when no row exists for the key, or
    /// [`DbError::Statement`] on query failure.
    pub fn read(&self, key: DbKey) -> Result<Platform, DbError> {
        let ctx = self.session.context();
        let (mut platform, site_id, config_id) = {
            let guard = self.session.conn()?;
            let (mut platform, site_id, config_id) = read_root(&guard, ctx, key)?;
            platform.transport_media = read_media(&guard, ctx, key)?;
            platform.sensors = read_sensors(&guard, ctx, key)?;
            if ctx.version.version >= VERSION_6 {
                platform.properties =
                    PropertiesDao::read(&guard, "PlatformProperty", "platformId", key.as_raw())?;
            }
            (platform, site_id, config_id)
        };
        if let Some(site_id) = site_id {
            platform.site = Some(
                crate::dao::site::SiteDao::new(self.session).read_shared(DbKey::new(site_id))?,
            );
        }
        if let Some(config_id) = config_id {
            platform.config = Some(
                crate::dao::config::ConfigDao::new(self.session)
                    .read_shared(DbKey::new(config_id))?,
            );
        }
        Ok(platform)
    }

    /// Lists all platforms, partially populated: root fields, resolved site
    /// reference (for the display name), and transport media.
    ///
    /// Transport-medium rows whose platform no longer exists are logged and
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn list(&self) -> Result<Vec<Platform>, DbError> {
        let ctx = self.session.context();
        let (mut platforms, site_ids) = {
            let guard = self.session.conn()?;
            let mut stmt = guard.prepare("SELECT id FROM Platform ORDER BY id")?;
            let keys = stmt
                .query_map([], |row| row.get::<_, i64>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            drop(stmt);
            let mut platforms = Vec::with_capacity(keys.len());
            let mut site_ids = Vec::with_capacity(keys.len());
            for raw in keys {
                let key = DbKey::new(raw);
                let (platform, site_id, _) = read_root(&guard, ctx, key)?;
                platforms.push(platform);
                site_ids.push(site_id);
            }
            attach_media(&guard, ctx, &mut platforms)?;
            (platforms, site_ids)
        };
        let site_dao = crate::dao::site::SiteDao::new(self.session);
        for (platform, site_id) in platforms.iter_mut().zip(site_ids) {
            if let Some(site_id) = site_id {
                platform.site = Some(site_dao.read_shared(DbKey::new(site_id))?);
            }
        }
        Ok(platforms)
    }

    /// Finds a platform key by its natural key: the site plus, from schema
    /// version 7 on, the designator.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn lookup(
        &self,
        site_id: DbKey,
        designator: Option<&str>,
    ) -> Result<Option<DbKey>, DbError> {
        let ctx = self.session.context();
        let guard = self.session.conn()?;
        lookup_natural(&guard, ctx, site_id, designator)
    }

    /// Inserts or updates a platform and replaces all child collections.
    ///
    /// Sets `last_modify_time` to the current time. Site and configuration
    /// references must already be persisted; an unsaved reference is stored
    /// as `NULL` with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on statement or key generation failure; the
    /// transaction rolls back.
    pub fn write(&self, platform: &mut Platform) -> Result<DbKey, DbError> {
        let ctx = self.session.context();
        let mut guard = self.session.conn()?;
        let tx = guard.transaction()?;
        let key = write_platform(&tx, ctx, platform)?;
        tx.commit()?;
        Ok(key)
    }

    /// Deletes a platform and all its children, deepest-first; clears the
    /// platform's key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on failure; the transaction rolls back.
    pub fn delete(&self, platform: &mut Platform) -> Result<(), DbError> {
        let Some(key) = platform.id else {
            return Ok(());
        };
        let ctx = self.session.context();
        let mut guard = self.session.conn()?;
        let tx = guard.transaction()?;
        if ctx.version.version >= VERSION_6 {
            PropertiesDao::delete(&tx, "PlatformSensorProperty", "platformId", key.as_raw())?;
            PropertiesDao::delete(&tx, "PlatformProperty", "platformId", key.as_raw())?;
        }
        tx.execute(
            "DELETE FROM PlatformSensor WHERE platformId = ?1",
            params![key.as_raw()],
        )?;
        tx.execute(
            "DELETE FROM TransportMedium WHERE platformId = ?1",
            params![key.as_raw()],
        )?;
        tx.execute("DELETE FROM Platform WHERE id = ?1", params![key.as_raw()])?;
        tx.commit()?;
        platform.id = None;
        Ok(())
    }

    /// Returns the platform's last modification time, if the row exists and
    /// the stored value decodes.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn last_modified(&self, key: DbKey) -> Result<Option<DbTimestamp>, DbError> {
        let ctx = self.session.context();
        let guard = self.session.conn()?;
        let decoded = guard
            .query_row(
                "SELECT lastModifyTime FROM Platform WHERE id = ?1",
                params![key.as_raw()],
                |row| get_timestamp(&ctx.codec, row, 0),
            )
            .optional()?;
        Ok(decoded.flatten())
    }
}

// ============================================================================
// SECTION: Root Row
// ============================================================================

/// Reads the platform root row, returning the raw site and config keys.
fn read_root(
    conn: &Connection,
    ctx: &StoreContext,
    key: DbKey,
) -> Result<(Platform, Option<i64>, Option<i64>), DbError> {
    let designator_col = if ctx.version.version >= VERSION_7 {
        ", platformDesignator"
    } else {
        ", NULL"
    };
    let sql = format!(
        "SELECT agency, isProduction, siteId, configId, description, lastModifyTime, \
         expiration{designator_col} FROM Platform WHERE id = ?1"
    );
    conn.query_row(&sql, params![key.as_raw()], |row| {
        let platform = Platform {
            id: Some(key),
            agency: row.get(0)?,
            is_production: parse_bool(row.get(1)?),
            site: None,
            config: None,
            description: row.get(4)?,
            last_modify_time: get_timestamp(&ctx.codec, row, 5)?,
            expiration: get_timestamp(&ctx.codec, row, 6)?,
            designator: row.get(7)?,
            transport_media: Vec::new(),
            sensors: Vec::new(),
            properties: Vec::new(),
        };
        Ok((platform, row.get::<_, Option<i64>>(2)?, row.get::<_, Option<i64>>(3)?))
    })
    .optional()?
    .ok_or_else(|| DbError::Invalid(format!("no platform with key {key}")))
}

/// Finds the platform matching the natural key at the resolved version.
fn lookup_natural(
    conn: &Connection,
    ctx: &StoreContext,
    site_id: DbKey,
    designator: Option<&str>,
) -> Result<Option<DbKey>, DbError> {
    let found: Option<i64> = if ctx.version.version >= VERSION_7 {
        match designator {
            Some(d) => conn
                .query_row(
                    "SELECT id FROM Platform WHERE siteId = ?1 AND platformDesignator = ?2",
                    params![site_id.as_raw(), d],
                    |row| row.get(0),
                )
                .optional()?,
            None => conn
                .query_row(
                    "SELECT id FROM Platform WHERE siteId = ?1 AND platformDesignator IS NULL",
                    params![site_id.as_raw()],
                    |row| row.get(0),
                )
                .optional()?,
        }
    } else {
        conn.query_row(
            "SELECT id FROM Platform WHERE siteId = ?1",
            params![site_id.as_raw()],
            |row| row.get(0),
        )
        .optional()?
    };
    Ok(found.map(DbKey::new))
}

/// The write algorithm body, run inside the caller's transaction.
fn write_platform(
    conn: &Connection,
    ctx: &StoreContext,
    platform: &mut Platform,
) -> Result<DbKey, DbError> {
    let site_id = match platform.site.as_ref() {
        Some(site) => {
            if site.id.is_none() {
                warn!("platform site reference is unsaved, storing NULL");
            }
            site.id.map(DbKey::as_raw)
        }
        None => None,
    };
    let config_id = match platform.config.as_ref() {
        Some(config) => {
            if config.id.is_none() {
                warn!("platform configuration reference is unsaved, storing NULL");
            }
            config.id.map(DbKey::as_raw)
        }
        None => None,
    };
    if platform.id.is_none()
        && let Some(site_id) = site_id
        && let Some(found) = lookup_natural(
            conn,
            ctx,
            DbKey::new(site_id),
            platform.designator.as_deref(),
        )?
    {
        platform.id = Some(found);
    }
    platform.last_modify_time = Some(ctx.codec.now());
    let versioned = ctx.version.version;
    if versioned < VERSION_7 && platform.designator.is_some() {
        warn!(version = versioned, "platform designator predates this schema, dropping");
    }
    let lmt = ctx.codec.encode(platform.last_modify_time);
    let expiration = ctx.codec.encode(platform.expiration);

    let key = match platform.id {
        Some(key) => {
            let mut sql = String::from(
                "UPDATE Platform SET agency = ?2, isProduction = ?3, siteId = ?4, \
                 configId = ?5, description = ?6, lastModifyTime = ?7, expiration = ?8",
            );
            if versioned >= VERSION_7 {
                sql.push_str(", platformDesignator = ?9");
            }
            sql.push_str(" WHERE id = ?1");
            let mut values = vec![
                Value::Integer(key.as_raw()),
                opt_text(platform.agency.clone()),
                Value::Text(sql_bool(platform.is_production).to_string()),
                opt_int(site_id),
                opt_int(config_id),
                opt_text(platform.description.clone()),
                lmt,
                expiration,
            ];
            if versioned >= VERSION_7 {
                values.push(opt_text(platform.designator.clone()));
            }
            conn.execute(&sql, params_from_iter(values))?;
            delete_children(conn, ctx, key)?;
            key
        }
        None => {
            let key = ctx.keygen.key("Platform", conn)?;
            let mut sql = String::from(
                "INSERT INTO Platform (id, agency, isProduction, siteId, configId, \
                 description, lastModifyTime, expiration",
            );
            let mut tail = String::from(") VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8");
            if versioned >= VERSION_7 {
                sql.push_str(", platformDesignator");
                tail.push_str(", ?9");
            }
            sql.push_str(&tail);
            sql.push(')');
            let mut values = vec![
                Value::Integer(key.as_raw()),
                opt_text(platform.agency.clone()),
                Value::Text(sql_bool(platform.is_production).to_string()),
                opt_int(site_id),
                opt_int(config_id),
                opt_text(platform.description.clone()),
                lmt,
                expiration,
            ];
            if versioned >= VERSION_7 {
                values.push(opt_text(platform.designator.clone()));
            }
            conn.execute(&sql, params_from_iter(values))?;
            platform.id = Some(key);
            key
        }
    };

    insert_media(conn, ctx, key, &platform.transport_media)?;
    insert_sensors(conn, ctx, key, &platform.sensors)?;
    if versioned >= VERSION_6 {
        PropertiesDao::replace(conn, "PlatformProperty", "platformId", key.as_raw(), &platform.properties)?;
    } else if !platform.properties.is_empty() {
        warn!(version = versioned, "platform properties predate this schema, dropping");
    }
    Ok(key)
}

/// Deletes all child rows for one platform.
fn delete_children(conn: &Connection, ctx: &StoreContext, key: DbKey) -> Result<(), DbError> {
    if ctx.version.version >= VERSION_6 {
        PropertiesDao::delete(conn, "PlatformSensorProperty", "platformId", key.as_raw())?;
    }
    conn.execute(
        "DELETE FROM PlatformSensor WHERE platformId = ?1",
        params![key.as_raw()],
    )?;
    conn.execute(
        "DELETE FROM TransportMedium WHERE platformId = ?1",
        params![key.as_raw()],
    )?;
    Ok(())
}

// ============================================================================
// SECTION: Transport Media
// ============================================================================

/// Transport-medium columns shared by every schema version.
const TM_BASE_COLUMNS: &[&str] = &[
    "mediumType",
    "mediumId",
    "scriptName",
    "channelNum",
    "assignedTime",
    "transmitWindow",
    "transmitInterval",
    "equipmentId",
];
/// Columns added at schema version 6.
const TM_V6_COLUMNS: &[&str] = &["timeAdjustment", "preamble"];
/// Column added at schema version 7.
const TM_V7_COLUMNS: &[&str] = &["timeZone"];
/// Logger/serial columns added at schema version 11.
const TM_V11_COLUMNS: &[&str] = &[
    "loggerType",
    "baud",
    "stopBits",
    "parity",
    "dataBits",
    "doLogin",
    "username",
    "password",
];

/// Returns the transport-medium columns valid at a version.
fn tm_columns(version: i32) -> Vec<&'static str> {
    let mut cols: Vec<&'static str> = TM_BASE_COLUMNS.to_vec();
    if version >= VERSION_6 {
        cols.extend_from_slice(TM_V6_COLUMNS);
    }
    if version >= VERSION_7 {
        cols.extend_from_slice(TM_V7_COLUMNS);
    }
    if version >= VERSION_11 {
        cols.extend_from_slice(TM_V11_COLUMNS);
    }
    cols
}

/// Builds the version-gated insert statement for one transport medium.
///
/// Public so callers auditing statement generation can inspect the exact
/// column set emitted for a schema version.
#[must_use]
pub fn tm_insert_sql(version: i32) -> String {
    let cols = tm_columns(version);
    let placeholders: Vec<String> = (1..=cols.len() + 1).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO TransportMedium (platformId, {}) VALUES ({})",
        cols.join(", "),
        placeholders.join(", ")
    )
}

/// Builds the bound values for one transport medium at a version.
fn tm_values(version: i32, platform_id: i64, tm: &TransportMedium) -> Vec<Value> {
    let mut values = vec![
        Value::Integer(platform_id),
        Value::Text(tm.medium_type.clone()),
        Value::Text(tm.medium_id.clone()),
        opt_text(tm.script_name.clone()),
        opt_i32(tm.channel_num),
        opt_i32(tm.assigned_time),
        opt_i32(tm.transmit_window),
        opt_i32(tm.transmit_interval),
        opt_int(tm.equipment_id.map(DbKey::as_raw)),
    ];
    if version >= VERSION_6 {
        values.push(Value::Integer(i64::from(tm.time_adjustment)));
        values.push(opt_text(char_to_sql(tm.preamble)));
    } else if tm.preamble.is_some() || tm.time_adjustment != 0 {
        warn!(version, "transport medium preamble/time adjustment predate this schema, dropping");
    }
    if version >= VERSION_7 {
        values.push(opt_text(tm.time_zone.clone()));
    } else if tm.time_zone.is_some() {
        warn!(version, "transport medium time zone predates this schema, dropping");
    }
    if version >= VERSION_11 {
        values.push(opt_text(tm.logger_type.clone()));
        values.push(opt_i32(tm.baud));
        values.push(opt_i32(tm.stop_bits));
        values.push(opt_text(char_to_sql(tm.parity)));
        values.push(opt_i32(tm.data_bits));
        values.push(Value::Text(sql_bool(tm.do_login).to_string()));
        values.push(opt_text(tm.username.clone()));
        values.push(opt_text(tm.password.clone()));
    } else if tm.logger_type.is_some() || tm.baud.is_some() {
        warn!(version, "transport medium logger columns predate this schema, dropping");
    }
    values
}

/// Inserts the transport media for one platform, skipping empty media.
fn insert_media(
    conn: &Connection,
    ctx: &StoreContext,
    key: DbKey,
    media: &[TransportMedium],
) -> Result<(), DbError> {
    let version = ctx.version.version;
    let sql = tm_insert_sql(version);
    let mut stmt = conn.prepare(&sql)?;
    for tm in media {
        if tm.is_empty() {
            warn!(platform = %key, "skipping empty transport medium");
            continue;
        }
        stmt.execute(params_from_iter(tm_values(version, key.as_raw(), tm)))?;
    }
    Ok(())
}

/// Reads the transport media for one platform.
fn read_media(
    conn: &Connection,
    ctx: &StoreContext,
    key: DbKey,
) -> Result<Vec<TransportMedium>, DbError> {
    let version = ctx.version.version;
    let cols = tm_columns(version);
    let sql = format!(
        "SELECT {} FROM TransportMedium WHERE platformId = ?1 ORDER BY rowid",
        cols.join(", ")
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![key.as_raw()], |row| tm_from_row(version, row))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
}

/// Builds a transport medium from a version-gated row.
fn tm_from_row(version: i32, row: &rusqlite::Row<'_>) -> Result<TransportMedium, rusqlite::Error> {
    let mut tm = TransportMedium {
        medium_type: row.get(0)?,
        medium_id: row.get(1)?,
        script_name: row.get(2)?,
        channel_num: row.get(3)?,
        assigned_time: row.get(4)?,
        transmit_window: row.get(5)?,
        transmit_interval: row.get(6)?,
        equipment_id: row.get::<_, Option<i64>>(7)?.map(DbKey::new),
        ..TransportMedium::default()
    };
    let mut idx = 8;
    if version >= VERSION_6 {
        tm.time_adjustment = row.get::<_, Option<i32>>(idx)?.unwrap_or(0);
        tm.preamble = first_char(row.get(idx + 1)?);
        idx += 2;
    }
    if version >= VERSION_7 {
        tm.time_zone = row.get(idx)?;
        idx += 1;
    }
    if version >= VERSION_11 {
        tm.logger_type = row.get(idx)?;
        tm.baud = row.get(idx + 1)?;
        tm.stop_bits = row.get(idx + 2)?;
        tm.parity = first_char(row.get(idx + 3)?);
        tm.data_bits = row.get(idx + 4)?;
        tm.do_login = parse_bool(row.get(idx + 5)?);
        tm.username = row.get(idx + 6)?;
        tm.password = row.get(idx + 7)?;
    }
    Ok(tm)
}

/// Attaches all transport media to the listed platforms; rows for vanished
/// platforms are logged and ignored.
fn attach_media(
    conn: &Connection,
    ctx: &StoreContext,
    platforms: &mut [Platform],
) -> Result<(), DbError> {
    let version = ctx.version.version;
    let cols = tm_columns(version);
    let sql = format!(
        "SELECT platformId, {} FROM TransportMedium ORDER BY rowid",
        cols.join(", ")
    );
    let mut by_key: HashMap<i64, &mut Platform> = platforms
        .iter_mut()
        .filter_map(|p| p.id.map(|k| (k.as_raw(), p)))
        .collect();
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let platform_id: i64 = row.get(0)?;
        // Column 0 is platformId, so medium columns shift right by one.
        let tm = tm_from_shifted_row(version, row)?;
        match by_key.get_mut(&platform_id) {
            Some(platform) => platform.transport_media.push(tm),
            None => {
                warn!(platform_id, medium = %tm.medium_id, "transport medium references no live platform, ignoring");
            }
        }
    }
    Ok(())
}

/// Builds a transport medium from a row whose first column is the owner id.
fn tm_from_shifted_row(
    version: i32,
    row: &rusqlite::Row<'_>,
) -> Result<TransportMedium, rusqlite::Error> {
    let mut tm = TransportMedium {
        medium_type: row.get(1)?,
        medium_id: row.get(2)?,
        script_name: row.get(3)?,
        channel_num: row.get(4)?,
        assigned_time: row.get(5)?,
        transmit_window: row.get(6)?,
        transmit_interval: row.get(7)?,
        equipment_id: row.get::<_, Option<i64>>(8)?.map(DbKey::new),
        ..TransportMedium::default()
    };
    let mut idx = 9;
    if version >= VERSION_6 {
        tm.time_adjustment = row.get::<_, Option<i32>>(idx)?.unwrap_or(0);
        tm.preamble = first_char(row.get(idx + 1)?);
        idx += 2;
    }
    if version >= VERSION_7 {
        tm.time_zone = row.get(idx)?;
        idx += 1;
    }
    if version >= VERSION_11 {
        tm.logger_type = row.get(idx)?;
        tm.baud = row.get(idx + 1)?;
        tm.stop_bits = row.get(idx + 2)?;
        tm.parity = first_char(row.get(idx + 3)?);
        tm.data_bits = row.get(idx + 4)?;
        tm.do_login = parse_bool(row.get(idx + 5)?);
        tm.username = row.get(idx + 6)?;
        tm.password = row.get(idx + 7)?;
    }
    Ok(tm)
}

// ============================================================================
// SECTION: Platform Sensors
// ============================================================================

/// Inserts the sensor overrides for one platform, skipping empty overrides.
fn insert_sensors(
    conn: &Connection,
    ctx: &StoreContext,
    key: DbKey,
    sensors: &[PlatformSensor],
) -> Result<(), DbError> {
    let version = ctx.version.version;
    let sql = if version >= VERSION_7 {
        "INSERT INTO PlatformSensor (platformId, sensorNumber, siteId, dd_nu) \
         VALUES (?1, ?2, ?3, ?4)"
    } else {
        "INSERT INTO PlatformSensor (platformId, sensorNumber, siteId) VALUES (?1, ?2, ?3)"
    };
    let mut stmt = conn.prepare(sql)?;
    for sensor in sensors {
        if sensor.is_empty() {
            continue;
        }
        if version >= VERSION_7 {
            stmt.execute(params![
                key.as_raw(),
                sensor.sensor_number,
                sensor.site_id.map(DbKey::as_raw),
                sensor.usgs_ddno
            ])?;
        } else {
            if sensor.usgs_ddno.is_some() {
                warn!(version, "sensor USGS DDNO predates this schema, dropping");
            }
            stmt.execute(params![
                key.as_raw(),
                sensor.sensor_number,
                sensor.site_id.map(DbKey::as_raw)
            ])?;
        }
        if version >= VERSION_6 {
            PropertiesDao::replace_secondary(
                conn,
                "PlatformSensorProperty",
                "platformId",
                key.as_raw(),
                "sensorNumber",
                sensor.sensor_number,
                &sensor.properties,
            )?;
        } else if !sensor.properties.is_empty() {
            warn!(version, "platform sensor properties predate this schema, dropping");
        }
    }
    Ok(())
}

/// Reads the sensor overrides for one platform.
fn read_sensors(
    conn: &Connection,
    ctx: &StoreContext,
    key: DbKey,
) -> Result<Vec<PlatformSensor>, DbError> {
    let version = ctx.version.version;
    let ddno_col = if version >= VERSION_7 { ", dd_nu" } else { ", NULL" };
    let sql = format!(
        "SELECT sensorNumber, siteId{ddno_col} FROM PlatformSensor \
         WHERE platformId = ?1 ORDER BY sensorNumber"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![key.as_raw()], |row| {
        Ok(PlatformSensor {
            sensor_number: row.get(0)?,
            site_id: row.get::<_, Option<i64>>(1)?.map(DbKey::new),
            usgs_ddno: row.get(2)?,
            properties: Vec::new(),
        })
    })?;
    let mut sensors = rows.collect::<Result<Vec<_>, _>>()?;
    drop(stmt);
    if version >= VERSION_6 {
        for sensor in &mut sensors {
            sensor.properties = PropertiesDao::read_secondary(
                conn,
                "PlatformSensorProperty",
                "platformId",
                key.as_raw(),
                "sensorNumber",
                sensor.sensor_number,
            )?;
        }
    }
    Ok(sensors)
}

