// hydromet-store/src/dao/routing_spec.rs
// ============================================================================
// Module: Routing Spec DAO
// Description: Persistence for routing specifications.
// Purpose: Natural key is the case-insensitive spec name; the data source
//          reference resolves through the identity cache.
// Dependencies: rusqlite, hydromet-core
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use hydromet_core::DbKey;
use hydromet_core::DbTimestamp;
use hydromet_core::RoutingSpec;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use tracing::warn;

use crate::connection::Session;
use crate::connection::StoreContext;
use crate::dao::data_source::DataSourceDao;
use crate::dao::get_timestamp;
use crate::dao::parse_bool;
use crate::dao::properties::PropertiesDao;
use crate::dao::sql_bool;
use crate::error::DbError;

// ============================================================================
// SECTION: DAO
// ============================================================================

/// DAO for the `RoutingSpec` aggregate root.
pub struct RoutingSpecDao<'a> {
    /// Session the DAO executes on.
    session: &'a Session,
}

impl<'a> RoutingSpecDao<'a> {
    /// Creates a routing spec DAO on the given session.
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Reads one complete routing spec: root, network list names,
    /// properties, and the resolved data source reference.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Invalid`] when no row exists for the key, or
    /// [`DbError::Statement`] on query failure.
    pub fn read(&self, key: DbKey) -> Result<RoutingSpec, DbError> {
        let ctx = self.session.context();
        let (mut spec, source_id) = {
            let guard = self.session.conn()?;
            let (mut spec, source_id) = read_root(&guard, ctx, key)?;
            spec.network_list_names = read_list_names(&guard, key)?;
            spec.properties =
                PropertiesDao::read(&guard, "RoutingSpecProperty", "routingSpecId", key.as_raw())?;
            (spec, source_id)
        };
        if let Some(source_id) = source_id {
            spec.data_source =
                Some(DataSourceDao::new(self.session).read_shared(DbKey::new(source_id))?);
        }
        Ok(spec)
    }

    /// Lists all routing specs, partially populated: root fields only.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn list(&self) -> Result<Vec<RoutingSpec>, DbError> {
        let ctx = self.session.context();
        let guard = self.session.conn()?;
        let mut stmt = guard.prepare("SELECT id FROM RoutingSpec ORDER BY name")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        keys.into_iter()
            .map(|raw| read_root(&guard, ctx, DbKey::new(raw)).map(|(spec, _)| spec))
            .collect()
    }

    /// Finds a routing spec key by case-insensitive name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn lookup(&self, name: &str) -> Result<Option<DbKey>, DbError> {
        let guard = self.session.conn()?;
        lookup_by_name(&guard, name)
    }

    /// Inserts or updates a routing spec and replaces its children.
    ///
    /// Sets `last_modify_time` to the current time. The data source
    /// reference must already be persisted; an unsaved reference is stored
    /// as `NULL` with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on statement or key generation failure; the
    /// transaction rolls back.
    pub fn write(&self, spec: &mut RoutingSpec) -> Result<DbKey, DbError> {
        let ctx = self.session.context();
        let mut guard = self.session.conn()?;
        let tx = guard.transaction()?;
        let key = write_spec(&tx, ctx, spec)?;
        tx.commit()?;
        Ok(key)
    }

    /// Deletes a routing spec and its children; clears the spec's key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on failure; the transaction rolls back.
    pub fn delete(&self, spec: &mut RoutingSpec) -> Result<(), DbError> {
        let Some(key) = spec.id else {
            return Ok(());
        };
        let mut guard = self.session.conn()?;
        let tx = guard.transaction()?;
        PropertiesDao::delete(&tx, "RoutingSpecProperty", "routingSpecId", key.as_raw())?;
        tx.execute(
            "DELETE FROM RoutingSpecNetworkList WHERE routingSpecId = ?1",
            params![key.as_raw()],
        )?;
        tx.execute("DELETE FROM RoutingSpec WHERE id = ?1", params![key.as_raw()])?;
        tx.commit()?;
        spec.id = None;
        Ok(())
    }

    /// Returns the spec's last modification time.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn last_modified(&self, key: DbKey) -> Result<Option<DbTimestamp>, DbError> {
        let ctx = self.session.context();
        let guard = self.session.conn()?;
        let decoded = guard
            .query_row(
                "SELECT lastModifyTime FROM RoutingSpec WHERE id = ?1",
                params![key.as_raw()],
                |row| get_timestamp(&ctx.codec, row, 0),
            )
            .optional()?;
        Ok(decoded.flatten())
    }
}

// ============================================================================
// SECTION: Row Operations
// ============================================================================

/// Finds a routing spec key by case-insensitive name.
fn lookup_by_name(conn: &Connection, name: &str) -> Result<Option<DbKey>, DbError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM RoutingSpec WHERE LOWER(name) = LOWER(?1)",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.map(DbKey::new))
}

/// Reads one routing spec root row, returning the raw data source key.
fn read_root(
    conn: &Connection,
    ctx: &StoreContext,
    key: DbKey,
) -> Result<(RoutingSpec, Option<i64>), DbError> {
    conn.query_row(
        "SELECT name, dataSourceId, enableEquations, usePerformanceMeasurements, \
         outputFormat, outputTimeZone, presentationGroupName, sinceTime, untilTime, \
         consumerType, consumerArg, lastModifyTime, isProduction \
         FROM RoutingSpec WHERE id = ?1",
        params![key.as_raw()],
        |row| {
            let spec = RoutingSpec {
                id: Some(key),
                name: row.get(0)?,
                data_source: None,
                enable_equations: parse_bool(row.get(2)?),
                use_performance_measurements: parse_bool(row.get(3)?),
                output_format: row.get(4)?,
                output_time_zone: row.get(5)?,
                presentation_group_name: row.get(6)?,
                since_time: row.get(7)?,
                until_time: row.get(8)?,
                consumer_type: row.get(9)?,
                consumer_arg: row.get(10)?,
                last_modify_time: get_timestamp(&ctx.codec, row, 11)?,
                is_production: parse_bool(row.get(12)?),
                network_list_names: Vec::new(),
                properties: Vec::new(),
            };
            Ok((spec, row.get::<_, Option<i64>>(1)?))
        },
    )
    .optional()?
    .ok_or_else(|| DbError::Invalid(format!("no routing spec with key {key}")))
}

/// Reads the network list names of one routing spec.
fn read_list_names(conn: &Connection, key: DbKey) -> Result<Vec<String>, DbError> {
    let mut stmt = conn.prepare(
        "SELECT networkListName FROM RoutingSpecNetworkList \
         WHERE routingSpecId = ?1 ORDER BY rowid",
    )?;
    let rows = stmt.query_map(params![key.as_raw()], |row| row.get::<_, String>(0))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
}

/// The write algorithm body, run inside the caller's transaction.
fn write_spec(
    conn: &Connection,
    ctx: &StoreContext,
    spec: &mut RoutingSpec,
) -> Result<DbKey, DbError> {
    if spec.id.is_none()
        && let Some(found) = lookup_by_name(conn, &spec.name)?
    {
        spec.id = Some(found);
    }
    let source_id = match spec.data_source.as_ref() {
        Some(source) => {
            if source.id.is_none() {
                warn!(spec = %spec.name, "routing spec data source reference is unsaved, storing NULL");
            }
            source.id.map(DbKey::as_raw)
        }
        None => None,
    };
    spec.last_modify_time = Some(ctx.codec.now());
    let lmt = ctx.codec.encode(spec.last_modify_time);

    let key = match spec.id {
        Some(key) => {
            conn.execute(
                "UPDATE RoutingSpec SET name = ?2, dataSourceId = ?3, enableEquations = ?4, \
                 usePerformanceMeasurements = ?5, outputFormat = ?6, outputTimeZone = ?7, \
                 presentationGroupName = ?8, sinceTime = ?9, untilTime = ?10, \
                 consumerType = ?11, consumerArg = ?12, lastModifyTime = ?13, \
                 isProduction = ?14 WHERE id = ?1",
                params![
                    key.as_raw(),
                    spec.name,
                    source_id,
                    sql_bool(spec.enable_equations),
                    sql_bool(spec.use_performance_measurements),
                    spec.output_format,
                    spec.output_time_zone,
                    spec.presentation_group_name,
                    spec.since_time,
                    spec.until_time,
                    spec.consumer_type,
                    spec.consumer_arg,
                    lmt,
                    sql_bool(spec.is_production)
                ],
            )?;
            conn.execute(
                "DELETE FROM RoutingSpecNetworkList WHERE routingSpecId = ?1",
                params![key.as_raw()],
            )?;
            key
        }
        None => {
            let key = ctx.keygen.key("RoutingSpec", conn)?;
            conn.execute(
                "INSERT INTO RoutingSpec (id, name, dataSourceId, enableEquations, \
                 usePerformanceMeasurements, outputFormat, outputTimeZone, \
                 presentationGroupName, sinceTime, untilTime, consumerType, consumerArg, \
                 lastModifyTime, isProduction) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    key.as_raw(),
                    spec.name,
                    source_id,
                    sql_bool(spec.enable_equations),
                    sql_bool(spec.use_performance_measurements),
                    spec.output_format,
                    spec.output_time_zone,
                    spec.presentation_group_name,
                    spec.since_time,
                    spec.until_time,
                    spec.consumer_type,
                    spec.consumer_arg,
                    lmt,
                    sql_bool(spec.is_production)
                ],
            )?;
            spec.id = Some(key);
            key
        }
    };

    let mut stmt = conn.prepare(
        "INSERT INTO RoutingSpecNetworkList (routingSpecId, networkListName) VALUES (?1, ?2)",
    )?;
    for name in &spec.network_list_names {
        stmt.execute(params![key.as_raw(), name])?;
    }
    drop(stmt);
    PropertiesDao::replace(
        conn,
        "RoutingSpecProperty",
        "routingSpecId",
        key.as_raw(),
        &spec.properties,
    )?;
    Ok(key)
}
