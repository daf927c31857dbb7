// hydromet-store/src/dao/data_source.rs
// ============================================================================
// Module: Data Source DAO
// Description: Persistence for data source records.
// Purpose: Natural key is the source name; flat root with no children.
// Dependencies: rusqlite, hydromet-core
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use hydromet_core::DataSource;
use hydromet_core::DbKey;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::connection::Session;
use crate::error::DbError;

// ============================================================================
// SECTION: DAO
// ============================================================================

/// DAO for the `DataSource` aggregate root.
pub struct DataSourceDao<'a> {
    /// Session the DAO executes on.
    session: &'a Session,
}

impl<'a> DataSourceDao<'a> {
    /// Creates a data source DAO on the given session.
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Reads one data source by key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Invalid`] when no row exists for the key, or
    /// [`DbError::Statement`] on query failure.
    pub fn read(&self, key: DbKey) -> Result<DataSource, DbError> {
        let guard = self.session.conn()?;
        read_source(&guard, key)
    }

    /// Reads a data source through the identity cache, caching on miss.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn read_shared(&self, key: DbKey) -> Result<Arc<DataSource>, DbError> {
        let cache = &self.session.context().cache;
        if let Some(source) = cache.data_source(key.as_raw()) {
            return Ok(source);
        }
        let source = Arc::new(self.read(key)?);
        cache.put_data_source(key.as_raw(), Arc::clone(&source));
        Ok(source)
    }

    /// Lists all data sources.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn list(&self) -> Result<Vec<DataSource>, DbError> {
        let guard = self.session.conn()?;
        let mut stmt = guard.prepare(
            "SELECT id, name, dataSourceType, dataSourceArg FROM DataSource ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DataSource {
                id: Some(DbKey::new(row.get(0)?)),
                name: row.get(1)?,
                source_type: row.get(2)?,
                argument: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Finds a data source key by name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn lookup(&self, name: &str) -> Result<Option<DbKey>, DbError> {
        let guard = self.session.conn()?;
        lookup_by_name(&guard, name)
    }

    /// Inserts or updates a data source by natural key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on statement or key generation failure; the
    /// transaction rolls back.
    pub fn write(&self, source: &mut DataSource) -> Result<DbKey, DbError> {
        let ctx = self.session.context();
        let mut guard = self.session.conn()?;
        let tx = guard.transaction()?;
        if source.id.is_none()
            && let Some(found) = lookup_by_name(&tx, &source.name)?
        {
            source.id = Some(found);
        }
        let key = match source.id {
            Some(key) => {
                tx.execute(
                    "UPDATE DataSource SET name = ?2, dataSourceType = ?3, dataSourceArg = ?4 \
                     WHERE id = ?1",
                    params![key.as_raw(), source.name, source.source_type, source.argument],
                )?;
                key
            }
            None => {
                let key = ctx.keygen.key("DataSource", &tx)?;
                tx.execute(
                    "INSERT INTO DataSource (id, name, dataSourceType, dataSourceArg) \
                     VALUES (?1, ?2, ?3, ?4)",
                    params![key.as_raw(), source.name, source.source_type, source.argument],
                )?;
                source.id = Some(key);
                key
            }
        };
        tx.commit()?;
        ctx.cache.put_data_source(key.as_raw(), Arc::new(source.clone()));
        Ok(key)
    }

    /// Deletes a data source; clears its key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on failure.
    pub fn delete(&self, source: &mut DataSource) -> Result<(), DbError> {
        let Some(key) = source.id else {
            return Ok(());
        };
        let ctx = self.session.context();
        let guard = self.session.conn()?;
        guard.execute("DELETE FROM DataSource WHERE id = ?1", params![key.as_raw()])?;
        ctx.cache.evict_data_source(key.as_raw());
        source.id = None;
        Ok(())
    }
}

// ============================================================================
// SECTION: Row Operations
// ============================================================================

/// Reads one data source row.
fn read_source(conn: &Connection, key: DbKey) -> Result<DataSource, DbError> {
    conn.query_row(
        "SELECT name, dataSourceType, dataSourceArg FROM DataSource WHERE id = ?1",
        params![key.as_raw()],
        |row| {
            Ok(DataSource {
                id: Some(key),
                name: row.get(0)?,
                source_type: row.get(1)?,
                argument: row.get(2)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| DbError::Invalid(format!("no data source with key {key}")))
}

/// Finds a data source key by name.
fn lookup_by_name(conn: &Connection, name: &str) -> Result<Option<DbKey>, DbError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM DataSource WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.map(DbKey::new))
}
