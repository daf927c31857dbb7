// hydromet-store/src/dao/network_list.rs
// ============================================================================
// Module: Network List DAO
// Description: Persistence for network lists and their entries.
// Purpose: Natural key is the list name; entry columns grew at version 11.
// Dependencies: rusqlite, hydromet-core, time
// ============================================================================

//! ## Overview
//! Below schema version 6 the list table has no `lastModifyTime` column;
//! callers polling for changes still need an answer, so `last_modified`
//! substitutes the current time truncated to the half-hour boundary. Entry
//! rows gained a cached platform name and description at version 11.

// ============================================================================
// SECTION: Imports
// ============================================================================

use hydromet_core::DbKey;
use hydromet_core::DbTimestamp;
use hydromet_core::NetworkList;
use hydromet_core::NetworkListEntry;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use time::OffsetDateTime;
use tracing::warn;

use crate::connection::Session;
use crate::connection::StoreContext;
use crate::dao::get_timestamp;
use crate::error::DbError;
use crate::version::VERSION_6;
use crate::version::VERSION_11;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Truncation unit for the legacy last-modified substitute, in seconds.
const HALF_HOUR_SECS: i64 = 1800;

// ============================================================================
// SECTION: DAO
// ============================================================================

/// DAO for the `NetworkList` aggregate root.
pub struct NetworkListDao<'a> {
    /// Session the DAO executes on.
    session: &'a Session,
}

impl<'a> NetworkListDao<'a> {
    /// Creates a network list DAO on the given session.
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Reads one complete network list by key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Invalid`] when no row exists for the key, or
    /// [`DbError::Statement`] on query failure.
    pub fn read(&self, key: DbKey) -> Result<NetworkList, DbError> {
        let ctx = self.session.context();
        let guard = self.session.conn()?;
        let mut list = read_root(&guard, ctx, key)?;
        list.entries = read_entries(&guard, ctx, key)?;
        Ok(list)
    }

    /// Lists all network lists, partially populated: root fields only.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn list(&self) -> Result<Vec<NetworkList>, DbError> {
        let ctx = self.session.context();
        let guard = self.session.conn()?;
        let mut stmt = guard.prepare("SELECT id FROM NetworkList ORDER BY name")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        keys.into_iter()
            .map(|raw| read_root(&guard, ctx, DbKey::new(raw)))
            .collect()
    }

    /// Finds a network list key by name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn lookup(&self, name: &str) -> Result<Option<DbKey>, DbError> {
        let guard = self.session.conn()?;
        lookup_by_name(&guard, name)
    }

    /// Inserts or updates a network list and replaces its entries.
    ///
    /// Sets `last_modify_time` to the current time on schemas that store it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on statement or key generation failure; the
    /// transaction rolls back.
    pub fn write(&self, list: &mut NetworkList) -> Result<DbKey, DbError> {
        let ctx = self.session.context();
        let mut guard = self.session.conn()?;
        let tx = guard.transaction()?;
        let key = write_list(&tx, ctx, list)?;
        tx.commit()?;
        Ok(key)
    }

    /// Deletes a network list and its entries; clears the list's key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on failure; the transaction rolls back.
    pub fn delete(&self, list: &mut NetworkList) -> Result<(), DbError> {
        let Some(key) = list.id else {
            return Ok(());
        };
        let mut guard = self.session.conn()?;
        let tx = guard.transaction()?;
        tx.execute(
            "DELETE FROM NetworkListEntry WHERE networkListId = ?1",
            params![key.as_raw()],
        )?;
        tx.execute("DELETE FROM NetworkList WHERE id = ?1", params![key.as_raw()])?;
        tx.commit()?;
        list.id = None;
        Ok(())
    }

    /// Returns the list's last modification time.
    ///
    /// Below schema version 6 the column does not exist; the current time
    /// truncated to the half-hour boundary is substituted so polling callers
    /// refresh at most every thirty minutes.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn last_modified(&self, key: DbKey) -> Result<Option<DbTimestamp>, DbError> {
        let ctx = self.session.context();
        if ctx.version.version < VERSION_6 {
            return Ok(Some(half_hour_floor(ctx.codec.now())));
        }
        let guard = self.session.conn()?;
        let decoded = guard
            .query_row(
                "SELECT lastModifyTime FROM NetworkList WHERE id = ?1",
                params![key.as_raw()],
                |row| get_timestamp(&ctx.codec, row, 0),
            )
            .optional()?;
        Ok(decoded.flatten())
    }
}

/// Truncates a timestamp down to the previous half-hour boundary.
fn half_hour_floor(now: OffsetDateTime) -> OffsetDateTime {
    let epoch = now.unix_timestamp();
    let floored = (epoch / HALF_HOUR_SECS) * HALF_HOUR_SECS;
    OffsetDateTime::from_unix_timestamp(floored)
        .map_or(now, |ts| ts.to_offset(now.offset()))
}

// ============================================================================
// SECTION: Row Operations
// ============================================================================

/// Finds a network list key by name.
fn lookup_by_name(conn: &Connection, name: &str) -> Result<Option<DbKey>, DbError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM NetworkList WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.map(DbKey::new))
}

/// Reads one network list root row.
fn read_root(conn: &Connection, ctx: &StoreContext, key: DbKey) -> Result<NetworkList, DbError> {
    let lmt_col = if ctx.version.version >= VERSION_6 {
        ", lastModifyTime"
    } else {
        ", NULL"
    };
    let sql = format!(
        "SELECT name, transportMediumType, siteNameTypePreference{lmt_col} \
         FROM NetworkList WHERE id = ?1"
    );
    conn.query_row(&sql, params![key.as_raw()], |row| {
        Ok(NetworkList {
            id: Some(key),
            name: row.get(0)?,
            transport_medium_type: row.get(1)?,
            site_name_type_preference: row.get(2)?,
            last_modify_time: get_timestamp(&ctx.codec, row, 3)?,
            entries: Vec::new(),
        })
    })
    .optional()?
    .ok_or_else(|| DbError::Invalid(format!("no network list with key {key}")))
}

/// Reads the entries of one network list.
fn read_entries(
    conn: &Connection,
    ctx: &StoreContext,
    key: DbKey,
) -> Result<Vec<NetworkListEntry>, DbError> {
    let extra = if ctx.version.version >= VERSION_11 {
        ", platform_name, description"
    } else {
        ", NULL, NULL"
    };
    let sql = format!(
        "SELECT transportId{extra} FROM NetworkListEntry \
         WHERE networkListId = ?1 ORDER BY rowid"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![key.as_raw()], |row| {
        Ok(NetworkListEntry {
            transport_id: row.get(0)?,
            platform_name: row.get(1)?,
            description: row.get(2)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
}

/// The write algorithm body, run inside the caller's transaction.
fn write_list(
    conn: &Connection,
    ctx: &StoreContext,
    list: &mut NetworkList,
) -> Result<DbKey, DbError> {
    if list.id.is_none()
        && let Some(found) = lookup_by_name(conn, &list.name)?
    {
        list.id = Some(found);
    }
    let version = ctx.version.version;
    if version >= VERSION_6 {
        list.last_modify_time = Some(ctx.codec.now());
    }
    let lmt = ctx.codec.encode(list.last_modify_time);

    let key = match list.id {
        Some(key) => {
            if version >= VERSION_6 {
                conn.execute(
                    "UPDATE NetworkList SET name = ?2, transportMediumType = ?3, \
                     siteNameTypePreference = ?4, lastModifyTime = ?5 WHERE id = ?1",
                    params![
                        key.as_raw(),
                        list.name,
                        list.transport_medium_type,
                        list.site_name_type_preference,
                        lmt
                    ],
                )?;
            } else {
                conn.execute(
                    "UPDATE NetworkList SET name = ?2, transportMediumType = ?3, \
                     siteNameTypePreference = ?4 WHERE id = ?1",
                    params![
                        key.as_raw(),
                        list.name,
                        list.transport_medium_type,
                        list.site_name_type_preference
                    ],
                )?;
            }
            conn.execute(
                "DELETE FROM NetworkListEntry WHERE networkListId = ?1",
                params![key.as_raw()],
            )?;
            key
        }
        None => {
            let key = ctx.keygen.key("NetworkList", conn)?;
            if version >= VERSION_6 {
                conn.execute(
                    "INSERT INTO NetworkList (id, name, transportMediumType, \
                     siteNameTypePreference, lastModifyTime) VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        key.as_raw(),
                        list.name,
                        list.transport_medium_type,
                        list.site_name_type_preference,
                        lmt
                    ],
                )?;
            } else {
                conn.execute(
                    "INSERT INTO NetworkList (id, name, transportMediumType, \
                     siteNameTypePreference) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        key.as_raw(),
                        list.name,
                        list.transport_medium_type,
                        list.site_name_type_preference
                    ],
                )?;
            }
            list.id = Some(key);
            key
        }
    };

    let version_11 = version >= VERSION_11;
    if !version_11
        && list
            .entries
            .iter()
            .any(|e| e.platform_name.is_some() || e.description.is_some())
    {
        warn!(version, "network list entry platform names predate this schema, dropping");
    }
    let sql = if version_11 {
        "INSERT INTO NetworkListEntry (networkListId, transportId, platform_name, description) \
         VALUES (?1, ?2, ?3, ?4)"
    } else {
        "INSERT INTO NetworkListEntry (networkListId, transportId) VALUES (?1, ?2)"
    };
    let mut stmt = conn.prepare(sql)?;
    for entry in &list.entries {
        if version_11 {
            stmt.execute(params![
                key.as_raw(),
                entry.transport_id,
                entry.platform_name,
                entry.description
            ])?;
        } else {
            stmt.execute(params![key.as_raw(), entry.transport_id])?;
        }
    }
    Ok(key)
}
