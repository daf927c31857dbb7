// hydromet-store/src/dao/site.rs
// ============================================================================
// Module: Site DAO
// Description: Persistence for sites and their typed name records.
// Purpose: Natural key is the preferred (first) site name.
// Dependencies: rusqlite, hydromet-core
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use hydromet_core::DbKey;
use hydromet_core::Site;
use hydromet_core::SiteName;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::connection::Session;
use crate::connection::StoreContext;
use crate::error::DbError;

// ============================================================================
// SECTION: DAO
// ============================================================================

/// DAO for the `Site` aggregate root.
pub struct SiteDao<'a> {
    /// Session the DAO executes on.
    session: &'a Session,
}

impl<'a> SiteDao<'a> {
    /// Creates a site DAO on the given session.
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Reads one complete site by key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Invalid`] when no row exists for the key, or
    /// [`DbError::Statement`] on query failure.
    pub fn read(&self, key: DbKey) -> Result<Site, DbError> {
        let guard = self.session.conn()?;
        read_site(&guard, key)
    }

    /// Reads a site through the identity cache, caching on miss.
    ///
    /// # Errors
    ///
    /// Same as [`read`](Self::read).
    pub fn read_shared(&self, key: DbKey) -> Result<Arc<Site>, DbError> {
        let cache = &self.session.context().cache;
        if let Some(site) = cache.site(key.as_raw()) {
            return Ok(site);
        }
        let site = Arc::new(self.read(key)?);
        cache.put_site(key.as_raw(), Arc::clone(&site));
        Ok(site)
    }

    /// Lists all sites, completely populated (site rows are flat).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn list(&self) -> Result<Vec<Site>, DbError> {
        let guard = self.session.conn()?;
        let mut stmt = guard.prepare("SELECT id FROM Site ORDER BY id")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        keys.into_iter()
            .map(|raw| read_site(&guard, DbKey::new(raw)))
            .collect()
    }

    /// Finds a site key by one of its typed names.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn lookup(&self, name: &SiteName) -> Result<Option<DbKey>, DbError> {
        let guard = self.session.conn()?;
        lookup_by_name(&guard, name)
    }

    /// Inserts or updates a site; the preferred name is the natural key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on statement or key generation failure; the
    /// transaction rolls back.
    pub fn write(&self, site: &mut Site) -> Result<DbKey, DbError> {
        let ctx = self.session.context();
        let mut guard = self.session.conn()?;
        let tx = guard.transaction()?;
        let key = write_site(&tx, ctx, site)?;
        tx.commit()?;
        ctx.cache.put_site(key.as_raw(), Arc::new(site.clone()));
        Ok(key)
    }

    /// Deletes a site and its name records; clears the site's key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on failure; the transaction rolls back.
    pub fn delete(&self, site: &mut Site) -> Result<(), DbError> {
        let Some(key) = site.id else {
            return Ok(());
        };
        let ctx = self.session.context();
        let mut guard = self.session.conn()?;
        let tx = guard.transaction()?;
        tx.execute("DELETE FROM SiteName WHERE siteId = ?1", params![key.as_raw()])?;
        tx.execute("DELETE FROM Site WHERE id = ?1", params![key.as_raw()])?;
        tx.commit()?;
        ctx.cache.evict_site(key.as_raw());
        site.id = None;
        Ok(())
    }
}

// ============================================================================
// SECTION: Row Operations
// ============================================================================

/// Reads one site and its names.
fn read_site(conn: &Connection, key: DbKey) -> Result<Site, DbError> {
    let mut site = conn
        .query_row(
            "SELECT latitude, longitude, elevation, timeZone, country, state_abbr, description \
             FROM Site WHERE id = ?1",
            params![key.as_raw()],
            |row| {
                Ok(Site {
                    id: Some(key),
                    names: Vec::new(),
                    latitude: row.get(0)?,
                    longitude: row.get(1)?,
                    elevation: row.get(2)?,
                    time_zone: row.get(3)?,
                    country: row.get(4)?,
                    state: row.get(5)?,
                    description: row.get(6)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| DbError::Invalid(format!("no site with key {key}")))?;
    let mut stmt = conn.prepare(
        "SELECT nameType, siteName FROM SiteName WHERE siteId = ?1 ORDER BY rowid",
    )?;
    let names = stmt.query_map(params![key.as_raw()], |row| {
        Ok(SiteName::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    site.names = names.collect::<Result<Vec<_>, _>>()?;
    Ok(site)
}

/// Finds a site key by a typed name.
fn lookup_by_name(conn: &Connection, name: &SiteName) -> Result<Option<DbKey>, DbError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT siteId FROM SiteName WHERE nameType = ?1 AND siteName = ?2",
            params![name.name_type, name.name_value],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.map(DbKey::new))
}

/// The write algorithm body, run inside the caller's transaction.
fn write_site(conn: &Connection, ctx: &StoreContext, site: &mut Site) -> Result<DbKey, DbError> {
    if site.id.is_none()
        && let Some(preferred) = site.preferred_name()
        && let Some(found) = lookup_by_name(conn, preferred)?
    {
        site.id = Some(found);
    }
    let key = match site.id {
        Some(key) => {
            conn.execute(
                "UPDATE Site SET latitude = ?2, longitude = ?3, elevation = ?4, timeZone = ?5, \
                 country = ?6, state_abbr = ?7, description = ?8 WHERE id = ?1",
                params![
                    key.as_raw(),
                    site.latitude,
                    site.longitude,
                    site.elevation,
                    site.time_zone,
                    site.country,
                    site.state,
                    site.description
                ],
            )?;
            conn.execute("DELETE FROM SiteName WHERE siteId = ?1", params![key.as_raw()])?;
            key
        }
        None => {
            let key = ctx.keygen.key("Site", conn)?;
            conn.execute(
                "INSERT INTO Site (id, latitude, longitude, elevation, timeZone, country, \
                 state_abbr, description) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    key.as_raw(),
                    site.latitude,
                    site.longitude,
                    site.elevation,
                    site.time_zone,
                    site.country,
                    site.state,
                    site.description
                ],
            )?;
            site.id = Some(key);
            key
        }
    };
    let mut stmt = conn.prepare(
        "INSERT INTO SiteName (siteId, nameType, siteName) VALUES (?1, ?2, ?3)",
    )?;
    for name in &site.names {
        stmt.execute(params![key.as_raw(), name.name_type, name.name_value])?;
    }
    Ok(key)
}
