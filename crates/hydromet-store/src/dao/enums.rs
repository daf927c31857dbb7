// hydromet-store/src/dao/enums.rs
// ============================================================================
// Module: Enumeration DAO
// Description: Persistence for enumeration sets and their values.
// Purpose: Natural key is the enumeration name.
// Dependencies: rusqlite, hydromet-core
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use hydromet_core::DbKey;
use hydromet_core::EnumValue;
use hydromet_core::Enumeration;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::connection::Session;
use crate::connection::StoreContext;
use crate::error::DbError;

// ============================================================================
// SECTION: DAO
// ============================================================================

/// DAO for the `Enum` aggregate root.
pub struct EnumDao<'a> {
    /// Session the DAO executes on.
    session: &'a Session,
}

impl<'a> EnumDao<'a> {
    /// Creates an enumeration DAO on the given session.
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Reads one complete enumeration by key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Invalid`] when no row exists for the key, or
    /// [`DbError::Statement`] on query failure.
    pub fn read(&self, key: DbKey) -> Result<Enumeration, DbError> {
        let guard = self.session.conn()?;
        read_enum(&guard, key)
    }

    /// Lists all enumerations, completely populated (value sets are small).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn list(&self) -> Result<Vec<Enumeration>, DbError> {
        let guard = self.session.conn()?;
        let mut stmt = guard.prepare("SELECT id FROM Enum ORDER BY name")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        keys.into_iter()
            .map(|raw| read_enum(&guard, DbKey::new(raw)))
            .collect()
    }

    /// Finds an enumeration key by name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn lookup(&self, name: &str) -> Result<Option<DbKey>, DbError> {
        let guard = self.session.conn()?;
        lookup_by_name(&guard, name)
    }

    /// Inserts or updates an enumeration and replaces its values.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on statement or key generation failure; the
    /// transaction rolls back.
    pub fn write(&self, enumeration: &mut Enumeration) -> Result<DbKey, DbError> {
        let ctx = self.session.context();
        let mut guard = self.session.conn()?;
        let tx = guard.transaction()?;
        let key = write_enum(&tx, ctx, enumeration)?;
        tx.commit()?;
        Ok(key)
    }

    /// Deletes an enumeration and its values; clears its key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on failure; the transaction rolls back.
    pub fn delete(&self, enumeration: &mut Enumeration) -> Result<(), DbError> {
        let Some(key) = enumeration.id else {
            return Ok(());
        };
        let mut guard = self.session.conn()?;
        let tx = guard.transaction()?;
        tx.execute("DELETE FROM EnumValue WHERE enumId = ?1", params![key.as_raw()])?;
        tx.execute("DELETE FROM Enum WHERE id = ?1", params![key.as_raw()])?;
        tx.commit()?;
        enumeration.id = None;
        Ok(())
    }
}

// ============================================================================
// SECTION: Row Operations
// ============================================================================

/// Finds an enumeration key by name.
fn lookup_by_name(conn: &Connection, name: &str) -> Result<Option<DbKey>, DbError> {
    let found: Option<i64> = conn
        .query_row("SELECT id FROM Enum WHERE name = ?1", params![name], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.map(DbKey::new))
}

/// Reads one enumeration and its values.
fn read_enum(conn: &Connection, key: DbKey) -> Result<Enumeration, DbError> {
    let mut enumeration = conn
        .query_row(
            "SELECT name FROM Enum WHERE id = ?1",
            params![key.as_raw()],
            |row| {
                Ok(Enumeration {
                    id: Some(key),
                    name: row.get(0)?,
                    values: Vec::new(),
                })
            },
        )
        .optional()?
        .ok_or_else(|| DbError::Invalid(format!("no enumeration with key {key}")))?;
    let mut stmt = conn.prepare(
        "SELECT enumValue, description, sortNumber FROM EnumValue \
         WHERE enumId = ?1 ORDER BY sortNumber, rowid",
    )?;
    let values = stmt.query_map(params![key.as_raw()], |row| {
        Ok(EnumValue {
            value: row.get(0)?,
            description: row.get(1)?,
            sort_number: row.get(2)?,
        })
    })?;
    enumeration.values = values.collect::<Result<Vec<_>, _>>()?;
    Ok(enumeration)
}

/// The write algorithm body, run inside the caller's transaction.
fn write_enum(
    conn: &Connection,
    ctx: &StoreContext,
    enumeration: &mut Enumeration,
) -> Result<DbKey, DbError> {
    if enumeration.id.is_none()
        && let Some(found) = lookup_by_name(conn, &enumeration.name)?
    {
        enumeration.id = Some(found);
    }
    let key = match enumeration.id {
        Some(key) => {
            conn.execute(
                "UPDATE Enum SET name = ?2 WHERE id = ?1",
                params![key.as_raw(), enumeration.name],
            )?;
            conn.execute("DELETE FROM EnumValue WHERE enumId = ?1", params![key.as_raw()])?;
            key
        }
        None => {
            let key = ctx.keygen.key("Enum", conn)?;
            conn.execute(
                "INSERT INTO Enum (id, name) VALUES (?1, ?2)",
                params![key.as_raw(), enumeration.name],
            )?;
            enumeration.id = Some(key);
            key
        }
    };
    let mut stmt = conn.prepare(
        "INSERT INTO EnumValue (enumId, enumValue, description, sortNumber) \
         VALUES (?1, ?2, ?3, ?4)",
    )?;
    for value in &enumeration.values {
        stmt.execute(params![
            key.as_raw(),
            value.value,
            value.description,
            value.sort_number
        ])?;
    }
    Ok(key)
}
