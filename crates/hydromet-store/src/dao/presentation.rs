// hydromet-store/src/dao/presentation.rs
// ============================================================================
// Module: Presentation Group DAO
// Description: Persistence for presentation groups and rounding rules.
// Purpose: Natural key is the group name; rounding rules are grandchildren
//          cleaned up by two-step id collection.
// Dependencies: rusqlite, hydromet-core, tracing
// ============================================================================

//! ## Overview
//! Data presentations are keyed children of a group; rounding rules hang off
//! data presentations by id. Deleting a group (or replacing its children on
//! update) first collects the presentation ids, then removes rules by id
//! list, then the presentations, then the group. The presentation column set
//! grew twice: `maxDecimals` at version 6, `minValue`/`maxValue` at 10.

// ============================================================================
// SECTION: Imports
// ============================================================================

use hydromet_core::DataPresentation;
use hydromet_core::DbKey;
use hydromet_core::DbTimestamp;
use hydromet_core::PresentationGroup;
use hydromet_core::RoundingRule;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use tracing::warn;

use crate::connection::Session;
use crate::connection::StoreContext;
use crate::dao::get_timestamp;
use crate::dao::opt_i32;
use crate::dao::opt_text;
use crate::dao::parse_bool;
use crate::dao::sql_bool;
use crate::error::DbError;
use crate::version::VERSION_6;
use crate::version::VERSION_10;

// ============================================================================
// SECTION: DAO
// ============================================================================

/// DAO for the `PresentationGroup` aggregate root.
pub struct PresentationGroupDao<'a> {
    /// Session the DAO executes on.
    session: &'a Session,
}

impl<'a> PresentationGroupDao<'a> {
    /// Creates a presentation group DAO on the given session.
    #[must_use]
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Reads one complete presentation group by key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Invalid`] when no row exists for the key, or
    /// [`DbError::Statement`] on query failure.
    pub fn read(&self, key: DbKey) -> Result<PresentationGroup, DbError> {
        let ctx = self.session.context();
        let guard = self.session.conn()?;
        let mut group = read_root(&guard, ctx, key)?;
        group.presentations = read_presentations(&guard, ctx, key)?;
        Ok(group)
    }

    /// Lists all groups, partially populated: root fields only.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn list(&self) -> Result<Vec<PresentationGroup>, DbError> {
        let ctx = self.session.context();
        let guard = self.session.conn()?;
        let mut stmt = guard.prepare("SELECT id FROM PresentationGroup ORDER BY name")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        keys.into_iter()
            .map(|raw| read_root(&guard, ctx, DbKey::new(raw)))
            .collect()
    }

    /// Finds a group key by name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn lookup(&self, name: &str) -> Result<Option<DbKey>, DbError> {
        let guard = self.session.conn()?;
        lookup_by_name(&guard, name)
    }

    /// Inserts or updates a group and replaces all children.
    ///
    /// Sets `last_modify_time` to the current time.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] on statement or key generation failure; the
    /// transaction rolls back.
    pub fn write(&self, group: &mut PresentationGroup) -> Result<DbKey, DbError> {
        let ctx = self.session.context();
        let mut guard = self.session.conn()?;
        let tx = guard.transaction()?;
        let key = write_group(&tx, ctx, group)?;
        tx.commit()?;
        Ok(key)
    }

    /// Deletes a group and all its children, deepest-first; clears the
    /// group's key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on failure; the transaction rolls back.
    pub fn delete(&self, group: &mut PresentationGroup) -> Result<(), DbError> {
        let Some(key) = group.id else {
            return Ok(());
        };
        let mut guard = self.session.conn()?;
        let tx = guard.transaction()?;
        delete_children(&tx, key)?;
        tx.execute(
            "DELETE FROM PresentationGroup WHERE id = ?1",
            params![key.as_raw()],
        )?;
        tx.commit()?;
        group.id = None;
        Ok(())
    }

    /// Returns the group's last modification time.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Statement`] on query failure.
    pub fn last_modified(&self, key: DbKey) -> Result<Option<DbTimestamp>, DbError> {
        let ctx = self.session.context();
        let guard = self.session.conn()?;
        let decoded = guard
            .query_row(
                "SELECT lastModifyTime FROM PresentationGroup WHERE id = ?1",
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

/// Finds a group key by name.
fn lookup_by_name(conn: &Connection, name: &str) -> Result<Option<DbKey>, DbError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM PresentationGroup WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.map(DbKey::new))
}

/// Reads one group root row.
fn read_root(
    conn: &Connection,
    ctx: &StoreContext,
    key: DbKey,
) -> Result<PresentationGroup, DbError> {
    conn.query_row(
        "SELECT name, inheritsFrom, lastModifyTime, isProduction \
         FROM PresentationGroup WHERE id = ?1",
        params![key.as_raw()],
        |row| {
            Ok(PresentationGroup {
                id: Some(key),
                name: row.get(0)?,
                inherits_from: row.get(1)?,
                last_modify_time: get_timestamp(&ctx.codec, row, 2)?,
                is_production: parse_bool(row.get(3)?),
                presentations: Vec::new(),
            })
        },
    )
    .optional()?
    .ok_or_else(|| DbError::Invalid(format!("no presentation group with key {key}")))
}

/// Reads the data presentations and their rounding rules for one group.
fn read_presentations(
    conn: &Connection,
    ctx: &StoreContext,
    key: DbKey,
) -> Result<Vec<DataPresentation>, DbError> {
    let version = ctx.version.version;
    let decimals_col = if version >= VERSION_6 { ", maxDecimals" } else { ", NULL" };
    let range_cols = if version >= VERSION_10 {
        ", minValue, maxValue"
    } else {
        ", NULL, NULL"
    };
    let sql = format!(
        "SELECT id, dataType, unitAbbr{decimals_col}{range_cols} \
         FROM DataPresentation WHERE groupId = ?1 ORDER BY dataType"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![key.as_raw()], |row| {
        Ok(DataPresentation {
            id: Some(DbKey::new(row.get(0)?)),
            data_type: row.get(1)?,
            unit_abbr: row.get(2)?,
            max_decimals: row.get(3)?,
            min_value: row.get(4)?,
            max_value: row.get(5)?,
            rounding_rules: Vec::new(),
        })
    })?;
    let mut presentations = rows.collect::<Result<Vec<_>, _>>()?;
    drop(stmt);
    for presentation in &mut presentations {
        if let Some(dp_id) = presentation.id {
            let mut stmt = conn.prepare(
                "SELECT upperLimit, sigDigits FROM RoundingRule \
                 WHERE dataPresentationId = ?1 ORDER BY upperLimit",
            )?;
            let rules = stmt.query_map(params![dp_id.as_raw()], |row| {
                Ok(RoundingRule {
                    upper_limit: row.get(0)?,
                    sig_digits: row.get(1)?,
                })
            })?;
            presentation.rounding_rules = rules.collect::<Result<Vec<_>, _>>()?;
        }
    }
    Ok(presentations)
}

/// The write algorithm body, run inside the caller's transaction.
fn write_group(
    conn: &Connection,
    ctx: &StoreContext,
    group: &mut PresentationGroup,
) -> Result<DbKey, DbError> {
    if group.id.is_none()
        && let Some(found) = lookup_by_name(conn, &group.name)?
    {
        group.id = Some(found);
    }
    group.last_modify_time = Some(ctx.codec.now());
    let lmt = ctx.codec.encode(group.last_modify_time);

    let key = match group.id {
        Some(key) => {
            conn.execute(
                "UPDATE PresentationGroup SET name = ?2, inheritsFrom = ?3, \
                 lastModifyTime = ?4, isProduction = ?5 WHERE id = ?1",
                params![
                    key.as_raw(),
                    group.name,
                    group.inherits_from,
                    lmt,
                    sql_bool(group.is_production)
                ],
            )?;
            delete_children(conn, key)?;
            key
        }
        None => {
            let key = ctx.keygen.key("PresentationGroup", conn)?;
            conn.execute(
                "INSERT INTO PresentationGroup (id, name, inheritsFrom, lastModifyTime, \
                 isProduction) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    key.as_raw(),
                    group.name,
                    group.inherits_from,
                    lmt,
                    sql_bool(group.is_production)
                ],
            )?;
            group.id = Some(key);
            key
        }
    };

    let version = ctx.version.version;
    let mut sql = String::from("INSERT INTO DataPresentation (id, groupId, dataType, unitAbbr");
    let mut tail = String::from(") VALUES (?1, ?2, ?3, ?4");
    let mut next = 5;
    if version >= VERSION_6 {
        sql.push_str(", maxDecimals");
        tail.push_str(&format!(", ?{next}"));
        next += 1;
    }
    if version >= VERSION_10 {
        sql.push_str(", minValue, maxValue");
        tail.push_str(&format!(", ?{next}, ?{}", next + 1));
    }
    sql.push_str(&tail);
    sql.push(')');

    for presentation in &mut group.presentations {
        if version < VERSION_6 && presentation.max_decimals.is_some() {
            warn!(version, "presentation max decimals predate this schema, dropping");
        }
        if version < VERSION_10
            && (presentation.min_value.is_some() || presentation.max_value.is_some())
        {
            warn!(version, "presentation value range predates this schema, dropping");
        }
        let dp_id = ctx.keygen.key("DataPresentation", conn)?;
        let mut values = vec![
            Value::Integer(dp_id.as_raw()),
            Value::Integer(key.as_raw()),
            Value::Text(presentation.data_type.clone()),
            opt_text(presentation.unit_abbr.clone()),
        ];
        if version >= VERSION_6 {
            values.push(opt_i32(presentation.max_decimals));
        }
        if version >= VERSION_10 {
            values.push(presentation.min_value.map_or(Value::Null, Value::Real));
            values.push(presentation.max_value.map_or(Value::Null, Value::Real));
        }
        conn.execute(&sql, params_from_iter(values))?;
        presentation.id = Some(dp_id);
        let mut stmt = conn.prepare(
            "INSERT INTO RoundingRule (dataPresentationId, upperLimit, sigDigits) \
             VALUES (?1, ?2, ?3)",
        )?;
        for rule in &presentation.rounding_rules {
            stmt.execute(params![dp_id.as_raw(), rule.upper_limit, rule.sig_digits])?;
        }
    }
    Ok(key)
}

/// Deletes the presentations and rounding rules of one group, deepest-first.
fn delete_children(conn: &Connection, key: DbKey) -> Result<(), DbError> {
    let mut stmt = conn.prepare("SELECT id FROM DataPresentation WHERE groupId = ?1")?;
    let presentation_ids = stmt
        .query_map(params![key.as_raw()], |row| row.get::<_, i64>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    drop(stmt);
    let mut delete_rules =
        conn.prepare("DELETE FROM RoundingRule WHERE dataPresentationId = ?1")?;
    for dp_id in presentation_ids {
        delete_rules.execute(params![dp_id])?;
    }
    drop(delete_rules);
    conn.execute(
        "DELETE FROM DataPresentation WHERE groupId = ?1",
        params![key.as_raw()],
    )?;
    Ok(())
}
