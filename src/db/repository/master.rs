//! Master records and the bearer tokens that identify them.
//!
//! Plain data access; ownership and role rules are enforced by the
//! scheduling engine, not here.

use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Master, ProfileUpdate, Role};

fn row_to_master(row: &Row) -> rusqlite::Result<Master> {
    let role_str: String = row.get(2)?;
    let role = Role::from_str(&role_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Master {
        id: row.get(0)?,
        name: row.get(1)?,
        role,
        avatar: row.get(3)?,
    })
}

/// Creates a master and returns the record.
pub fn create_master(
    conn: &Connection,
    name: &str,
    role: Role,
    telegram_id: Option<i64>,
) -> Result<Master, DatabaseError> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO masters (id, name, role, telegram_id)
         VALUES (?1, ?2, ?3, ?4)",
        params![id, name, role.as_str(), telegram_id],
    )?;
    get_master(conn, &id)
}

pub fn get_master(conn: &Connection, id: &str) -> Result<Master, DatabaseError> {
    conn.query_row(
        "SELECT id, name, role, avatar FROM masters WHERE id = ?1",
        params![id],
        row_to_master,
    )
    .optional()?
    .ok_or_else(|| DatabaseError::NotFound {
        entity_type: "Master".into(),
        id: id.into(),
    })
}

/// Lists all masters ordered by name.
pub fn list_masters(conn: &Connection) -> Result<Vec<Master>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT id, name, role, avatar FROM masters ORDER BY name ASC")?;
    let rows = stmt.query_map([], row_to_master)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn find_by_telegram_id(
    conn: &Connection,
    telegram_id: i64,
) -> Result<Option<Master>, DatabaseError> {
    conn.query_row(
        "SELECT id, name, role, avatar FROM masters WHERE telegram_id = ?1",
        params![telegram_id],
        row_to_master,
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Applies an owner profile update (name/avatar) and returns the record.
pub fn update_profile(
    conn: &Connection,
    id: &str,
    update: &ProfileUpdate,
) -> Result<Master, DatabaseError> {
    let changed = conn.execute(
        "UPDATE masters SET
            name = COALESCE(?1, name),
            avatar = COALESCE(?2, avatar)
         WHERE id = ?3",
        params![update.name, update.avatar, id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Master".into(),
            id: id.into(),
        });
    }
    get_master(conn, id)
}

// ─── Auth tokens ──────────────────────────────────────────────────────────────

/// Stores an opaque bearer token for a master.
pub fn insert_token(conn: &Connection, token: &str, master_id: &str) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO auth_tokens (token, master_id) VALUES (?1, ?2)",
        params![token, master_id],
    )?;
    Ok(())
}

/// Resolves a bearer token to its master, if the token is known.
pub fn find_master_by_token(
    conn: &Connection,
    token: &str,
) -> Result<Option<Master>, DatabaseError> {
    conn.query_row(
        "SELECT m.id, m.name, m.role, m.avatar
         FROM auth_tokens t
         JOIN masters m ON m.id = t.master_id
         WHERE t.token = ?1",
        params![token],
        row_to_master,
    )
    .optional()
    .map_err(DatabaseError::from)
}
