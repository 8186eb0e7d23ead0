//! Appointment rows: the sole writer of appointment records.
//!
//! Plain data access keyed by (master, appointment id) and by date. Slot
//! rules, lifecycle rules, and authorization live in the scheduling engine;
//! this module only reads and writes rows.

use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Appointment, AppointmentStatus, Payment, RangeStats};

const APPOINTMENT_COLUMNS: &str =
    "id, master_id, date, time, duration, client_name, comment, status, cash_payment, card_payment";

fn row_to_appointment(row: &Row) -> rusqlite::Result<Appointment> {
    let status_str: String = row.get(7)?;
    let status = AppointmentStatus::from_str(&status_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
    })?;

    // Payment columns are only meaningful on completed rows.
    let payment = if status == AppointmentStatus::Completed {
        Some(Payment {
            cash: row.get::<_, Option<i64>>(8)?.unwrap_or(0),
            card: row.get::<_, Option<i64>>(9)?.unwrap_or(0),
        })
    } else {
        None
    };

    Ok(Appointment {
        id: row.get(0)?,
        master_id: row.get(1)?,
        date: row.get(2)?,
        time: row.get(3)?,
        duration: row.get(4)?,
        client_name: row.get(5)?,
        comment: row.get(6)?,
        status,
        payment,
    })
}

/// Inserts a new scheduled appointment and returns it.
pub fn insert_appointment(
    conn: &Connection,
    master_id: &str,
    date: &str,
    time: &str,
    duration: u32,
    client_name: &str,
    comment: Option<&str>,
) -> Result<Appointment, DatabaseError> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO appointments (id, master_id, date, time, duration, client_name, comment, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'scheduled')",
        params![id, master_id, date, time, duration, client_name, comment],
    )?;
    get_appointment(conn, master_id, &id)
}

/// Fetches one appointment belonging to the given master.
pub fn get_appointment(
    conn: &Connection,
    master_id: &str,
    id: &str,
) -> Result<Appointment, DatabaseError> {
    conn.query_row(
        &format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments
             WHERE id = ?1 AND master_id = ?2"
        ),
        params![id, master_id],
        row_to_appointment,
    )
    .optional()?
    .ok_or_else(|| DatabaseError::NotFound {
        entity_type: "Appointment".into(),
        id: id.into(),
    })
}

/// Lists a master's appointments, optionally filtered to one date.
/// Ordered by date, then start time ascending.
pub fn list_for_master(
    conn: &Connection,
    master_id: &str,
    date: Option<&str>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE master_id = ?1 AND (?2 IS NULL OR date = ?2)
         ORDER BY date ASC, time ASC"
    ))?;
    let rows = stmt.query_map(params![master_id, date], row_to_appointment)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Lists appointments with `start_date <= date <= end_date`, optionally for
/// one master. Date comparison is lexicographic, which is correct for
/// YYYY-MM-DD strings.
pub fn list_between(
    conn: &Connection,
    start_date: &str,
    end_date: &str,
    master_id: Option<&str>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE date >= ?1 AND date <= ?2 AND (?3 IS NULL OR master_id = ?3)
         ORDER BY date ASC, time ASC"
    ))?;
    let rows = stmt.query_map(params![start_date, end_date, master_id], row_to_appointment)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

/// Finds the active appointment occupying an exact (master, date, time) slot,
/// if any. `exclude_id` skips the appointment being moved.
pub fn find_active_at(
    conn: &Connection,
    master_id: &str,
    date: &str,
    time: &str,
    exclude_id: Option<&str>,
) -> Result<Option<String>, DatabaseError> {
    conn.query_row(
        "SELECT id FROM appointments
         WHERE master_id = ?1 AND date = ?2 AND time = ?3
           AND status != 'cancelled'
           AND (?4 IS NULL OR id != ?4)
         LIMIT 1",
        params![master_id, date, time, exclude_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(DatabaseError::from)
}

/// Writes back every mutable column of an appointment.
pub fn update_appointment(
    conn: &Connection,
    appointment: &Appointment,
) -> Result<(), DatabaseError> {
    let (cash, card) = match appointment.payment {
        Some(p) => (Some(p.cash), Some(p.card)),
        None => (None, None),
    };
    let changed = conn.execute(
        "UPDATE appointments SET
            time = ?1, duration = ?2, client_name = ?3, comment = ?4,
            status = ?5, cash_payment = ?6, card_payment = ?7,
            updated_at = datetime('now')
         WHERE id = ?8 AND master_id = ?9",
        params![
            appointment.time,
            appointment.duration,
            appointment.client_name,
            appointment.comment,
            appointment.status.as_str(),
            cash,
            card,
            appointment.id,
            appointment.master_id,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: appointment.id.clone(),
        });
    }
    Ok(())
}

/// Removes an appointment unconditionally.
pub fn delete_appointment(
    conn: &Connection,
    master_id: &str,
    id: &str,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM appointments WHERE id = ?1 AND master_id = ?2",
        params![id, master_id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.into(),
        });
    }
    Ok(())
}

/// Aggregates counts and revenue over an optional date range and master.
/// Passing no bounds aggregates the whole store.
pub fn stats(
    conn: &Connection,
    start_date: Option<&str>,
    end_date: Option<&str>,
    master_id: Option<&str>,
) -> Result<RangeStats, DatabaseError> {
    conn.query_row(
        "SELECT
            COUNT(*),
            COUNT(*) FILTER (WHERE status = 'completed'),
            COALESCE(SUM(CASE WHEN status = 'completed'
                THEN COALESCE(cash_payment, 0) + COALESCE(card_payment, 0)
                ELSE 0 END), 0)
         FROM appointments
         WHERE (?1 IS NULL OR date >= ?1)
           AND (?2 IS NULL OR date <= ?2)
           AND (?3 IS NULL OR master_id = ?3)",
        params![start_date, end_date, master_id],
        |row| {
            Ok(RangeStats {
                total_appointments: row.get::<_, i64>(0)? as u64,
                completed_appointments: row.get::<_, i64>(1)? as u64,
                total_revenue: row.get(2)?,
            })
        },
    )
    .map_err(DatabaseError::from)
}
