//! The engine facade: every appointment and profile operation goes through
//! here. Each function authorizes the actor, validates input, applies the
//! slot and lifecycle rules, and persists the outcome. Mutations run inside
//! a transaction so the conflict check and the write are one atomic step.

use std::collections::BTreeMap;

use base64::Engine as _;
use chrono::NaiveTime;
use rand::RngCore;
use rusqlite::Connection;
use tracing::info;

use crate::db::repository::{appointment, master};
use crate::models::{
    Appointment, AppointmentPatch, Master, NewAppointment, Payment, ProfileUpdate, Role,
};

use super::access::{ensure_authenticated, ensure_owner, ensure_owner_or_admin, Actor};
use super::conflict::ensure_slot_free;
use super::range::parse_date;
use super::{lifecycle, ScheduleError};

const TIME_FORMAT: &str = "%H:%M";

fn validate_time(value: &str) -> Result<(), ScheduleError> {
    NaiveTime::parse_from_str(value, TIME_FORMAT)
        .map(|_| ())
        .map_err(|_| ScheduleError::Validation(format!("invalid time '{value}', expected HH:MM")))
}

fn validate_client_name(name: &str) -> Result<&str, ScheduleError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ScheduleError::Validation(
            "client name must not be empty".into(),
        ));
    }
    Ok(trimmed)
}

// ─── Appointments ─────────────────────────────────────────────────────────────

/// Books a new appointment on a master's schedule.
pub fn create_appointment(
    conn: &mut Connection,
    actor: Option<&Actor>,
    master_id: &str,
    request: &NewAppointment,
) -> Result<Appointment, ScheduleError> {
    ensure_owner_or_admin(actor, master_id)?;
    parse_date(&request.date)?;
    validate_time(&request.time)?;
    if request.duration == 0 {
        return Err(ScheduleError::Validation("duration must be positive".into()));
    }
    let client_name = validate_client_name(&request.client_name)?;

    let tx = conn.transaction()?;
    master::get_master(&tx, master_id)?;
    ensure_slot_free(&tx, master_id, &request.date, &request.time, None)?;
    let created = appointment::insert_appointment(
        &tx,
        master_id,
        &request.date,
        &request.time,
        request.duration,
        client_name,
        request.comment.as_deref(),
    )?;
    tx.commit()?;

    info!(
        appointment_id = %created.id,
        master_id = %master_id,
        date = %created.date,
        time = %created.time,
        "appointment created"
    );
    Ok(created)
}

/// Edits a scheduled appointment. Moving it re-runs the slot check with the
/// appointment itself excluded, so an unchanged time is not a self-conflict.
pub fn update_appointment(
    conn: &mut Connection,
    actor: Option<&Actor>,
    master_id: &str,
    appointment_id: &str,
    patch: &AppointmentPatch,
) -> Result<Appointment, ScheduleError> {
    ensure_owner_or_admin(actor, master_id)?;
    if let Some(ref time) = patch.time {
        validate_time(time)?;
    }

    let tx = conn.transaction()?;
    let mut apt = appointment::get_appointment(&tx, master_id, appointment_id)?;
    lifecycle::apply_patch(&mut apt, patch)?;
    if patch.touches_slot() {
        ensure_slot_free(&tx, master_id, &apt.date, &apt.time, Some(appointment_id))?;
    }
    appointment::update_appointment(&tx, &apt)?;
    tx.commit()?;
    Ok(apt)
}

/// Completes a scheduled appointment, recording how it was paid.
pub fn complete_appointment(
    conn: &mut Connection,
    actor: Option<&Actor>,
    master_id: &str,
    appointment_id: &str,
    payment: Payment,
) -> Result<Appointment, ScheduleError> {
    ensure_owner_or_admin(actor, master_id)?;

    let tx = conn.transaction()?;
    let mut apt = appointment::get_appointment(&tx, master_id, appointment_id)?;
    lifecycle::complete(&mut apt, payment)?;
    appointment::update_appointment(&tx, &apt)?;
    tx.commit()?;

    info!(
        appointment_id = %appointment_id,
        total = payment.total(),
        "appointment completed"
    );
    Ok(apt)
}

/// Cancels a scheduled appointment, releasing its slot.
pub fn cancel_appointment(
    conn: &mut Connection,
    actor: Option<&Actor>,
    master_id: &str,
    appointment_id: &str,
) -> Result<Appointment, ScheduleError> {
    ensure_owner_or_admin(actor, master_id)?;

    let tx = conn.transaction()?;
    let mut apt = appointment::get_appointment(&tx, master_id, appointment_id)?;
    lifecycle::cancel(&mut apt)?;
    appointment::update_appointment(&tx, &apt)?;
    tx.commit()?;

    info!(appointment_id = %appointment_id, "appointment cancelled");
    Ok(apt)
}

/// Removes an appointment from the store entirely, in any status. This is
/// the only mutation allowed on a terminal record.
pub fn delete_appointment(
    conn: &mut Connection,
    actor: Option<&Actor>,
    master_id: &str,
    appointment_id: &str,
) -> Result<(), ScheduleError> {
    ensure_owner_or_admin(actor, master_id)?;

    let tx = conn.transaction()?;
    appointment::delete_appointment(&tx, master_id, appointment_id)?;
    tx.commit()?;

    info!(appointment_id = %appointment_id, "appointment deleted");
    Ok(())
}

/// One master's appointments, optionally limited to a single date.
/// Reads are gated by authentication only; any master may view any schedule.
pub fn list_appointments(
    conn: &Connection,
    actor: Option<&Actor>,
    master_id: &str,
    date: Option<&str>,
) -> Result<Vec<Appointment>, ScheduleError> {
    ensure_authenticated(actor)?;
    if let Some(date) = date {
        parse_date(date)?;
    }
    master::get_master(conn, master_id)?;
    appointment::list_for_master(conn, master_id, date).map_err(ScheduleError::from)
}

/// All appointments on one date, grouped by master. Every master is a
/// key, with an empty list on days they have no bookings; day-grid UIs
/// rely on key presence to render idle columns.
pub fn day_schedule(
    conn: &Connection,
    actor: Option<&Actor>,
    date: &str,
) -> Result<BTreeMap<String, Vec<Appointment>>, ScheduleError> {
    ensure_authenticated(actor)?;
    parse_date(date)?;

    let mut by_master: BTreeMap<String, Vec<Appointment>> = master::list_masters(conn)?
        .into_iter()
        .map(|m| (m.id, Vec::new()))
        .collect();
    for apt in appointment::list_between(conn, date, date, None)? {
        by_master.entry(apt.master_id.clone()).or_default().push(apt);
    }
    Ok(by_master)
}

// ─── Masters ──────────────────────────────────────────────────────────────────

/// Registers a master keyed by their Telegram account and issues a fresh
/// bearer token. Re-registering the same account returns the existing
/// record with a new token instead of creating a duplicate.
pub fn register_master(
    conn: &mut Connection,
    name: &str,
    telegram_id: i64,
) -> Result<(Master, String), ScheduleError> {
    let trimmed = validate_client_name(name)
        .map_err(|_| ScheduleError::Validation("master name must not be empty".into()))?;

    let tx = conn.transaction()?;
    let record = match master::find_by_telegram_id(&tx, telegram_id)? {
        Some(existing) => existing,
        None => master::create_master(&tx, trimmed, Role::Member, Some(telegram_id))?,
    };
    let token = generate_token();
    master::insert_token(&tx, &token, &record.id)?;
    tx.commit()?;

    info!(master_id = %record.id, "master registered");
    Ok((record, token))
}

/// Updates a master's own profile. Admins cannot edit other profiles.
pub fn update_profile(
    conn: &mut Connection,
    actor: Option<&Actor>,
    master_id: &str,
    update: &ProfileUpdate,
) -> Result<Master, ScheduleError> {
    ensure_owner(actor, master_id)?;
    if let Some(ref name) = update.name {
        if name.trim().is_empty() {
            return Err(ScheduleError::Validation("master name must not be empty".into()));
        }
    }

    let tx = conn.transaction()?;
    let updated = master::update_profile(&tx, master_id, update)?;
    tx.commit()?;
    Ok(updated)
}

pub fn list_masters(
    conn: &Connection,
    actor: Option<&Actor>,
) -> Result<Vec<Master>, ScheduleError> {
    ensure_authenticated(actor)?;
    master::list_masters(conn).map_err(ScheduleError::from)
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
