//! Appointment endpoints: booking, editing, lifecycle, day and range views.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ActorContext, ApiContext};
use crate::models::{Appointment, AppointmentPatch, NewAppointment, Payment};
use crate::scheduling::{engine, range_query};

#[derive(Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

/// `GET /api/masters/:id/appointments` — one master's schedule,
/// optionally limited to `?date=YYYY-MM-DD`.
pub async fn list_for_master(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<ActorContext>,
    Path(master_id): Path<String>,
    Query(query): Query<DateQuery>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let conn = ctx.lock_db()?;
    let appointments = engine::list_appointments(
        &conn,
        Some(&auth.actor),
        &master_id,
        query.date.as_deref(),
    )?;
    Ok(Json(AppointmentsResponse { appointments }))
}

#[derive(Deserialize)]
pub struct DayQuery {
    pub date: String,
}

/// `GET /api/appointments` — all bookings on one date, keyed by master.
pub async fn day(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<ActorContext>,
    Query(query): Query<DayQuery>,
) -> Result<Json<BTreeMap<String, Vec<Appointment>>>, ApiError> {
    let conn = ctx.lock_db()?;
    let grouped = engine::day_schedule(&conn, Some(&auth.actor), &query.date)?;
    Ok(Json(grouped))
}

#[derive(Deserialize)]
pub struct RangeQuery {
    pub start_date: String,
    pub end_date: String,
    pub master_id: Option<String>,
}

/// `GET /api/appointments/range` — bookings bucketed by day across an
/// inclusive range. Every day in the range is a key, empty days included.
pub async fn range(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<ActorContext>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<BTreeMap<String, Vec<Appointment>>>, ApiError> {
    let conn = ctx.lock_db()?;
    let days = range_query(
        &conn,
        &query.start_date,
        &query.end_date,
        query.master_id.as_deref(),
    )?;
    Ok(Json(days))
}

/// `POST /api/appointments/:master_id` — book a slot.
pub async fn create(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<ActorContext>,
    Path(master_id): Path<String>,
    Json(request): Json<NewAppointment>,
) -> Result<(StatusCode, Json<Appointment>), ApiError> {
    let mut conn = ctx.lock_db()?;
    let created = engine::create_appointment(&mut conn, Some(&auth.actor), &master_id, &request)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /api/appointments/:master_id/:appointment_id` — edit a scheduled
/// appointment (time, duration, client name, comment).
pub async fn update(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<ActorContext>,
    Path((master_id, appointment_id)): Path<(String, String)>,
    Json(patch): Json<AppointmentPatch>,
) -> Result<Json<Appointment>, ApiError> {
    let mut conn = ctx.lock_db()?;
    let updated = engine::update_appointment(
        &mut conn,
        Some(&auth.actor),
        &master_id,
        &appointment_id,
        &patch,
    )?;
    Ok(Json(updated))
}

#[derive(Deserialize, Default)]
pub struct CompleteRequest {
    #[serde(default)]
    pub cash_payment: i64,
    #[serde(default)]
    pub card_payment: i64,
}

/// `POST /api/appointments/:master_id/:appointment_id/complete` — finish
/// an appointment and record how it was paid.
pub async fn complete(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<ActorContext>,
    Path((master_id, appointment_id)): Path<(String, String)>,
    Json(request): Json<CompleteRequest>,
) -> Result<Json<Appointment>, ApiError> {
    let mut conn = ctx.lock_db()?;
    let completed = engine::complete_appointment(
        &mut conn,
        Some(&auth.actor),
        &master_id,
        &appointment_id,
        Payment {
            cash: request.cash_payment,
            card: request.card_payment,
        },
    )?;
    Ok(Json(completed))
}

/// `POST /api/appointments/:master_id/:appointment_id/cancel` — cancel a
/// scheduled appointment, freeing its slot.
pub async fn cancel(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<ActorContext>,
    Path((master_id, appointment_id)): Path<(String, String)>,
) -> Result<Json<Appointment>, ApiError> {
    let mut conn = ctx.lock_db()?;
    let cancelled =
        engine::cancel_appointment(&mut conn, Some(&auth.actor), &master_id, &appointment_id)?;
    Ok(Json(cancelled))
}

/// `DELETE /api/appointments/:master_id/:appointment_id` — remove a
/// record entirely, whatever its status.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<ActorContext>,
    Path((master_id, appointment_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let mut conn = ctx.lock_db()?;
    engine::delete_appointment(&mut conn, Some(&auth.actor), &master_id, &appointment_id)?;
    Ok(StatusCode::NO_CONTENT)
}
