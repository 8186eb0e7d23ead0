//! Master endpoints: registration, listing, profile updates.

use axum::extract::{Path, State};
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{ActorContext, ApiContext};
use crate::models::{Master, ProfileUpdate};
use crate::scheduling::{assign_color, engine, MasterColors, ScheduleError};

/// A master plus their derived calendar colors.
#[derive(Serialize)]
pub struct MasterView {
    #[serde(flatten)]
    pub master: Master,
    pub colors: MasterColors,
}

impl From<Master> for MasterView {
    fn from(master: Master) -> Self {
        let colors = assign_color(&master.id);
        Self { master, colors }
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub telegram_id: i64,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub master: MasterView,
    pub token: String,
}

/// `POST /api/masters/register` — register (or re-register) a master and
/// issue a bearer token. Unauthenticated: this is how tokens are obtained.
pub async fn register(
    State(ctx): State<ApiContext>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let mut conn = ctx.lock_db()?;
    let (master, token) = engine::register_master(&mut conn, &req.name, req.telegram_id)?;
    Ok(Json(RegisterResponse {
        master: master.into(),
        token,
    }))
}

#[derive(Serialize)]
pub struct MastersResponse {
    pub masters: Vec<MasterView>,
}

/// `GET /api/masters` — all masters with their calendar colors.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<ActorContext>,
) -> Result<Json<MastersResponse>, ApiError> {
    let conn = ctx.lock_db()?;
    let masters = engine::list_masters(&conn, Some(&auth.actor))?;
    Ok(Json(MastersResponse {
        masters: masters.into_iter().map(MasterView::from).collect(),
    }))
}

/// `GET /api/masters/:id/colors` — the calendar color triad for one
/// master. Derived, never stored; 404s for unknown masters.
pub async fn colors(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<ActorContext>,
    Path(master_id): Path<String>,
) -> Result<Json<MasterColors>, ApiError> {
    let conn = ctx.lock_db()?;
    crate::db::repository::master::get_master(&conn, &master_id)
        .map_err(ScheduleError::from)?;
    Ok(Json(assign_color(&master_id)))
}

/// `PUT /api/masters/:id` — update one's own profile.
pub async fn update_profile(
    State(ctx): State<ApiContext>,
    Extension(auth): Extension<ActorContext>,
    Path(master_id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<MasterView>, ApiError> {
    let mut conn = ctx.lock_db()?;
    let master = engine::update_profile(&mut conn, Some(&auth.actor), &master_id, &update)?;
    Ok(Json(master.into()))
}
