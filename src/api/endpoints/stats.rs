//! Statistics endpoints.

use axum::extract::{Query, State};
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ActorContext, ApiContext};
use crate::models::RangeStats;
use crate::scheduling::{overall_stats, range_stats};

#[derive(Deserialize)]
pub struct DayStatsQuery {
    pub date: Option<String>,
    pub master_id: Option<String>,
}

/// `GET /api/stats` — counts and revenue for one date, or for the whole
/// store when no date is given.
pub async fn day(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<ActorContext>,
    Query(query): Query<DayStatsQuery>,
) -> Result<Json<RangeStats>, ApiError> {
    let conn = ctx.lock_db()?;
    let stats = match query.date.as_deref() {
        Some(date) => range_stats(&conn, date, date, query.master_id.as_deref())?,
        None => overall_stats(&conn, query.master_id.as_deref())?,
    };
    Ok(Json(stats))
}

#[derive(Deserialize)]
pub struct RangeStatsQuery {
    pub start_date: String,
    pub end_date: String,
    pub master_id: Option<String>,
}

/// `GET /api/stats/range` — counts and revenue over an inclusive range.
pub async fn range(
    State(ctx): State<ApiContext>,
    Extension(_auth): Extension<ActorContext>,
    Query(query): Query<RangeStatsQuery>,
) -> Result<Json<RangeStats>, ApiError> {
    let conn = ctx.lock_db()?;
    let stats = range_stats(
        &conn,
        &query.start_date,
        &query.end_date,
        query.master_id.as_deref(),
    )?;
    Ok(Json(stats))
}
