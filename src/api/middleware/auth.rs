//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, resolves it against the
//! token store, and injects `ActorContext` into request extensions for
//! downstream handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::{ActorContext, ApiContext};
use crate::db::repository::master;
use crate::scheduling::Actor;

/// Require a valid bearer token from a registered master.
///
/// Accesses `ApiContext` from request extensions (injected by the
/// Extension layer). On success, injects `ActorContext`.
pub async fn require_auth(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_auth_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    // Resolve before next.run so the guard is dropped ahead of any .await
    let actor = {
        let conn = ctx.lock_db()?;
        let master = master::find_master_by_token(&conn, &token)?
            .ok_or(ApiError::Unauthorized)?;
        Actor::new(master.id, master.role)
    };

    req.extensions_mut().insert(ActorContext { actor });

    Ok(next.run(req).await)
}
