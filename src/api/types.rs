//! Shared types for the API layer.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::scheduling::Actor;

/// Shared context for all API routes and middleware.
///
/// The connection sits behind a mutex so each request's check-then-write
/// sequence runs against the store without interleaving.
#[derive(Clone)]
pub struct ApiContext {
    db: Arc<Mutex<Connection>>,
}

impl ApiContext {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Locks the store for the duration of one operation. Guards must not
    /// be held across an await point.
    pub fn lock_db(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".into()))
    }
}

/// Authenticated actor context, injected into request extensions by the
/// auth middleware after successful token validation.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub actor: Actor,
}
