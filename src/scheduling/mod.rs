//! Appointment scheduling and lifecycle engine.
//!
//! The rules that decide whether a booking may be created or moved, how an
//! appointment's status evolves, how appointments are grouped and summarized
//! across date ranges, and how mutation rights are gated by role. Callers
//! resolve the actor, then go through [`engine`]; everything else in the
//! crate is a thin consumer of this module's contract.

pub mod access;
pub mod colors;
pub mod conflict;
pub mod engine;
pub mod lifecycle;
pub mod range;

pub use access::{Actor, ensure_authenticated, ensure_owner, ensure_owner_or_admin};
pub use colors::{assign_color, MasterColors};
pub use engine::*;
pub use range::{overall_stats, range_query, range_stats};

use thiserror::Error;

use crate::db::DatabaseError;
use crate::models::AppointmentStatus;

/// Failures the engine surfaces to its callers. All are synchronous and
/// none are retried internally; a failed mutation leaves the store unchanged.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Slot {time} on {date} is taken by appointment {occupied_by}")]
    SlotConflict {
        date: String,
        time: String,
        occupied_by: String,
    },

    #[error("Cannot {action} an appointment that is {status}")]
    InvalidTransition {
        action: &'static str,
        status: AppointmentStatus,
    },

    #[error("{entity_type} {id} not found")]
    NotFound { entity_type: String, id: String },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Actor is not permitted to perform this operation")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(DatabaseError),
}

impl From<DatabaseError> for ScheduleError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            other => Self::Database(other),
        }
    }
}

impl From<rusqlite::Error> for ScheduleError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(DatabaseError::Sqlite(err))
    }
}
