//! Access guard: who may mutate what.
//!
//! The guard is the authority on mutation rights. Edges may additionally
//! hide actions in their UIs, but omission at the edge is not a substitute
//! for the checks here.

use crate::models::Role;

use super::ScheduleError;

/// The authenticated identity on whose behalf an operation is attempted.
/// The engine never authenticates; it only authorizes against what the
/// session layer resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub master_id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(master_id: impl Into<String>, role: Role) -> Self {
        Self {
            master_id: master_id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Rejects missing actors. Every engine operation starts here.
pub fn ensure_authenticated(actor: Option<&Actor>) -> Result<&Actor, ScheduleError> {
    actor.ok_or(ScheduleError::Unauthorized)
}

/// A member may touch only their own schedule; an admin may touch any.
/// An authenticated actor without rights gets `Forbidden`, not
/// `Unauthorized`.
pub fn ensure_owner_or_admin(
    actor: Option<&Actor>,
    owner_master_id: &str,
) -> Result<(), ScheduleError> {
    let actor = ensure_authenticated(actor)?;
    if actor.is_admin() || actor.master_id == owner_master_id {
        Ok(())
    } else {
        Err(ScheduleError::Forbidden)
    }
}

/// Owner only — used for profile mutations, which not even admins may do
/// on someone else's behalf.
pub fn ensure_owner(actor: Option<&Actor>, owner_master_id: &str) -> Result<(), ScheduleError> {
    let actor = ensure_authenticated(actor)?;
    if actor.master_id == owner_master_id {
        Ok(())
    } else {
        Err(ScheduleError::Forbidden)
    }
}
