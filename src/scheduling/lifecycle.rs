//! Appointment lifecycle: scheduled → completed | cancelled.
//!
//! Both terminal states are final. Completion is the only way a payment
//! attaches to an appointment; cancellation never carries one. Edits apply
//! to scheduled appointments only. These are pure transitions over an
//! in-memory record; the engine persists the result.

use crate::models::{Appointment, AppointmentPatch, AppointmentStatus, Payment};

use super::ScheduleError;

/// Marks a scheduled appointment completed and attaches its payment.
/// Payment components must be non-negative; zero totals are legal
/// (no-shows that still count as done).
pub fn complete(appointment: &mut Appointment, payment: Payment) -> Result<(), ScheduleError> {
    if appointment.status != AppointmentStatus::Scheduled {
        return Err(ScheduleError::InvalidTransition {
            action: "complete",
            status: appointment.status,
        });
    }
    if payment.cash < 0 || payment.card < 0 {
        return Err(ScheduleError::Validation(
            "payment amounts must be non-negative".into(),
        ));
    }
    appointment.status = AppointmentStatus::Completed;
    appointment.payment = Some(payment);
    Ok(())
}

/// Marks a scheduled appointment cancelled, releasing its slot.
pub fn cancel(appointment: &mut Appointment) -> Result<(), ScheduleError> {
    if appointment.status != AppointmentStatus::Scheduled {
        return Err(ScheduleError::InvalidTransition {
            action: "cancel",
            status: appointment.status,
        });
    }
    appointment.status = AppointmentStatus::Cancelled;
    appointment.payment = None;
    Ok(())
}

/// Applies an edit to a scheduled appointment. Terminal records are
/// immutable; their only remaining operation is deletion.
pub fn apply_patch(
    appointment: &mut Appointment,
    patch: &AppointmentPatch,
) -> Result<(), ScheduleError> {
    if appointment.status.is_terminal() {
        return Err(ScheduleError::InvalidTransition {
            action: "edit",
            status: appointment.status,
        });
    }
    if let Some(duration) = patch.duration {
        if duration == 0 {
            return Err(ScheduleError::Validation(
                "duration must be positive".into(),
            ));
        }
        appointment.duration = duration;
    }
    if let Some(ref name) = patch.client_name {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ScheduleError::Validation(
                "client name must not be empty".into(),
            ));
        }
        appointment.client_name = trimmed.to_string();
    }
    if let Some(ref time) = patch.time {
        appointment.time = time.clone();
    }
    if let Some(ref comment) = patch.comment {
        appointment.comment = Some(comment.clone());
    }
    Ok(())
}
