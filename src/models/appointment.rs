use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

/// A booked slot on one master's schedule.
///
/// `payment` is present if and only if `status` is completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub master_id: String,
    pub date: String, // YYYY-MM-DD
    pub time: String, // HH:MM
    pub duration: u32,
    pub client_name: String,
    pub comment: Option<String>,
    pub status: AppointmentStatus,
    pub payment: Option<Payment>,
}

/// How a completed appointment was paid. Amounts are non-negative minor
/// currency units; the total is always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub cash: i64,
    pub card: i64,
}

impl Payment {
    pub fn total(&self) -> i64 {
        self.cash + self.card
    }
}

/// Request to create an appointment.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAppointment {
    pub date: String,
    pub time: String,
    #[serde(default = "default_duration")]
    pub duration: u32,
    pub client_name: String,
    pub comment: Option<String>,
}

fn default_duration() -> u32 {
    60
}

/// Structured partial update for a scheduled appointment.
///
/// Only these four fields are editable; status changes go through the
/// explicit complete/cancel operations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppointmentPatch {
    pub time: Option<String>,
    pub duration: Option<u32>,
    pub client_name: Option<String>,
    pub comment: Option<String>,
}

impl AppointmentPatch {
    /// Whether the patch moves the appointment to a different placement.
    pub fn touches_slot(&self) -> bool {
        self.time.is_some() || self.duration.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_none()
            && self.duration.is_none()
            && self.client_name.is_none()
            && self.comment.is_none()
    }
}
