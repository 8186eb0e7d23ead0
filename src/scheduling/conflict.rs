//! Slot conflict resolution.
//!
//! A slot is occupied when an active (scheduled or completed) appointment
//! for the same master starts at exactly the same date and time. Cancelled
//! appointments release their slot. Duration is bookkeeping only: a 90
//! minute booking at 10:00 does not block a booking at 10:30. Overlap
//! detection by interval is intentionally out of scope.

use rusqlite::Connection;

use crate::db::repository::appointment;

use super::ScheduleError;

/// Verifies the exact (master, date, time) slot is free among active
/// appointments. `exclude_id` is the appointment being moved, so a no-op
/// reschedule onto its own slot passes.
pub fn ensure_slot_free(
    conn: &Connection,
    master_id: &str,
    date: &str,
    time: &str,
    exclude_id: Option<&str>,
) -> Result<(), ScheduleError> {
    match appointment::find_active_at(conn, master_id, date, time, exclude_id)? {
        Some(occupied_by) => Err(ScheduleError::SlotConflict {
            date: date.to_string(),
            time: time.to_string(),
            occupied_by,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::appointment::{insert_appointment, update_appointment};
    use crate::db::repository::master::create_master;
    use crate::models::{AppointmentStatus, Role};

    fn setup() -> (Connection, String) {
        let conn = open_memory_database().unwrap();
        let master = create_master(&conn, "Olga", Role::Member, None).unwrap();
        (conn, master.id)
    }

    #[test]
    fn exact_start_time_conflicts() {
        let (conn, m) = setup();
        let apt = insert_appointment(&conn, &m, "2024-06-01", "10:00", 60, "Anna", None).unwrap();

        let err = ensure_slot_free(&conn, &m, "2024-06-01", "10:00", None).unwrap_err();
        match err {
            ScheduleError::SlotConflict { occupied_by, .. } => assert_eq!(occupied_by, apt.id),
            other => panic!("expected slot conflict, got {other:?}"),
        }
    }

    #[test]
    fn overlapping_interval_does_not_conflict() {
        let (conn, m) = setup();
        insert_appointment(&conn, &m, "2024-06-01", "10:00", 90, "Anna", None).unwrap();

        // 10:30 falls inside the 90-minute booking but starts at a
        // different minute, so it is allowed.
        assert!(ensure_slot_free(&conn, &m, "2024-06-01", "10:30", None).is_ok());
    }

    #[test]
    fn cancelled_appointment_releases_slot() {
        let (conn, m) = setup();
        let mut apt =
            insert_appointment(&conn, &m, "2024-06-01", "10:00", 60, "Anna", None).unwrap();
        apt.status = AppointmentStatus::Cancelled;
        update_appointment(&conn, &apt).unwrap();

        assert!(ensure_slot_free(&conn, &m, "2024-06-01", "10:00", None).is_ok());
    }

    #[test]
    fn slot_is_per_master() {
        let (conn, m) = setup();
        let other = create_master(&conn, "Vera", Role::Member, None).unwrap();
        insert_appointment(&conn, &m, "2024-06-01", "10:00", 60, "Anna", None).unwrap();

        assert!(ensure_slot_free(&conn, &other.id, "2024-06-01", "10:00", None).is_ok());
    }

    #[test]
    fn moving_onto_own_slot_is_allowed() {
        let (conn, m) = setup();
        let apt = insert_appointment(&conn, &m, "2024-06-01", "10:00", 60, "Anna", None).unwrap();

        assert!(ensure_slot_free(&conn, &m, "2024-06-01", "10:00", Some(&apt.id)).is_ok());
    }
}
