//! Calendar range aggregation.
//!
//! Groups appointments by day across an inclusive date range and computes
//! count/revenue summaries. The day view always materializes every date in
//! the range, empty days included, so calendar UIs never have to fill gaps.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::repository::appointment;
use crate::models::{Appointment, RangeStats};

use super::ScheduleError;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| ScheduleError::Validation(format!("invalid date '{value}', expected YYYY-MM-DD")))
}

fn validate_range(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate), ScheduleError> {
    let start_day = parse_date(start)?;
    let end_day = parse_date(end)?;
    if start_day > end_day {
        return Err(ScheduleError::Validation(format!(
            "range start {start} is after end {end}"
        )));
    }
    Ok((start_day, end_day))
}

/// Appointments bucketed by date over `[start, end]`, ordered by date and
/// then start time within each day. Every date in the range is a key,
/// even when the day is empty. Optionally scoped to one master.
pub fn range_query(
    conn: &Connection,
    start: &str,
    end: &str,
    master_id: Option<&str>,
) -> Result<BTreeMap<String, Vec<Appointment>>, ScheduleError> {
    let (start_day, end_day) = validate_range(start, end)?;

    let mut days: BTreeMap<String, Vec<Appointment>> = BTreeMap::new();
    let mut day = start_day;
    while day <= end_day {
        days.insert(day.format(DATE_FORMAT).to_string(), Vec::new());
        day = day.succ_opt().ok_or_else(|| {
            ScheduleError::Validation(format!("range end {end} is out of calendar bounds"))
        })?;
    }

    for apt in appointment::list_between(conn, start, end, master_id)? {
        days.entry(apt.date.clone()).or_default().push(apt);
    }
    Ok(days)
}

/// Count and revenue summary over `[start, end]`, optionally scoped to one
/// master. Counts include cancelled rows; revenue comes from completed
/// payments only.
pub fn range_stats(
    conn: &Connection,
    start: &str,
    end: &str,
    master_id: Option<&str>,
) -> Result<RangeStats, ScheduleError> {
    validate_range(start, end)?;
    appointment::stats(conn, Some(start), Some(end), master_id).map_err(ScheduleError::from)
}

/// Count and revenue summary over the whole store, optionally scoped to
/// one master.
pub fn overall_stats(
    conn: &Connection,
    master_id: Option<&str>,
) -> Result<RangeStats, ScheduleError> {
    appointment::stats(conn, None, None, master_id).map_err(ScheduleError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::db::repository::appointment::{insert_appointment, update_appointment};
    use crate::db::repository::master::create_master;
    use crate::models::{AppointmentStatus, Payment, Role};

    fn setup() -> (Connection, String) {
        let conn = open_memory_database().unwrap();
        let master = create_master(&conn, "Olga", Role::Member, None).unwrap();
        (conn, master.id)
    }

    #[test]
    fn every_date_in_range_is_present() {
        let (conn, m) = setup();
        insert_appointment(&conn, &m, "2024-06-01", "10:00", 60, "Anna", None).unwrap();
        insert_appointment(&conn, &m, "2024-06-03", "12:00", 60, "Dina", None).unwrap();

        let days = range_query(&conn, "2024-06-01", "2024-06-03", None).unwrap();
        let keys: Vec<&str> = days.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2024-06-01", "2024-06-02", "2024-06-03"]);
        assert_eq!(days["2024-06-01"].len(), 1);
        assert!(days["2024-06-02"].is_empty());
        assert_eq!(days["2024-06-03"].len(), 1);
    }

    #[test]
    fn days_are_ordered_by_time() {
        let (conn, m) = setup();
        insert_appointment(&conn, &m, "2024-06-01", "14:00", 60, "Kira", None).unwrap();
        insert_appointment(&conn, &m, "2024-06-01", "09:00", 60, "Anna", None).unwrap();

        let days = range_query(&conn, "2024-06-01", "2024-06-01", None).unwrap();
        let times: Vec<&str> = days["2024-06-01"].iter().map(|a| a.time.as_str()).collect();
        assert_eq!(times, vec!["09:00", "14:00"]);
    }

    #[test]
    fn range_can_be_scoped_to_master() {
        let (conn, m) = setup();
        let other = create_master(&conn, "Vera", Role::Member, None).unwrap();
        insert_appointment(&conn, &m, "2024-06-01", "10:00", 60, "Anna", None).unwrap();
        insert_appointment(&conn, &other.id, "2024-06-01", "10:00", 60, "Dina", None).unwrap();

        let days = range_query(&conn, "2024-06-01", "2024-06-01", Some(&m)).unwrap();
        assert_eq!(days["2024-06-01"].len(), 1);
        assert_eq!(days["2024-06-01"][0].master_id, m);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let (conn, _) = setup();
        let err = range_query(&conn, "2024-06-03", "2024-06-01", None).unwrap_err();
        assert!(matches!(err, ScheduleError::Validation(_)));

        let err = range_stats(&conn, "2024-06-03", "2024-06-01", None).unwrap_err();
        assert!(matches!(err, ScheduleError::Validation(_)));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let (conn, _) = setup();
        let err = range_query(&conn, "01.06.2024", "2024-06-03", None).unwrap_err();
        assert!(matches!(err, ScheduleError::Validation(_)));
    }

    #[test]
    fn stats_over_range() {
        let (conn, m) = setup();
        let mut done =
            insert_appointment(&conn, &m, "2024-06-01", "10:00", 60, "Anna", None).unwrap();
        done.status = AppointmentStatus::Completed;
        done.payment = Some(Payment { cash: 500, card: 1200 });
        update_appointment(&conn, &done).unwrap();
        insert_appointment(&conn, &m, "2024-06-02", "11:00", 60, "Dina", None).unwrap();
        let mut gone =
            insert_appointment(&conn, &m, "2024-06-02", "12:00", 60, "Kira", None).unwrap();
        gone.status = AppointmentStatus::Cancelled;
        update_appointment(&conn, &gone).unwrap();

        let stats = range_stats(&conn, "2024-06-01", "2024-06-02", None).unwrap();
        assert_eq!(stats.total_appointments, 3);
        assert_eq!(stats.completed_appointments, 1);
        assert_eq!(stats.total_revenue, 1700);
    }

    #[test]
    fn overall_stats_cover_the_whole_store() {
        let (conn, m) = setup();
        let mut done =
            insert_appointment(&conn, &m, "2023-12-31", "10:00", 60, "Anna", None).unwrap();
        done.status = AppointmentStatus::Completed;
        done.payment = Some(Payment { cash: 300, card: 0 });
        update_appointment(&conn, &done).unwrap();
        insert_appointment(&conn, &m, "2024-06-02", "11:00", 60, "Dina", None).unwrap();

        let all = overall_stats(&conn, None).unwrap();
        assert_eq!(all.total_appointments, 2);
        assert_eq!(all.completed_appointments, 1);
        assert_eq!(all.total_revenue, 300);

        let scoped = overall_stats(&conn, Some("nobody")).unwrap();
        assert_eq!(scoped.total_appointments, 0);
    }
}
