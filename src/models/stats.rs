use serde::Serialize;

/// Aggregate counts and revenue over a set of appointments.
///
/// `total_appointments` is a gross count across all statuses (cancelled
/// included); callers needing net counts filter by status themselves.
/// Revenue sums cash + card over completed appointments only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeStats {
    pub total_appointments: u64,
    pub completed_appointments: u64,
    pub total_revenue: i64,
}
