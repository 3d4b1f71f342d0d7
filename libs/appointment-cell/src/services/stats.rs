use chrono::Datelike;
use serde::Serialize;

use crate::models::{AppointmentRecord, AppointmentStatus};

/// Appointment counts for one calendar month, for dashboard charts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    pub month: u32,
    pub total: u32,
    pub pending: u32,
    pub approved: u32,
    pub completed: u32,
    pub cancelled_or_rejected: u32,
}

/// Twelve buckets, January first, counting `year`'s appointments.
pub fn monthly_breakdown(records: &[AppointmentRecord], year: i32, doctor_id: Option<i64>) -> Vec<MonthlyBucket> {
    let mut buckets: Vec<MonthlyBucket> = (1..=12)
        .map(|month| MonthlyBucket { month, ..Default::default() })
        .collect();

    let in_scope = records
        .iter()
        .filter(|record| record.date.year() == year)
        .filter(|record| doctor_id.is_none() || record.doctor_id() == doctor_id);

    for record in in_scope {
        let bucket = &mut buckets[record.date.month0() as usize];
        bucket.total += 1;
        match record.status {
            AppointmentStatus::Pending => bucket.pending += 1,
            AppointmentStatus::Approved => bucket.approved += 1,
            AppointmentStatus::Completed => bucket.completed += 1,
            AppointmentStatus::Cancelled | AppointmentStatus::Rejected => bucket.cancelled_or_rejected += 1,
        }
    }

    buckets
}
