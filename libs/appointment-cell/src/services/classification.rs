use std::cmp::Reverse;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::AppointmentRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppointmentPartition {
    /// Soonest first.
    pub upcoming: Vec<AppointmentRecord>,
    /// Most recent first.
    pub history: Vec<AppointmentRecord>,
}

/// Finished, cancelled or rejected appointments and anything dated before
/// `today` belong to history.
pub fn is_history(record: &AppointmentRecord, today: NaiveDate) -> bool {
    record.status.is_terminal() || record.date < today
}

pub fn partition<I>(records: I, today: NaiveDate) -> AppointmentPartition
where
    I: IntoIterator<Item = AppointmentRecord>,
{
    let (mut history, mut upcoming): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|record| is_history(record, today));

    upcoming.sort_by_key(|record| (record.date, record.time));
    history.sort_by_key(|record| Reverse((record.date, record.time)));

    AppointmentPartition { upcoming, history }
}

pub fn for_patient(records: &[AppointmentRecord], patient_id: i64) -> impl Iterator<Item = &AppointmentRecord> {
    records.iter().filter(move |record| record.patient_id() == Some(patient_id))
}

pub fn for_doctor(records: &[AppointmentRecord], doctor_id: i64) -> impl Iterator<Item = &AppointmentRecord> {
    records.iter().filter(move |record| record.doctor_id() == Some(doctor_id))
}
