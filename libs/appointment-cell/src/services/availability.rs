use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::models::{AppointmentRecord, TimeSlot};
use crate::services::slots::SlotCatalogue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotState {
    pub slot: TimeSlot,
    pub booked: bool,
}

/// Booked/free state of every catalogue slot for one (doctor, date) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotAvailability {
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub slots: Vec<SlotState>,
}

impl SlotAvailability {
    pub fn is_for(&self, doctor_id: i64, date: NaiveDate) -> bool {
        self.doctor_id == doctor_id && self.date == date
    }

    /// Slots outside the catalogue are never free.
    pub fn is_free(&self, slot: TimeSlot) -> bool {
        self.slots
            .iter()
            .any(|state| state.slot == slot && !state.booked)
    }

    pub fn free_slots(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        self.slots.iter().filter(|state| !state.booked).map(|state| state.slot)
    }

    pub fn booked_count(&self) -> usize {
        self.slots.iter().filter(|state| state.booked).count()
    }
}

/// Classify each catalogue slot against the roster. A slot is booked when an
/// active record exists for the same doctor, date and minute.
pub fn resolve_availability(
    catalogue: &SlotCatalogue,
    roster: &[AppointmentRecord],
    doctor_id: i64,
    date: NaiveDate,
) -> SlotAvailability {
    let taken: HashSet<TimeSlot> = roster
        .iter()
        .filter(|record| record.occupies(doctor_id, date))
        .map(|record| record.time)
        .collect();

    let slots: Vec<SlotState> = catalogue
        .iter()
        .map(|slot| SlotState { slot, booked: taken.contains(&slot) })
        .collect();

    debug!(
        "Resolved {} slots for doctor {} on {}: {} booked",
        slots.len(), doctor_id, date, taken.len()
    );

    SlotAvailability { doctor_id, date, slots }
}
