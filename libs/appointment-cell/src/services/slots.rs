use std::collections::BTreeSet;

use doctor_cell::{HourWindow, ShiftStatus, SlotPolicy};

use crate::models::TimeSlot;

pub const SLOT_GRANULARITY_MINUTES: u32 = 15;

/// Ordered, duplicate-free list of bookable time slots for one clinic day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCatalogue {
    slots: Vec<TimeSlot>,
}

impl SlotCatalogue {
    /// Merge hour windows into one catalogue. Windows may overlap or be empty.
    pub fn from_windows(windows: &[HourWindow]) -> Self {
        let slots: BTreeSet<TimeSlot> = windows
            .iter()
            .flat_map(|window| u32::from(window.start_hour)..u32::from(window.end_hour))
            .flat_map(|hour| {
                (0..60)
                    .step_by(SLOT_GRANULARITY_MINUTES as usize)
                    .filter_map(move |minute| TimeSlot::new(hour, minute))
            })
            .collect();

        Self { slots: slots.into_iter().collect() }
    }

    pub fn business_hours() -> Self {
        Self::from_windows(&SlotPolicy::BusinessHours.windows())
    }

    pub fn split_shifts() -> Self {
        Self::from_windows(&SlotPolicy::SplitShifts.windows())
    }

    /// Catalogue for a doctor's day under `policy`, narrowed to their shift.
    pub fn for_policy(policy: &SlotPolicy, shift: Option<ShiftStatus>) -> Self {
        Self::from_windows(&policy.windows_for(shift))
    }

    pub fn iter(&self) -> impl Iterator<Item = TimeSlot> + '_ {
        self.slots.iter().copied()
    }

    pub fn contains(&self, slot: TimeSlot) -> bool {
        self.slots.binary_search(&slot).is_ok()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn as_slice(&self) -> &[TimeSlot] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(catalogue: &SlotCatalogue) -> Vec<String> {
        catalogue.iter().map(|slot| slot.to_string()).collect()
    }

    fn assert_well_formed(catalogue: &SlotCatalogue) {
        let slots = catalogue.as_slice();
        for pair in slots.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
        for slot in slots {
            assert_eq!(slot.minute() % SLOT_GRANULARITY_MINUTES, 0);
            let label = slot.to_string();
            assert_eq!(label.len(), 5);
            assert_eq!(&label[2..3], ":");
        }
    }

    #[test]
    fn test_business_hours_catalogue() {
        let catalogue = SlotCatalogue::business_hours();
        assert_eq!(catalogue.len(), 32);

        let labels = labels(&catalogue);
        assert_eq!(labels.first().map(String::as_str), Some("09:00"));
        assert_eq!(&labels[..3], ["09:00", "09:15", "09:30"]);
        assert_eq!(labels.last().map(String::as_str), Some("16:45"));
        assert_well_formed(&catalogue);
    }

    #[test]
    fn test_split_shift_catalogue() {
        let catalogue = SlotCatalogue::split_shifts();
        assert_eq!(catalogue.len(), 12 + 20);

        let labels = labels(&catalogue);
        assert_eq!(labels[0], "07:00");
        assert_eq!(labels[11], "09:45");
        assert_eq!(labels[12], "17:00");
        assert_eq!(labels.last().map(String::as_str), Some("21:45"));
        assert!(!catalogue.contains(TimeSlot::new(12, 0).unwrap()));
        assert_well_formed(&catalogue);
    }

    #[test]
    fn test_empty_window_contributes_nothing() {
        let catalogue = SlotCatalogue::from_windows(&[
            HourWindow { start_hour: 12, end_hour: 12 },
            HourWindow { start_hour: 8, end_hour: 9 },
        ]);
        assert_eq!(labels(&catalogue), ["08:00", "08:15", "08:30", "08:45"]);
        assert!(SlotCatalogue::from_windows(&[]).is_empty());
    }

    #[test]
    fn test_overlapping_windows_are_deduplicated_in_order() {
        let catalogue = SlotCatalogue::from_windows(&[
            HourWindow { start_hour: 10, end_hour: 12 },
            HourWindow { start_hour: 9, end_hour: 11 },
        ]);
        assert_eq!(catalogue.len(), 12);
        assert_eq!(labels(&catalogue)[0], "09:00");
        assert_eq!(labels(&catalogue)[11], "11:45");
        assert_well_formed(&catalogue);
    }

    #[test]
    fn test_full_day_stops_before_midnight() {
        let catalogue = SlotCatalogue::from_windows(&[HourWindow { start_hour: 0, end_hour: 24 }]);
        assert_eq!(catalogue.len(), 96);
        assert_eq!(labels(&catalogue).last().map(String::as_str), Some("23:45"));
    }

    #[test]
    fn test_catalogue_is_restartable() {
        let catalogue = SlotCatalogue::business_hours();
        let first: Vec<_> = catalogue.iter().collect();
        let second: Vec<_> = catalogue.iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_policy_catalogue_follows_shift() {
        let morning = SlotCatalogue::for_policy(&SlotPolicy::BusinessHours, Some(ShiftStatus::Morning));
        assert_eq!(morning.len(), 16);
        assert_eq!(labels(&morning).last().map(String::as_str), Some("12:45"));

        let off = SlotCatalogue::for_policy(&SlotPolicy::BusinessHours, Some(ShiftStatus::Off));
        assert!(off.is_empty());
    }
}
