use serde::{Deserialize, Serialize};

use crate::models::{DoctorError, ShiftStatus};

/// Whole-hour opening window, start inclusive and end exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HourWindow {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl HourWindow {
    pub fn new(start_hour: u8, end_hour: u8) -> Result<Self, DoctorError> {
        if end_hour > 24 {
            return Err(DoctorError::InvalidWindow(format!("end hour {} is past midnight", end_hour)));
        }
        if start_hour > end_hour {
            return Err(DoctorError::InvalidWindow(format!(
                "start hour {} is after end hour {}", start_hour, end_hour
            )));
        }
        Ok(Self { start_hour, end_hour })
    }

    pub fn is_empty(&self) -> bool {
        self.start_hour >= self.end_hour
    }

    pub fn intersect(&self, other: &HourWindow) -> Option<HourWindow> {
        let start_hour = self.start_hour.max(other.start_hour);
        let end_hour = self.end_hour.min(other.end_hour);
        (start_hour < end_hour).then_some(HourWindow { start_hour, end_hour })
    }
}

/// Which hours of the clinic day are offered for booking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlotPolicy {
    /// 09:00 to 17:00.
    #[default]
    BusinessHours,
    /// 07:00 to 10:00 and 17:00 to 22:00.
    SplitShifts,
    Custom(Vec<HourWindow>),
}

impl SlotPolicy {
    /// Parse `business`, `split`, or a comma separated list such as `7-10,17-22`.
    pub fn parse(raw: &str) -> Result<Self, DoctorError> {
        let raw = raw.trim().to_ascii_lowercase();
        match raw.as_str() {
            "" | "business" => return Ok(SlotPolicy::BusinessHours),
            "split" => return Ok(SlotPolicy::SplitShifts),
            _ => {}
        }

        let windows = raw
            .split(',')
            .map(|part| {
                let (start, end) = part
                    .trim()
                    .split_once('-')
                    .ok_or_else(|| DoctorError::InvalidWindow(format!("expected start-end, got '{}'", part)))?;
                let parse_hour = |value: &str| {
                    value
                        .trim()
                        .parse::<u8>()
                        .map_err(|_| DoctorError::InvalidWindow(format!("'{}' is not an hour", value)))
                };
                HourWindow::new(parse_hour(start)?, parse_hour(end)?)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SlotPolicy::Custom(windows))
    }

    pub fn windows(&self) -> Vec<HourWindow> {
        match self {
            SlotPolicy::BusinessHours => vec![HourWindow { start_hour: 9, end_hour: 17 }],
            SlotPolicy::SplitShifts => vec![
                HourWindow { start_hour: 7, end_hour: 10 },
                HourWindow { start_hour: 17, end_hour: 22 },
            ],
            SlotPolicy::Custom(windows) => windows.clone(),
        }
    }

    /// Policy windows narrowed to the doctor's shift for the day. Without a
    /// roster entry the policy applies unchanged.
    pub fn windows_for(&self, shift: Option<ShiftStatus>) -> Vec<HourWindow> {
        let Some(shift) = shift else {
            return self.windows();
        };

        let shift_windows = shift.hour_windows();
        self.windows()
            .iter()
            .flat_map(|window| shift_windows.iter().filter_map(move |s| window.intersect(s)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_window_validation() {
        assert!(HourWindow::new(9, 17).is_ok());
        assert!(HourWindow::new(12, 12).unwrap().is_empty());
        assert_matches!(HourWindow::new(18, 9), Err(DoctorError::InvalidWindow(_)));
        assert_matches!(HourWindow::new(20, 25), Err(DoctorError::InvalidWindow(_)));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(SlotPolicy::parse("business").unwrap(), SlotPolicy::BusinessHours);
        assert_eq!(SlotPolicy::parse(" Split ").unwrap(), SlotPolicy::SplitShifts);
        assert_eq!(
            SlotPolicy::parse("7-10, 17-22").unwrap().windows(),
            SlotPolicy::SplitShifts.windows()
        );
        assert_matches!(SlotPolicy::parse("9to17"), Err(DoctorError::InvalidWindow(_)));
        assert_matches!(SlotPolicy::parse("9-x"), Err(DoctorError::InvalidWindow(_)));
    }

    #[test]
    fn test_windows_without_roster_are_policy_windows() {
        assert_eq!(SlotPolicy::SplitShifts.windows_for(None), SlotPolicy::SplitShifts.windows());
    }

    #[test]
    fn test_windows_narrowed_by_shift() {
        let business = SlotPolicy::BusinessHours;
        assert_eq!(
            business.windows_for(Some(ShiftStatus::Morning)),
            vec![HourWindow { start_hour: 9, end_hour: 13 }]
        );
        assert!(business.windows_for(Some(ShiftStatus::Off)).is_empty());

        // Split shifts only overlap a full-duty day between 09:00 and 10:00.
        assert_eq!(
            SlotPolicy::SplitShifts.windows_for(Some(ShiftStatus::FullDuty)),
            vec![HourWindow { start_hour: 9, end_hour: 10 }]
        );
    }
}
