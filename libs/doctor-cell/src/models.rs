use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use shared_backend::BackendError;

use crate::schedule::HourWindow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorRef {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub specialization: String,
}

// ==============================================================================
// DUTY ROSTER
// ==============================================================================

/// A doctor's duty shift for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftStatus {
    FullDuty,
    Morning,
    Evening,
    Off,
}

impl ShiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftStatus::FullDuty => "Full Duty",
            ShiftStatus::Morning => "Morning",
            ShiftStatus::Evening => "Evening",
            ShiftStatus::Off => "Off",
        }
    }

    /// Working hours covered by the shift.
    pub fn hour_windows(&self) -> Vec<HourWindow> {
        match self {
            ShiftStatus::FullDuty => vec![HourWindow { start_hour: 9, end_hour: 17 }],
            ShiftStatus::Morning => vec![HourWindow { start_hour: 9, end_hour: 13 }],
            ShiftStatus::Evening => vec![HourWindow { start_hour: 13, end_hour: 17 }],
            ShiftStatus::Off => Vec::new(),
        }
    }
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftStatus {
    type Err = DoctorError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_uppercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "FULL-DUTY" | "DUTY" => Ok(ShiftStatus::FullDuty),
            "MORNING" | "HALFDAY-MORNING" => Ok(ShiftStatus::Morning),
            "EVENING" | "HALFDAY-EVENING" => Ok(ShiftStatus::Evening),
            "OFF" => Ok(ShiftStatus::Off),
            _ => Err(DoctorError::InvalidShift(raw.to_string())),
        }
    }
}

impl Serialize for ShiftStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ShiftStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub date: NaiveDate,
    pub shift_status: ShiftStatus,
    #[serde(default)]
    pub doctor: Option<DoctorRef>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found: {0}")]
    NotFound(i64),

    #[error("Invalid shift status: {0}")]
    InvalidShift(String),

    #[error("Invalid slot window: {0}")]
    InvalidWindow(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}
