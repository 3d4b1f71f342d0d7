// libs/appointment-cell/src/models.rs
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use doctor_cell::{DoctorError, DoctorRef};
use shared_backend::BackendError;

// ==============================================================================
// TIME OF DAY
// ==============================================================================

/// A bookable point in the clinic day at minute granularity, rendered `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot(NaiveTime);

impl TimeSlot {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(TimeSlot)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// `HH:MM:SS`, the shape the backend stores.
    pub fn to_backend_time(&self) -> String {
        self.0.format("%H:%M:%S").to_string()
    }
}

impl From<NaiveTime> for TimeSlot {
    /// Drops seconds and sub-seconds.
    fn from(time: NaiveTime) -> Self {
        TimeSlot(NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time))
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeSlot {
    type Err = AppointmentError;

    /// Accepts `HH:MM` and `HH:MM:SS[.fff]`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .map(TimeSlot::from)
            .map_err(|_| AppointmentError::ValidationError(format!("Invalid time of day: '{}'", raw)))
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeSlot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Map a backend status string. Unknown values are treated as `Pending`
    /// so the slot they sit in stays occupied.
    pub fn from_backend(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            warn!("Unknown appointment status '{}', treating as pending", raw);
            AppointmentStatus::Pending
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Approved => "APPROVED",
            AppointmentStatus::Rejected => "REJECTED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Completed => "COMPLETED",
        }
    }

    /// Cancelled and rejected bookings no longer hold their slot.
    pub fn is_slot_releasing(&self) -> bool {
        matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::Rejected)
    }

    /// Statuses that put an appointment in the history list regardless of date.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Cancelled | AppointmentStatus::Rejected | AppointmentStatus::Completed
        )
    }

    /// Terminal appointments are frozen, and nothing moves back to `Pending`.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        !self.is_terminal() && next != AppointmentStatus::Pending && next != *self
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppointmentError;

    /// Case-insensitive, with the aliases the backend has used over time.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" | "SCHEDULED" | "BOOKED" => Ok(AppointmentStatus::Pending),
            "APPROVED" | "CONFIRMED" | "ACCEPTED" => Ok(AppointmentStatus::Approved),
            "REJECTED" => Ok(AppointmentStatus::Rejected),
            "CANCELLED" | "CANCELED" => Ok(AppointmentStatus::Cancelled),
            "COMPLETED" => Ok(AppointmentStatus::Completed),
            _ => Err(AppointmentError::ValidationError(format!("Unknown appointment status: '{}'", raw))),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AppointmentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AppointmentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // A null status is read like a missing one.
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map_or_else(AppointmentStatus::default, |raw| AppointmentStatus::from_backend(&raw)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRef {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One booking as held by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub time: TimeSlot,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub patient: Option<PatientRef>,
    #[serde(default)]
    pub doctor: Option<DoctorRef>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AppointmentRecord {
    pub fn doctor_id(&self) -> Option<i64> {
        self.doctor.as_ref().map(|d| d.id)
    }

    pub fn patient_id(&self) -> Option<i64> {
        self.patient.as_ref().map(|p| p.id)
    }

    /// Whether this record holds the given doctor's slot on `date`.
    pub fn occupies(&self, doctor_id: i64, date: NaiveDate) -> bool {
        self.doctor_id() == Some(doctor_id)
            && self.date == date
            && !self.status.is_slot_releasing()
    }
}

// ==============================================================================
// BOOKING DRAFT
// ==============================================================================

/// The patient's in-progress booking form. Availability is scoped to one
/// (doctor, date) pair, so changing either clears the chosen slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDraft {
    #[serde(default)]
    pub doctor_id: Option<i64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub slot: Option<TimeSlot>,
    #[serde(default)]
    pub reason: String,
}

impl BookingDraft {
    pub fn select_doctor(&mut self, doctor_id: i64) {
        self.doctor_id = Some(doctor_id);
        self.slot = None;
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.date = Some(date);
        self.slot = None;
    }

    pub fn select_slot(&mut self, slot: TimeSlot) {
        self.slot = Some(slot);
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.doctor_id.is_none() {
            missing.push("doctor");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if self.slot.is_none() {
            missing.push("time");
        }
        missing
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitBookingRequest {
    /// Staff book on behalf of a patient; patients always book for themselves.
    pub patient_id: Option<i64>,
    #[serde(flatten)]
    pub draft: BookingDraft,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotQuery {
    pub doctor_id: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateQuery {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonthlyStatsQuery {
    pub year: Option<i32>,
    pub doctor_id: Option<i64>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Please select a doctor, date and time (missing: {})", .missing.join(", "))]
    IncompleteDraft { missing: Vec<&'static str> },

    #[error("Cannot book a date in the past: {0}")]
    PastDate(NaiveDate),

    #[error("Availability was computed for a different doctor or date")]
    StaleAvailability,

    #[error("Time slot {0} is already booked")]
    SlotNotAvailable(TimeSlot),

    /// The backend refused the booking; the draft is handed back untouched.
    #[error("Booking failed: {message}")]
    Rejected { message: String, draft: BookingDraft },

    #[error("Appointment {0} not found")]
    NotFound(i64),

    #[error("Cannot move appointment from {from} to {to}")]
    InvalidStatusTransition { from: AppointmentStatus, to: AppointmentStatus },

    #[error("Not authorized: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Doctor lookup failed: {0}")]
    Doctor(#[from] DoctorError),
}
