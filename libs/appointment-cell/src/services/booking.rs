// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use doctor_cell::{DoctorDirectory, SlotPolicy};
use shared_backend::{BackendError, ClinicApiClient};
use shared_models::session::Session;

use crate::models::{AppointmentError, AppointmentRecord, AppointmentStatus, BookingDraft, TimeSlot};
use crate::services::availability::{resolve_availability, SlotAvailability};
use crate::services::roster_feed::RosterFeed;
use crate::services::slots::SlotCatalogue;

/// A draft that passed every client-side check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBooking {
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub reason: String,
}

impl ValidatedBooking {
    /// Body for `POST /appointments`.
    pub fn to_payload(&self, patient_id: i64) -> Value {
        let time = self.slot.to_backend_time();
        json!({
            "patientId": patient_id,
            "doctorId": self.doctor_id,
            "date": self.date.format("%Y-%m-%d").to_string(),
            "time": time,
            "appointmentTime": format!("{}T{}", self.date.format("%Y-%m-%d"), time),
            "notes": self.reason,
            "status": AppointmentStatus::Pending.as_str(),
        })
    }
}

/// Gate a submission: the draft must be complete, not in the past, checked
/// against availability for its own (doctor, date), and aim at a free slot.
pub fn check_booking(
    draft: &BookingDraft,
    availability: &SlotAvailability,
    today: NaiveDate,
) -> Result<ValidatedBooking, AppointmentError> {
    let (Some(doctor_id), Some(date), Some(slot)) = (draft.doctor_id, draft.date, draft.slot) else {
        return Err(AppointmentError::IncompleteDraft { missing: draft.missing_fields() });
    };

    if date < today {
        return Err(AppointmentError::PastDate(date));
    }

    if !availability.is_for(doctor_id, date) {
        return Err(AppointmentError::StaleAvailability);
    }

    if !availability.is_free(slot) {
        return Err(AppointmentError::SlotNotAvailable(slot));
    }

    Ok(ValidatedBooking {
        doctor_id,
        date,
        slot,
        reason: draft.reason.trim().to_string(),
    })
}

/// Admins may set any status, doctors only on their own appointments, and
/// patients may only cancel their own.
pub fn authorize_status_change(
    requester: &Session,
    record: &AppointmentRecord,
    status: AppointmentStatus,
) -> Result<(), AppointmentError> {
    match requester {
        Session::Admin { .. } => Ok(()),
        Session::Doctor { id, .. } if record.doctor_id() == Some(*id) => Ok(()),
        Session::Doctor { .. } => Err(AppointmentError::Forbidden(
            "Doctors can only update their own appointments".to_string(),
        )),
        Session::Patient { id, .. }
            if record.patient_id() == Some(*id) && status == AppointmentStatus::Cancelled => Ok(()),
        Session::Patient { .. } => Err(AppointmentError::Forbidden(
            "Patients can only cancel their own appointments".to_string(),
        )),
        Session::Anonymous => Err(AppointmentError::Forbidden("Authentication required".to_string())),
    }
}

/// Availability lookups and booking submission against the clinic backend.
/// The local check is advisory; the backend decides on conflicts.
pub struct BookingService {
    backend: Arc<ClinicApiClient>,
    roster: Arc<RosterFeed>,
    directory: DoctorDirectory,
    policy: SlotPolicy,
}

impl BookingService {
    pub fn new(backend: Arc<ClinicApiClient>, roster: Arc<RosterFeed>, policy: SlotPolicy) -> Self {
        Self {
            directory: DoctorDirectory::new(backend.clone()),
            backend,
            roster,
            policy,
        }
    }

    /// Slots offered for the doctor's day. A roster lookup failure falls back
    /// to the configured policy.
    pub async fn catalogue_for(&self, doctor_id: i64, date: NaiveDate, auth_token: &str) -> SlotCatalogue {
        let shift = match self.directory.shift_on(doctor_id, date, auth_token).await {
            Ok(shift) => shift,
            Err(e) => {
                warn!("Duty roster unavailable for doctor {} on {}, using policy hours: {}", doctor_id, date, e);
                None
            }
        };

        SlotCatalogue::for_policy(&self.policy, shift)
    }

    pub async fn availability_for(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<SlotAvailability, AppointmentError> {
        let snapshot = self.roster.refresh(auth_token).await?;
        let catalogue = self.catalogue_for(doctor_id, date, auth_token).await;

        Ok(resolve_availability(&catalogue, &snapshot.records, doctor_id, date))
    }

    /// Validate and send a booking, then re-fetch the roster. The roster is
    /// never patched locally; the next fetch shows what the backend accepted.
    pub async fn submit(
        &self,
        patient_id: i64,
        draft: &BookingDraft,
        today: NaiveDate,
        auth_token: &str,
    ) -> Result<Value, AppointmentError> {
        // Refuse drafts the gate would refuse anyway before touching the backend
        let (Some(doctor_id), Some(date), Some(_)) = (draft.doctor_id, draft.date, draft.slot) else {
            return Err(AppointmentError::IncompleteDraft { missing: draft.missing_fields() });
        };
        if date < today {
            return Err(AppointmentError::PastDate(date));
        }

        let availability = self.availability_for(doctor_id, date, auth_token).await?;
        let booking = check_booking(draft, &availability, today)?;

        debug!("Sending booking for patient {}: doctor {} on {} at {}",
               patient_id, booking.doctor_id, booking.date, booking.slot);

        let created: Value = match self.backend
            .post("/appointments", Some(auth_token), booking.to_payload(patient_id))
            .await
        {
            Ok(created) => created,
            Err(BackendError::Conflict(message)) | Err(BackendError::Rejected(message)) => {
                warn!("Backend rejected booking for doctor {} on {} at {}: {}",
                      booking.doctor_id, booking.date, booking.slot, message);
                return Err(AppointmentError::Rejected { message, draft: draft.clone() });
            }
            Err(e) => {
                error!("Booking request failed: {}", e);
                return Err(e.into());
            }
        };

        info!("Appointment request sent for patient {} with doctor {} on {} at {}",
              patient_id, booking.doctor_id, booking.date, booking.slot);

        if let Err(e) = self.roster.refresh(auth_token).await {
            warn!("Roster refresh after booking failed: {}", e);
        }

        Ok(created)
    }

    /// Move an appointment to `status` through the backend, then re-fetch the
    /// roster so a cancelled or rejected booking frees its slot.
    pub async fn update_status(
        &self,
        requester: &Session,
        appointment_id: i64,
        status: AppointmentStatus,
        auth_token: &str,
    ) -> Result<Value, AppointmentError> {
        let roster = self.roster.refresh(auth_token).await?;
        let record = roster.records
            .iter()
            .find(|record| record.id == appointment_id)
            .ok_or(AppointmentError::NotFound(appointment_id))?;

        authorize_status_change(requester, record, status)?;

        if !record.status.can_transition_to(status) {
            warn!("Refusing status change of appointment {}: {} -> {}", appointment_id, record.status, status);
            return Err(AppointmentError::InvalidStatusTransition { from: record.status, to: status });
        }

        let path = format!("/appointments/{}/status?status={}", appointment_id, status.as_str());
        let updated: Value = self.backend
            .put(&path, Some(auth_token), None)
            .await
            .map_err(|e| {
                error!("Status update of appointment {} failed: {}", appointment_id, e);
                e
            })?;

        info!("Appointment {} moved from {} to {} by {}", appointment_id, record.status, status, requester.role());

        if let Err(e) = self.roster.refresh(auth_token).await {
            warn!("Roster refresh after status update failed: {}", e);
        }

        Ok(updated)
    }
}
