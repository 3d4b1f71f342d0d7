use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error};

use shared_backend::{BackendError, ClinicApiClient};

use crate::models::{DoctorError, DoctorRef, RosterEntry, ShiftStatus};

/// Read access to the backend's doctor list and duty rosters.
pub struct DoctorDirectory {
    backend: Arc<ClinicApiClient>,
}

impl DoctorDirectory {
    pub fn new(backend: Arc<ClinicApiClient>) -> Self {
        Self { backend }
    }

    pub async fn list_doctors(&self, auth_token: &str) -> Result<Vec<DoctorRef>, DoctorError> {
        debug!("Fetching doctor list");

        let doctors: Vec<DoctorRef> = self.backend
            .get("/doctors", Some(auth_token))
            .await
            .map_err(|e| {
                error!("Doctors loading failed: {}", e);
                e
            })?;

        debug!("Fetched {} doctors", doctors.len());
        Ok(doctors)
    }

    pub async fn find_doctor(&self, doctor_id: i64, auth_token: &str) -> Result<DoctorRef, DoctorError> {
        self.list_doctors(auth_token)
            .await?
            .into_iter()
            .find(|doctor| doctor.id == doctor_id)
            .ok_or(DoctorError::NotFound(doctor_id))
    }

    pub async fn roster_for(&self, doctor_id: i64, auth_token: &str) -> Result<Vec<RosterEntry>, DoctorError> {
        debug!("Fetching duty roster for doctor {}", doctor_id);

        let path = format!("/rosters/doctor/{}", doctor_id);
        match self.backend.get::<Vec<RosterEntry>>(&path, Some(auth_token)).await {
            Ok(entries) => Ok(entries),
            // No roster has been published for this doctor yet.
            Err(BackendError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => {
                error!("Roster loading failed for doctor {}: {}", doctor_id, e);
                Err(e.into())
            }
        }
    }

    /// The doctor's shift on `date`, if a roster entry exists for it.
    pub async fn shift_on(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Option<ShiftStatus>, DoctorError> {
        let roster = self.roster_for(doctor_id, auth_token).await?;
        Ok(roster
            .into_iter()
            .find(|entry| entry.date == date)
            .map(|entry| entry.shift_status))
    }
}
