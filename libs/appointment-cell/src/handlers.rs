// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde_json::{json, Value};
use tracing::debug;

use shared_backend::BackendError;
use shared_models::error::AppError;
use shared_models::session::Session;

use crate::models::{
    AppointmentError, AppointmentStatus, MonthlyStatsQuery, SlotQuery, StatusUpdateQuery, SubmitBookingRequest,
};
use crate::services::classification::{for_doctor, for_patient, partition};
use crate::services::stats::monthly_breakdown;
use crate::state::AppState;

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::IncompleteDraft { .. }
            | AppointmentError::PastDate(_)
            | AppointmentError::ValidationError(_) => AppError::ValidationError(e.to_string()),
            AppointmentError::StaleAvailability | AppointmentError::SlotNotAvailable(_) => {
                AppError::Conflict(e.to_string())
            }
            AppointmentError::Rejected { message, draft } => AppError::ConflictWithDetail {
                message: format!("Booking failed: {}", message),
                detail: json!({ "draft": draft }),
            },
            AppointmentError::NotFound(_) => AppError::NotFound(e.to_string()),
            AppointmentError::InvalidStatusTransition { .. } => AppError::BadRequest(e.to_string()),
            AppointmentError::Forbidden(msg) => AppError::Forbidden(msg),
            AppointmentError::Backend(BackendError::Auth(msg)) => AppError::Auth(msg),
            AppointmentError::Backend(BackendError::Conflict(msg)) => AppError::Conflict(msg),
            AppointmentError::Backend(BackendError::Rejected(msg)) => AppError::BadRequest(msg),
            AppointmentError::Backend(e) => AppError::ExternalService(e.to_string()),
            AppointmentError::Doctor(e) => e.into(),
        }
    }
}

/// The clinic day used for past-date checks and history classification.
fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn session_token(session: &Session) -> Result<&str, AppError> {
    session.token()
        .ok_or_else(|| AppError::Auth("Authentication required".to_string()))
}

/// Patients book for themselves; staff must name the patient.
fn booking_patient(session: &Session, requested: Option<i64>) -> Result<i64, AppError> {
    match session {
        Session::Patient { id, .. } => match requested {
            Some(other) if other != *id => Err(AppError::Forbidden(
                "Patients can only book appointments for themselves".to_string(),
            )),
            _ => Ok(*id),
        },
        Session::Doctor { .. } | Session::Admin { .. } => requested.ok_or_else(|| {
            AppError::ValidationError("patient_id is required when booking on behalf of a patient".to_string())
        }),
        Session::Anonymous => Err(AppError::Auth("Please log in to book an appointment".to_string())),
    }
}

#[axum::debug_handler]
pub async fn get_slots(
    State(state): State<AppState>,
    Query(query): Query<SlotQuery>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    // A past day has nothing bookable, so it gets no grid either
    if query.date < today() {
        return Err(AppointmentError::PastDate(query.date).into());
    }

    let token = session_token(&session)?;
    let availability = state.booking_service()
        .availability_for(query.doctor_id, query.date, token)
        .await?;

    Ok(Json(json!({
        "success": true,
        "doctor_id": availability.doctor_id,
        "date": availability.date,
        "slots": availability.slots,
        "free": availability.free_slots().count(),
        "booked": availability.booked_count()
    })))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(request): Json<SubmitBookingRequest>,
) -> Result<Json<Value>, AppError> {
    let patient_id = booking_patient(&session, request.patient_id)?;
    let token = session_token(&session)?;

    let appointment = state.booking_service()
        .submit(patient_id, &request.draft, today(), token)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Appointment request sent successfully",
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<AppState>,
    Path(appointment_id): Path<i64>,
    Query(query): Query<StatusUpdateQuery>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let status: AppointmentStatus = query.status.parse()?;
    let token = session_token(&session)?;

    let appointment = state.booking_service()
        .update_status(&session, appointment_id, status, token)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Appointment {} successfully", status.as_str().to_ascii_lowercase()),
        "appointment": appointment
    })))
}

#[axum::debug_handler]
pub async fn get_my_appointments(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let token = session_token(&session)?;
    let snapshot = state.roster.refresh(token).await.map_err(AppointmentError::from)?;

    let mine: Vec<_> = match &session {
        Session::Patient { id, .. } => for_patient(&snapshot.records, *id).cloned().collect(),
        Session::Doctor { id, .. } => for_doctor(&snapshot.records, *id).cloned().collect(),
        Session::Admin { .. } => snapshot.records.clone(),
        Session::Anonymous => Vec::new(),
    };
    debug!("{} of {} roster records visible to {}", mine.len(), snapshot.records.len(), session.role());

    let split = partition(mine, today());

    Ok(Json(json!({
        "success": true,
        "upcoming": split.upcoming,
        "history": split.history,
        "fetched_at": snapshot.fetched_at
    })))
}

#[axum::debug_handler]
pub async fn get_monthly_stats(
    State(state): State<AppState>,
    Query(query): Query<MonthlyStatsQuery>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    if !session.is_staff() {
        return Err(AppError::Forbidden("Only staff can view appointment statistics".to_string()));
    }

    let doctor_id = match &session {
        Session::Doctor { id, .. } => match query.doctor_id {
            Some(other) if other != *id => {
                return Err(AppError::Forbidden("Doctors can only view their own statistics".to_string()));
            }
            _ => Some(*id),
        },
        _ => query.doctor_id,
    };

    let token = session_token(&session)?;
    let year = query.year.unwrap_or_else(|| today().year());
    let snapshot = state.roster.refresh(token).await.map_err(AppointmentError::from)?;

    let months = monthly_breakdown(&snapshot.records, year, doctor_id);
    let total: u32 = months.iter().map(|bucket| bucket.total).sum();

    Ok(Json(json!({
        "success": true,
        "year": year,
        "doctor_id": doctor_id,
        "total": total,
        "months": months
    })))
}
