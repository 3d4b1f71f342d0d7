use std::sync::Arc;

use axum::{
    extract::{Path, State, Extension},
    Json,
};
use serde_json::{json, Value};

use shared_backend::{BackendError, ClinicApiClient};
use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_models::session::Session;

use crate::models::DoctorError;
use crate::services::DoctorDirectory;

fn directory(config: &AppConfig) -> Result<DoctorDirectory, AppError> {
    let backend = ClinicApiClient::new(config)
        .map_err(|e| AppError::Internal(format!("Failed to build backend client: {}", e)))?;
    Ok(DoctorDirectory::new(Arc::new(backend)))
}

fn session_token(session: &Session) -> Result<&str, AppError> {
    session.token()
        .ok_or_else(|| AppError::Auth("Authentication required".to_string()))
}

impl From<DoctorError> for AppError {
    fn from(e: DoctorError) -> Self {
        match e {
            DoctorError::NotFound(id) => AppError::NotFound(format!("Doctor {} not found", id)),
            DoctorError::InvalidShift(msg) | DoctorError::InvalidWindow(msg) => AppError::ValidationError(msg),
            DoctorError::Backend(BackendError::Auth(msg)) => AppError::Auth(msg),
            DoctorError::Backend(e) => AppError::ExternalService(e.to_string()),
        }
    }
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let token = session_token(&session)?;
    let doctors = directory(&config)?.list_doctors(token).await?;

    Ok(Json(json!({
        "success": true,
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<i64>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let token = session_token(&session)?;
    let doctor = directory(&config)?.find_doctor(doctor_id, token).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn get_doctor_roster(
    State(config): State<Arc<AppConfig>>,
    Path(doctor_id): Path<i64>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let token = session_token(&session)?;
    let roster = directory(&config)?.roster_for(doctor_id, token).await?;

    Ok(Json(json!({
        "success": true,
        "doctor_id": doctor_id,
        "roster": roster
    })))
}
