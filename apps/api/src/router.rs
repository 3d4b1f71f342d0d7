use std::sync::Arc;

use axum::{
    Json,
    Router,
    routing::get,
};
use serde_json::json;

use appointment_cell::{appointment_routes, AppState};
use doctor_cell::router::doctor_routes;
use shared_config::AppConfig;

pub fn create_router(config: Arc<AppConfig>, state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .route("/healthz", get(|| async { Json(json!({ "status": "ok" })) }))
        .nest("/doctors", doctor_routes(config))
        .nest("/appointments", appointment_routes(state))
}
