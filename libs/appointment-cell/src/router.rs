// libs/appointment-cell/src/router.rs
use axum::{
    Router,
    routing::{get, post, put},
    middleware,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::AppState;

pub fn appointment_routes(state: AppState) -> Router {
    // Every appointment operation needs a session token for the backend
    let protected_routes = Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/slots", get(handlers::get_slots))
        .route("/mine", get(handlers::get_my_appointments))
        .route("/{appointment_id}/status", put(handlers::update_appointment_status))
        .route("/stats/monthly", get(handlers::get_monthly_stats))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
