use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
    body::Body,
};
use tracing::debug;

use shared_models::error::AppError;
use shared_models::session::{Session, StoredSessions};
use shared_config::AppConfig;

use crate::jwt::validate_token;

/// Header carrying a UI client's stored session blobs as JSON, e.g.
/// `{"doctor": "{\"id\":5,\"token\":\"...\"}"}`.
pub const STORED_SESSION_HEADER: &str = "X-Clinic-Session";

/// Validates the caller's token and stores the resolved [`Session`] in the
/// request extensions. The token comes from the bearer header or, failing
/// that, from the winning blob of the stored session header.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = match request.headers().get("Authorization") {
        Some(auth_header) => bearer_token(auth_header)?,
        None => stored_session_token(request.headers().get(STORED_SESSION_HEADER))?,
    };

    let claims = validate_token(&token, &config.jwt_secret)
        .map_err(AppError::Auth)?;

    let session = Session::from_claims(&claims, &token)
        .map_err(|e| AppError::Auth(e.to_string()))?;

    debug!("Resolved {:?}", session);
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

fn bearer_token(auth_header: &HeaderValue) -> Result<String, AppError> {
    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    auth_value
        .strip_prefix("Bearer ")
        .map(str::to_string)
        .ok_or_else(|| AppError::Auth("Invalid authorization header format".to_string()))
}

fn stored_session_token(header: Option<&HeaderValue>) -> Result<String, AppError> {
    let raw = header
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Auth("Invalid stored session header".to_string()))?;

    let stored: StoredSessions = serde_json::from_str(raw)
        .map_err(|e| AppError::Auth(format!("Invalid stored session header: {}", e)))?;

    let session = Session::from_stored(&stored)
        .map_err(|e| AppError::Auth(e.to_string()))?;

    session.token()
        .map(str::to_string)
        .ok_or_else(|| AppError::Auth("Stored session has no token".to_string()))
}
