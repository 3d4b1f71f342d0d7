use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The backend refused a write because it clashes with existing state,
    /// e.g. two sessions racing for the same slot.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rejected by backend: {0}")]
    Rejected(String),

    #[error("API error ({status}): {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid auth token: {0}")]
    InvalidToken(String),
}

impl BackendError {
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body);
        match status.as_u16() {
            401 | 403 => BackendError::Auth(message),
            404 => BackendError::NotFound(message),
            409 => BackendError::Conflict(message),
            400 | 422 => BackendError::Rejected(message),
            _ => BackendError::Status { status, body: message },
        }
    }
}

/// Error bodies arrive either as plain text or as `{"message": ...}` /
/// `{"error": ...}` objects.
fn extract_message(body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(serde_json::Value::String(msg)) = map.get(key) {
                return msg.clone();
            }
        }
    }
    body.trim().to_string()
}
