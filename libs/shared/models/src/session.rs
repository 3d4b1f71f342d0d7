use std::fmt;

use serde::Deserialize;
use thiserror::Error;

use crate::auth::JwtClaims;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    #[error("Stored {role} session is malformed: {reason}")]
    MalformedBlob { role: &'static str, reason: String },
}

/// Who is calling, resolved once at the request boundary and passed down
/// explicitly to everything that needs it.
#[derive(Clone, PartialEq, Eq)]
pub enum Session {
    Patient { id: i64, token: String },
    Doctor { id: i64, token: String },
    Admin { id: i64, token: String },
    Anonymous,
}

impl Session {
    pub fn from_claims(claims: &JwtClaims, token: &str) -> Result<Self, SessionError> {
        let role = claims.role.as_deref().unwrap_or_default().to_ascii_lowercase();
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| SessionError::InvalidUserId(claims.sub.clone()))?;
        let token = token.to_string();

        match role.as_str() {
            "patient" => Ok(Session::Patient { id, token }),
            "doctor" => Ok(Session::Doctor { id, token }),
            "admin" => Ok(Session::Admin { id, token }),
            other => Err(SessionError::UnknownRole(other.to_string())),
        }
    }

    /// Resolve from stored session blobs. A present doctor blob wins over an
    /// admin blob, which wins over a patient blob. A winning blob without a
    /// token yields `Anonymous`.
    pub fn from_stored(stored: &StoredSessions) -> Result<Self, SessionError> {
        if let Some(blob) = stored.doctor.as_deref() {
            return parse_blob(blob, "doctor").map(|parsed| {
                parsed.map_or(Session::Anonymous, |(id, token)| Session::Doctor { id, token })
            });
        }
        if let Some(blob) = stored.admin.as_deref() {
            return parse_blob(blob, "admin").map(|parsed| {
                parsed.map_or(Session::Anonymous, |(id, token)| Session::Admin { id, token })
            });
        }
        if let Some(blob) = stored.patient.as_deref() {
            return parse_blob(blob, "patient").map(|parsed| {
                parsed.map_or(Session::Anonymous, |(id, token)| Session::Patient { id, token })
            });
        }
        Ok(Session::Anonymous)
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Patient { token, .. } | Session::Doctor { token, .. } | Session::Admin { token, .. } => {
                Some(token.as_str())
            }
            Session::Anonymous => None,
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        match self {
            Session::Patient { id, .. } | Session::Doctor { id, .. } | Session::Admin { id, .. } => Some(*id),
            Session::Anonymous => None,
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Session::Patient { .. } => "patient",
            Session::Doctor { .. } => "doctor",
            Session::Admin { .. } => "admin",
            Session::Anonymous => "anonymous",
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Session::Doctor { .. } | Session::Admin { .. })
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.user_id() {
            Some(id) => write!(f, "Session::{}({})", self.role(), id),
            None => write!(f, "Session::anonymous"),
        }
    }
}

/// Raw session blobs as persisted by a UI client, one per role.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoredSessions {
    pub patient: Option<String>,
    pub doctor: Option<String>,
    pub admin: Option<String>,
}

#[derive(Deserialize)]
struct StoredBlob {
    id: Option<i64>,
    token: Option<String>,
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
}

fn parse_blob(raw: &str, role: &'static str) -> Result<Option<(i64, String)>, SessionError> {
    let blob: StoredBlob = serde_json::from_str(raw).map_err(|e| SessionError::MalformedBlob {
        role,
        reason: e.to_string(),
    })?;

    let Some(token) = blob.token.or(blob.access_token).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    let id = blob.id.ok_or_else(|| SessionError::MalformedBlob {
        role,
        reason: "missing id".to_string(),
    })?;

    Ok(Some((id, token)))
}
