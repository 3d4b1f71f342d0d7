use serde::{Deserialize, Serialize};

/// Claims carried by tokens issued by the clinic backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Numeric user id of the patient, doctor or admin, as a string.
    pub sub: String,
    pub role: Option<String>,
    pub email: Option<String>,
    pub exp: Option<u64>,
    pub iat: Option<u64>,
}
