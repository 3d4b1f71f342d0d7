use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;

use shared_config::AppConfig;
use shared_models::session::Session;

pub struct TestConfig {
    pub jwt_secret: String,
    pub clinic_api_url: String,
    pub slot_windows: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            clinic_api_url: "http://localhost:8083/api".to_string(),
            slot_windows: "9-17".to_string(),
        }
    }
}

impl TestConfig {
    /// Point the config at a mock backend, e.g. a `wiremock::MockServer::uri()`.
    pub fn with_backend(url: &str) -> Self {
        Self {
            clinic_api_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            clinic_api_url: self.clinic_api_url.clone(),
            jwt_secret: self.jwt_secret.clone(),
            slot_windows: self.slot_windows.clone(),
            bind_addr: "127.0.0.1:0".to_string(),
            request_timeout_secs: 5,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: i64,
    pub role: String,
}

impl TestUser {
    pub fn new(id: i64, role: &str) -> Self {
        Self {
            id,
            role: role.to_string(),
        }
    }

    pub fn doctor(id: i64) -> Self {
        Self::new(id, "doctor")
    }

    pub fn patient(id: i64) -> Self {
        Self::new(id, "patient")
    }

    pub fn admin(id: i64) -> Self {
        Self::new(id, "admin")
    }

    pub fn to_session(&self, token: &str) -> Session {
        let token = token.to_string();
        match self.role.as_str() {
            "doctor" => Session::Doctor { id: self.id, token },
            "admin" => Session::Admin { id: self.id, token },
            "patient" => Session::Patient { id: self.id, token },
            _ => Session::Anonymous,
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id.to_string(),
            "email": format!("{}{}@clinic.test", user.role, user.id),
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// JSON shaped the way the clinic backend answers.
pub struct MockClinicResponses;

impl MockClinicResponses {
    pub fn doctor_response(id: i64, name: &str, specialization: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "specialization": specialization
        })
    }

    pub fn patient_response(id: i64) -> serde_json::Value {
        json!({
            "id": id,
            "firstName": "Test",
            "lastName": "Patient",
            "email": format!("patient{}@clinic.test", id),
            "phone": "0771234567",
            "address": "1 Main Street",
            "age": "34"
        })
    }

    pub fn appointment_response(id: i64, patient_id: i64, doctor_id: i64,
                                date: &str, time: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "date": date,
            "time": time,
            "status": status,
            "notes": null,
            "patient": Self::patient_response(patient_id),
            "doctor": Self::doctor_response(doctor_id, "Dr. Test", "General Practice")
        })
    }

    pub fn roster_response(id: i64, doctor_id: i64, date: &str, shift_status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "date": date,
            "shiftStatus": shift_status,
            "doctor": Self::doctor_response(doctor_id, "Dr. Test", "General Practice")
        })
    }

    pub fn error_response(message: &str) -> serde_json::Value {
        json!({
            "message": message
        })
    }
}
