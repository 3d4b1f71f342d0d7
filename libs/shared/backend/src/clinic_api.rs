use std::time::Duration;

use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::error::BackendError;

/// Thin JSON client for the clinic REST backend.
pub struct ClinicApiClient {
    client: Client,
    base_url: String,
}

impl ClinicApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.clinic_api_url.trim_end_matches('/').to_string(),
        })
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap, BackendError> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| BackendError::InvalidToken(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T, BackendError>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let headers = self.get_headers(auth_token)?;

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("API error ({}): {}", status, text);
            return Err(BackendError::from_status(status, &text));
        }

        // Some writes answer with an empty body.
        let payload = if text.trim().is_empty() { "null" } else { text.as_str() };
        Ok(serde_json::from_str(payload)?)
    }

    pub async fn get<T>(&self, path: &str, auth_token: Option<&str>) -> Result<T, BackendError>
    where T: DeserializeOwned {
        self.request(Method::GET, path, auth_token, None).await
    }

    pub async fn post<T>(&self, path: &str, auth_token: Option<&str>, body: Value) -> Result<T, BackendError>
    where T: DeserializeOwned {
        self.request(Method::POST, path, auth_token, Some(body)).await
    }

    pub async fn put<T>(&self, path: &str, auth_token: Option<&str>, body: Option<Value>) -> Result<T, BackendError>
    where T: DeserializeOwned {
        self.request(Method::PUT, path, auth_token, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ClinicApiClient {
        let config = AppConfig {
            clinic_api_url: format!("{}/", server.uri()),
            ..AppConfig::default()
        };
        ClinicApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_get_attaches_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doctors"))
            .and(header("Authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let doctors: Vec<Value> = client.get("/doctors", Some("abc")).await.unwrap();
        // Base URL was configured with a trailing slash.
        assert_eq!(doctors.len(), 1);
    }

    #[tokio::test]
    async fn test_post_maps_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/appointments"))
            .and(body_json(json!({"doctorId": 5})))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "Slot already booked"})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result: Result<Value, _> = client.post("/appointments", None, json!({"doctorId": 5})).await;
        assert_matches!(result, Err(BackendError::Conflict(msg)) if msg == "Slot already booked");
    }

    #[tokio::test]
    async fn test_empty_body_decodes_as_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/appointments"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let created: Option<Value> = client.post("/appointments", None, json!({})).await.unwrap();
        assert!(created.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appointments"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result: Result<Vec<Value>, _> = client.get("/appointments", None).await;
        assert_matches!(result, Err(BackendError::Decode(_)));
    }

    #[tokio::test]
    async fn test_put_keeps_query_string() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/appointments/11/status"))
            .and(query_param("status", "CANCELLED"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 11, "status": "CANCELLED"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let updated: Value = client
            .put("/appointments/11/status?status=CANCELLED", Some("abc"), None)
            .await
            .unwrap();
        assert_eq!(updated["status"], "CANCELLED");
    }

    #[tokio::test]
    async fn test_put_maps_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/appointments/11/status"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid status"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result: Result<Value, _> = client.put("/appointments/11/status?status=X", None, None).await;
        assert_matches!(result, Err(BackendError::Rejected(msg)) if msg == "Invalid status");
    }
}
