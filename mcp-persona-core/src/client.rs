//! PersonaApi: thin async client for the persona REST API.
//!
//! Every method performs exactly one HTTP request and hands back the JSON
//! body untouched. No caching, no retries.

use crate::config::ApiConfig;
use crate::error::ApiError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct PersonaApi {
    http: reqwest::Client,
    base_url: String,
}

impl PersonaApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(ref token) = config.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::Config(format!("invalid auth token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list_personas(
        &self,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<Value, ApiError> {
        let query = present_params([
            ("page", page.map(|p| p.to_string())),
            ("per_page", per_page.map(|p| p.to_string())),
        ]);
        self.send(self.http.get(self.url("/personas")).query(&query))
            .await
    }

    pub async fn get_persona(&self, id: u64) -> Result<Value, ApiError> {
        self.send(self.http.get(self.url(&format!("/personas/{}", id))))
            .await
    }

    pub async fn create_persona<T: Serialize + ?Sized>(&self, body: &T) -> Result<Value, ApiError> {
        self.send(self.http.post(self.url("/personas")).json(body))
            .await
    }

    pub async fn update_persona<T: Serialize + ?Sized>(
        &self,
        id: u64,
        body: &T,
    ) -> Result<Value, ApiError> {
        self.send(self.http.put(self.url(&format!("/personas/{}", id))).json(body))
            .await
    }

    pub async fn delete_persona(&self, id: u64) -> Result<Value, ApiError> {
        self.send(self.http.delete(self.url(&format!("/personas/{}", id))))
            .await
    }

    pub async fn field_config(
        &self,
        category: Option<&str>,
        field: Option<&str>,
    ) -> Result<Value, ApiError> {
        let query = present_params([
            ("category", category.map(str::to_string)),
            ("field", field.map(str::to_string)),
        ]);
        self.send(self.http.get(self.url("/field-config")).query(&query))
            .await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = error_message(status, &body);
            tracing::debug!(status = status.as_u16(), path = %url, message = %message, "API request failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(status = status.as_u16(), path = %url, "API request succeeded");

        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Keep only the parameters the caller actually supplied.
fn present_params<const N: usize>(
    params: [(&'static str, Option<String>); N],
) -> Vec<(&'static str, String)> {
    params
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
}

/// Best available message for a failed response: the body's `error` field,
/// then its `message` field, then the status line.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    let remote = serde_json::from_slice::<Value>(body).ok().and_then(|value| {
        ["error", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
    });

    remote.unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()))
}
