//! API client for the lead backend
//!
//! One POST per submit. Nothing here retries: a failed attempt is reported to the caller,
//! which decides whether the lead still counts as delivered.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::idempotency;
use crate::leads::LeadTarget;

/// API base URL (can be overridden via environment variable)
const DEFAULT_API_URL: &str = "http://localhost:5000";

/// API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// The request never produced an HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }
}

/// Body returned by the backend on success. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

impl LeadResponse {
    /// Server-provided confirmation text, if it sent a non-blank one.
    pub fn confirmation(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

/// API client for lead submissions
#[derive(Debug, Clone)]
pub struct LeadClient {
    client: Client,
    base_url: String,
}

impl LeadClient {
    /// Create a client from the loaded configuration
    pub fn from_config(config: &Config) -> Self {
        let base_url = std::env::var("LEAD_DESK_API_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| config.api.base_url.clone());

        let verify_ssl =
            parse_bool_env("LEAD_DESK_API_VERIFY_SSL").unwrap_or(config.api.verify_ssl);

        Self::with_settings(base_url, config.api.timeout_seconds, verify_ssl)
    }

    /// Create with custom base URL
    #[cfg(test)]
    pub fn with_url(base_url: impl Into<String>) -> Self {
        Self::with_settings(base_url.into(), None, true)
    }

    fn with_settings(base_url: String, timeout_seconds: Option<u64>, verify_ssl: bool) -> Self {
        let mut builder = Client::builder().danger_accept_invalid_certs(!verify_ssl);
        // Without an explicit timeout the transport's own defaults apply.
        if let Some(seconds) = timeout_seconds.filter(|seconds| *seconds > 0) {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder.build().unwrap_or_else(|_| Client::new());

        LeadClient {
            client,
            base_url: normalize_base_url(&base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, target: LeadTarget) -> String {
        format!("{}{}", self.base_url, target.path())
    }

    /// Submit a validated lead record
    pub async fn submit<T: Serialize + ?Sized>(
        &self,
        target: LeadTarget,
        payload: &T,
    ) -> Result<LeadResponse, ApiError> {
        let key = idempotency::new_lead_key(target);
        self.submit_with_idempotency_key(target, payload, &key).await
    }

    pub async fn submit_with_idempotency_key<T: Serialize + ?Sized>(
        &self,
        target: LeadTarget,
        payload: &T,
        idempotency_key: &str,
    ) -> Result<LeadResponse, ApiError> {
        let url = self.endpoint(target);
        tracing::debug!(form = target.as_str(), %url, "posting lead");

        let response = self
            .client
            .post(&url)
            .header("Idempotency-Key", idempotency_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                body
            };
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        parse_success_body(&body)
    }
}

fn parse_success_body(body: &str) -> Result<LeadResponse, ApiError> {
    if body.trim().is_empty() {
        return Ok(LeadResponse::default());
    }
    serde_json::from_str(body).map_err(|err| ApiError::InvalidResponse(err.to_string()))
}

fn normalize_base_url(base_url: &str) -> String {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return DEFAULT_API_URL.to_string();
    }
    trimmed.trim_end_matches('/').to_string()
}

fn parse_bool_env(key: &str) -> Option<bool> {
    let value = std::env::var(key).ok()?;
    parse_bool_value(&value)
}

fn parse_bool_value(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
pub mod test_support {
    use std::net::SocketAddr;

    use axum::Router;
    use tokio::net::TcpListener;

    pub async fn spawn_server(app: Router) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (addr, handle)
    }

    /// An address nothing is listening on.
    pub async fn closed_addr() -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{closed_addr, spawn_server};
    use super::*;
    use crate::leads::fixtures::{contact_draft, kundli_draft};
    use crate::leads::LeadDraft;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::Value;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_custom_url() {
        let client = LeadClient::with_url("https://leads.example.com/");
        assert_eq!(client.base_url(), "https://leads.example.com");
        assert_eq!(
            client.endpoint(LeadTarget::Kundli),
            "https://leads.example.com/api/kundli"
        );
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("https://api.example.com/"),
            "https://api.example.com"
        );
        assert_eq!(normalize_base_url("  "), DEFAULT_API_URL);
    }

    #[test]
    fn test_parse_bool_variants() {
        assert_eq!(parse_bool_value("true"), Some(true));
        assert_eq!(parse_bool_value("1"), Some(true));
        assert_eq!(parse_bool_value("no"), Some(false));
        assert_eq!(parse_bool_value("maybe"), None);
    }

    #[test]
    fn test_success_body_parsing() {
        assert_eq!(parse_success_body("").unwrap(), LeadResponse::default());
        let parsed = parse_success_body(r#"{"message":"Thanks!"}"#).unwrap();
        assert_eq!(parsed.confirmation(), Some("Thanks!"));
        assert!(matches!(
            parse_success_body("<html>ok</html>"),
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn contact_post_returns_server_message() {
        let seen: Arc<Mutex<Vec<(Value, Option<String>)>>> = Arc::default();
        let seen_in_handler = Arc::clone(&seen);
        let backend = Router::new().route(
            "/api/contact",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let seen = Arc::clone(&seen_in_handler);
                async move {
                    let key = headers
                        .get("Idempotency-Key")
                        .and_then(|value| value.to_str().ok())
                        .map(ToOwned::to_owned);
                    seen.lock().unwrap().push((body, key));
                    (
                        StatusCode::OK,
                        Json(serde_json::json!({ "success": true, "message": "Thanks!" })),
                    )
                }
            }),
        );
        let (addr, handle) = spawn_server(backend).await;

        let client = LeadClient::with_url(format!("http://{addr}"));
        let submission = contact_draft().accept().unwrap();
        let response = client
            .submit(LeadTarget::Contact, &submission)
            .await
            .unwrap();
        assert_eq!(response.confirmation(), Some("Thanks!"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0["name"], "A Kumar");
        assert_eq!(seen[0].0["service"], "hardware");
        assert!(seen[0]
            .1
            .as_deref()
            .unwrap_or_default()
            .starts_with("lead-desk-contact-"));

        handle.abort();
    }

    #[tokio::test]
    async fn server_error_is_reported_with_status() {
        let backend = Router::new().route(
            "/api/contact",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let (addr, handle) = spawn_server(backend).await;

        let client = LeadClient::with_url(format!("http://{addr}"));
        let submission = contact_draft().accept().unwrap();
        let err = client
            .submit(LeadTarget::Contact, &submission)
            .await
            .unwrap_err();
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }

        handle.abort();
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let addr = closed_addr().await;
        let client = LeadClient::with_url(format!("http://{addr}"));
        let submission = kundli_draft().accept().unwrap();
        let err = client
            .submit(LeadTarget::Kundli, &submission)
            .await
            .unwrap_err();
        assert!(err.is_transport(), "expected transport error, got {err}");
    }
}
