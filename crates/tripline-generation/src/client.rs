// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the generation service.
//!
//! Handles request construction, authentication, and transient error retry.
//! The per-call deadline belongs to the conversation service; this client
//! only bounds the raw HTTP transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use tripline_config::model::GenerationConfig;
use tripline_core::types::SessionContext;
use tripline_core::{Adapter, AdapterType, GenerationAdapter, HealthStatus, TriplineError};

use crate::types::{ApiErrorResponse, GenerateRequest, GenerateResponse};

/// HTTP adapter for the generation collaborator.
///
/// Retries once on transient statuses (429, 500, 503); anything else is
/// surfaced to the caller as a [`TriplineError::Generation`].
#[derive(Debug, Clone)]
pub struct HttpGeneration {
    client: reqwest::Client,
    base_url: String,
    model: String,
    max_retries: u32,
}

impl HttpGeneration {
    /// Creates a new generation client from configuration.
    pub fn new(config: &GenerationConfig) -> Result<Self, TriplineError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.api_key {
            headers.insert(
                "authorization",
                HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                    TriplineError::Config(format!("invalid generation API key: {e}"))
                })?,
            );
        }
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TriplineError::Generation {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_retries: 1,
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    async fn post_generate(&self, request: &GenerateRequest) -> Result<String, TriplineError> {
        let url = format!("{}/generate", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying generation request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(request)
                .send()
                .await
                .map_err(|e| TriplineError::Generation {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "generation response received");

            if status.is_success() {
                let body: GenerateResponse =
                    response.json().await.map_err(|e| TriplineError::Generation {
                        message: format!("malformed generation response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return Ok(body.reply);
            }

            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "generation API error ({}): {}",
                    api_err.error.type_, api_err.error.message
                )
            } else {
                format!("generation API returned {status}: {body}")
            };

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, "transient generation error, will retry");
                last_error = Some(TriplineError::Generation {
                    message,
                    source: None,
                });
                continue;
            }

            return Err(TriplineError::Generation {
                message,
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| TriplineError::Generation {
            message: "generation retries exhausted".to_string(),
            source: None,
        }))
    }
}

/// Whether an HTTP status is worth one retry.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[async_trait]
impl Adapter for HttpGeneration {
    fn name(&self) -> &str {
        "http-generation"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, TriplineError> {
        // The service exposes no health endpoint; report configured-and-ready.
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl GenerationAdapter for HttpGeneration {
    async fn generate(
        &self,
        context: &SessionContext,
        traveler_text: &str,
    ) -> Result<String, TriplineError> {
        let request = GenerateRequest {
            model: self.model.clone(),
            trip_name: context.trip_name.clone(),
            instructions: context.behavior_notes.clone(),
            transcript: context.transcript.clone(),
            message: traveler_text.to_string(),
        };
        self.post_generate(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(base_url: &str) -> HttpGeneration {
        let config = GenerationConfig {
            base_url: base_url.to_string(),
            api_key: Some("test-key".to_string()),
            model: "travel-concierge-1".to_string(),
            timeout_secs: 5,
        };
        HttpGeneration::new(&config).unwrap()
    }

    fn make_context() -> SessionContext {
        SessionContext {
            trip_name: "Alps 2026".to_string(),
            behavior_notes: Some("be brief".to_string()),
            transcript: vec![],
        }
    }

    #[tokio::test]
    async fn successful_generation_returns_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .and(body_partial_json(json!({
                "trip_name": "Alps 2026",
                "instructions": "be brief",
                "message": "hello"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "hi!"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        let reply = client.generate(&make_context(), "hello").await.unwrap();
        assert_eq!(reply, "hi!");
    }

    #[tokio::test]
    async fn transient_error_is_retried_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "late hi"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        let reply = client.generate(&make_context(), "hello").await.unwrap();
        assert_eq!(reply, "late hi");
    }

    #[tokio::test]
    async fn non_transient_error_fails_fast() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"type": "invalid_request", "message": "bad transcript"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        let err = client.generate(&make_context(), "hello").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("invalid_request"), "got: {message}");
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        assert!(client.generate(&make_context(), "hello").await.is_err());
    }
}
