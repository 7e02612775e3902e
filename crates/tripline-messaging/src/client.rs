// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the messaging gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;

use tripline_config::model::GatewayConfig;
use tripline_core::types::{DeliveryId, MessageContent};
use tripline_core::{Adapter, AdapterType, HealthStatus, MessagingGateway, TriplineError};

use crate::types::{GatewayErrorResponse, SendRequest, SendResponse};

/// HTTP adapter for the outbound messaging gateway.
///
/// No internal retry: the scheduler claims a job before calling this
/// client, and a failure is recorded against the job for a later pass.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    sender_id: String,
}

impl HttpGateway {
    /// Creates a new gateway client from configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, TriplineError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.api_token {
            headers.insert(
                "authorization",
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                    TriplineError::Config(format!("invalid gateway API token: {e}"))
                })?,
            );
        }
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TriplineError::Gateway {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            sender_id: config.sender_id.clone(),
        })
    }

    /// Overrides the base URL (for testing with wiremock).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl Adapter for HttpGateway {
    fn name(&self) -> &str {
        "http-gateway"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Gateway
    }

    async fn health_check(&self) -> Result<HealthStatus, TriplineError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl MessagingGateway for HttpGateway {
    async fn send(
        &self,
        recipient: &str,
        content: &MessageContent,
        variables: &serde_json::Value,
    ) -> Result<DeliveryId, TriplineError> {
        let (body, template) = match content {
            MessageContent::Body(body) => (Some(body.clone()), None),
            MessageContent::Template(template) => (None, Some(template.clone())),
        };
        let request = SendRequest {
            to: recipient.to_string(),
            from: self.sender_id.clone(),
            body,
            template,
            variables: variables.clone(),
        };

        let url = format!("{}/messages", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TriplineError::Gateway {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, recipient, "gateway response received");

        if status.is_success() {
            let body: SendResponse =
                response.json().await.map_err(|e| TriplineError::Gateway {
                    message: format!("malformed gateway response: {e}"),
                    source: Some(Box::new(e)),
                })?;
            return Ok(DeliveryId(body.delivery_id));
        }

        let body = response.text().await.unwrap_or_default();
        let message = if let Ok(api_err) = serde_json::from_str::<GatewayErrorResponse>(&body) {
            format!(
                "gateway error ({}): {}",
                api_err.error.code, api_err.error.message
            )
        } else {
            format!("gateway returned {status}: {body}")
        };
        Err(TriplineError::Gateway {
            message,
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_client(base_url: &str) -> HttpGateway {
        let config = GatewayConfig {
            base_url: base_url.to_string(),
            api_token: Some("test-token".to_string()),
            sender_id: "tripline".to_string(),
            timeout_secs: 5,
        };
        HttpGateway::new(&config).unwrap()
    }

    #[tokio::test]
    async fn template_send_returns_delivery_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(body_partial_json(json!({
                "to": "+31611111111",
                "from": "tripline",
                "template": "intake_completed",
                "variables": {"trip_name": "Alps 2026"}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"delivery_id": "dlv-1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        let delivery = client
            .send(
                "+31611111111",
                &MessageContent::Template("intake_completed".to_string()),
                &json!({"trip_name": "Alps 2026"}),
            )
            .await
            .unwrap();
        assert_eq!(delivery, DeliveryId("dlv-1".to_string()));
    }

    #[tokio::test]
    async fn body_send_omits_template_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(body_partial_json(json!({"body": "time to pack"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"delivery_id": "dlv-2"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        let delivery = client
            .send(
                "+31611111111",
                &MessageContent::Body("time to pack".to_string()),
                &json!({}),
            )
            .await
            .unwrap();
        assert_eq!(delivery.0, "dlv-2");
    }

    #[tokio::test]
    async fn gateway_failure_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(503).set_body_json(json!({
                "error": {"code": "downstream_unavailable", "message": "carrier down"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server.uri());
        let err = client
            .send(
                "+31611111111",
                &MessageContent::Body("x".to_string()),
                &json!({}),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("downstream_unavailable"));
        // expect(1) verifies no second POST was attempted.
    }
}
