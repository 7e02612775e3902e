// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock messaging gateway for deterministic testing.
//!
//! Captures every send for assertions and can be scripted to fail the next
//! N calls, standing in for a flaky carrier.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tripline_core::types::{DeliveryId, MessageContent};
use tripline_core::{Adapter, AdapterType, HealthStatus, MessagingGateway, TriplineError};

/// One captured gateway call.
#[derive(Debug, Clone, PartialEq)]
pub struct SentRecord {
    pub recipient: String,
    pub content: MessageContent,
    pub variables: serde_json::Value,
}

/// A mock messaging gateway that records deliveries.
pub struct MockGateway {
    sent: Arc<Mutex<Vec<SentRecord>>>,
    fail_next: Arc<Mutex<u32>>,
    counter: Arc<Mutex<u64>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_next: Arc::new(Mutex::new(0)),
            counter: Arc::new(Mutex::new(0)),
        }
    }

    /// Fail the next `n` send calls with a scripted gateway error.
    pub fn failing_next(n: u32) -> Self {
        Self {
            fail_next: Arc::new(Mutex::new(n)),
            ..Self::new()
        }
    }

    /// Successfully captured sends, in order.
    pub async fn sent(&self) -> Vec<SentRecord> {
        self.sent.lock().await.clone()
    }

    /// Script `n` additional failures.
    pub async fn fail_next(&self, n: u32) {
        *self.fail_next.lock().await += n;
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MockGateway {
    fn name(&self) -> &str {
        "mock-gateway"
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
impl MessagingGateway for MockGateway {
    async fn send(
        &self,
        recipient: &str,
        content: &MessageContent,
        variables: &serde_json::Value,
    ) -> Result<DeliveryId, TriplineError> {
        {
            let mut remaining = self.fail_next.lock().await;
            if *remaining > 0 {
                *remaining -= 1;
                return Err(TriplineError::Gateway {
                    message: "scripted gateway failure".to_string(),
                    source: None,
                });
            }
        }

        self.sent.lock().await.push(SentRecord {
            recipient: recipient.to_string(),
            content: content.clone(),
            variables: variables.clone(),
        });

        let mut counter = self.counter.lock().await;
        *counter += 1;
        Ok(DeliveryId(format!("mock-dlv-{counter}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn sends_are_captured_in_order() {
        let gateway = MockGateway::new();
        gateway
            .send("+31611111111", &MessageContent::Body("a".to_string()), &json!({}))
            .await
            .unwrap();
        gateway
            .send("+31622222222", &MessageContent::Body("b".to_string()), &json!({}))
            .await
            .unwrap();

        let sent = gateway.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].recipient, "+31611111111");
        assert_eq!(sent[1].recipient, "+31622222222");
    }

    #[tokio::test]
    async fn scripted_failures_run_out() {
        let gateway = MockGateway::failing_next(2);
        let content = MessageContent::Body("x".to_string());

        assert!(gateway.send("+316", &content, &json!({})).await.is_err());
        assert!(gateway.send("+316", &content, &json!({})).await.is_err());
        assert!(gateway.send("+316", &content, &json!({})).await.is_ok());

        // Failed attempts are not captured as sends.
        assert_eq!(gateway.sent().await.len(), 1);
    }
}
