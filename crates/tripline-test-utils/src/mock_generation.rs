// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation collaborator for deterministic testing.
//!
//! Replies are popped from a FIFO queue; an empty queue yields a default
//! reply. A scripted failure message or an artificial delay can stand in
//! for a broken or slow collaborator.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tripline_core::types::SessionContext;
use tripline_core::{Adapter, AdapterType, GenerationAdapter, HealthStatus, TriplineError};

/// A mock generation collaborator with pre-configured replies.
pub struct MockGeneration {
    replies: Arc<Mutex<VecDeque<String>>>,
    failure: Option<String>,
    delay: Option<Duration>,
    seen: Arc<Mutex<Vec<SessionContext>>>,
}

impl MockGeneration {
    /// Create a mock with an empty reply queue.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            failure: None,
            delay: None,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock pre-loaded with the given replies.
    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            ..Self::new()
        }
    }

    /// Every call fails with the given message.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new()
        }
    }

    /// Sleep this long before answering (for timeout tests).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add a reply to the end of the queue.
    pub async fn add_reply(&self, text: String) {
        self.replies.lock().await.push_back(text);
    }

    /// Contexts this mock has been called with, in order.
    pub async fn seen_contexts(&self) -> Vec<SessionContext> {
        self.seen.lock().await.clone()
    }

    async fn next_reply(&self) -> String {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock reply".to_string())
    }
}

impl Default for MockGeneration {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for MockGeneration {
    fn name(&self) -> &str {
        "mock-generation"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, TriplineError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl GenerationAdapter for MockGeneration {
    async fn generate(
        &self,
        context: &SessionContext,
        _traveler_text: &str,
    ) -> Result<String, TriplineError> {
        self.seen.lock().await.push(context.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(TriplineError::Generation {
                message: message.clone(),
                source: None,
            });
        }
        Ok(self.next_reply().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> SessionContext {
        SessionContext {
            trip_name: "Test".to_string(),
            behavior_notes: None,
            transcript: vec![],
        }
    }

    #[tokio::test]
    async fn replies_come_back_in_order_then_default() {
        let mock = MockGeneration::with_replies(vec!["first".to_string(), "second".to_string()]);
        assert_eq!(mock.generate(&context(), "x").await.unwrap(), "first");
        assert_eq!(mock.generate(&context(), "x").await.unwrap(), "second");
        assert_eq!(mock.generate(&context(), "x").await.unwrap(), "mock reply");
    }

    #[tokio::test]
    async fn failing_mock_always_errors() {
        let mock = MockGeneration::failing("boom");
        let err = mock.generate(&context(), "x").await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn contexts_are_recorded() {
        let mock = MockGeneration::new();
        mock.generate(&context(), "x").await.unwrap();
        let seen = mock.seen_contexts().await;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].trip_name, "Test");
    }
}
