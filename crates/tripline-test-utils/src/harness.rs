// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness wiring the full engine against temp SQLite and mock
//! collaborators.
//!
//! Each harness owns an isolated database in a temp directory, so tests are
//! independent and order-insensitive.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use uuid::Uuid;

use tripline_config::model::StorageConfig;
use tripline_core::types::{Participant, Trip};
use tripline_core::{StorageAdapter, TriplineError};
use tripline_engine::{
    ConversationService, IntakeGate, ParticipantFanout, Scheduler, SessionResolver,
};
use tripline_engine::identity::web_address;
use tripline_storage::SqliteStorage;

use crate::mock_gateway::MockGateway;
use crate::mock_generation::MockGeneration;

const TEST_COUNTRY_CODE: &str = "31";
const TEST_BASE_URL: &str = "https://trips.test/t";
const TEST_TIMEZONE: &str = "Europe/Amsterdam";

/// Fully wired engine over temp SQLite and mocks.
pub struct TestHarness {
    pub storage: Arc<SqliteStorage>,
    pub generation: Arc<MockGeneration>,
    pub gateway: Arc<MockGateway>,
    pub resolver: Arc<SessionResolver>,
    pub intake: Arc<IntakeGate>,
    pub conversation: Arc<ConversationService>,
    pub fanout: ParticipantFanout,
    pub scheduler: Arc<Scheduler>,
    _dir: TempDir,
}

/// Builder for [`TestHarness`].
#[derive(Default)]
pub struct TestHarnessBuilder {
    generation_replies: Vec<String>,
    generation_failure: Option<String>,
    generation_delay: Option<Duration>,
    generation_timeout: Option<Duration>,
    gateway_failures: u32,
}

impl TestHarnessBuilder {
    /// Pre-load generation replies, returned in order.
    pub fn with_generation_responses(mut self, replies: Vec<String>) -> Self {
        self.generation_replies = replies;
        self
    }

    /// Every generation call fails with this message.
    pub fn with_generation_failure(mut self, message: &str) -> Self {
        self.generation_failure = Some(message.to_string());
        self
    }

    /// Generation sleeps this long before answering.
    pub fn with_generation_delay(mut self, delay: Duration) -> Self {
        self.generation_delay = Some(delay);
        self
    }

    /// Conversation-side deadline on generation calls.
    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = Some(timeout);
        self
    }

    /// The gateway fails the first `n` send calls.
    pub fn with_gateway_failures(mut self, n: u32) -> Self {
        self.gateway_failures = n;
        self
    }

    pub async fn build(self) -> Result<TestHarness, TriplineError> {
        let dir = tempfile::tempdir().map_err(|e| TriplineError::Storage {
            source: Box::new(e),
        })?;
        let db_path = dir.path().join("harness.db");

        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: db_path.display().to_string(),
            wal_mode: true,
        }));
        storage.initialize().await?;

        let generation = {
            let mut mock = match &self.generation_failure {
                Some(message) => MockGeneration::failing(message),
                None => MockGeneration::with_replies(self.generation_replies.clone()),
            };
            if let Some(delay) = self.generation_delay {
                mock = mock.with_delay(delay);
            }
            Arc::new(mock)
        };
        let gateway = Arc::new(MockGateway::failing_next(self.gateway_failures));

        let storage_dyn: Arc<dyn StorageAdapter> = storage.clone();
        let resolver = Arc::new(SessionResolver::new(
            storage_dyn.clone(),
            TEST_COUNTRY_CODE.to_string(),
        ));
        let fanout = ParticipantFanout::new(
            storage_dyn.clone(),
            TEST_COUNTRY_CODE.to_string(),
            TEST_BASE_URL.to_string(),
            3,
        );
        let intake = Arc::new(IntakeGate::new(storage_dyn.clone(), fanout.clone()));
        let conversation = Arc::new(ConversationService::new(
            storage_dyn.clone(),
            generation.clone(),
            self.generation_timeout.unwrap_or(Duration::from_secs(5)),
            50,
        ));
        let scheduler = Arc::new(Scheduler::new(
            storage_dyn,
            gateway.clone(),
            100,
            Duration::from_secs(300),
        ));

        Ok(TestHarness {
            storage,
            generation,
            gateway,
            resolver,
            intake,
            conversation,
            fanout,
            scheduler,
            _dir: dir,
        })
    }
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::default()
    }

    /// Create a trip in the harness's default timezone with a fresh share
    /// token.
    pub async fn create_trip(&self, name: &str) -> Result<Trip, TriplineError> {
        self.create_trip_inner(name, None).await
    }

    /// Create a trip carrying behavior instructions for the collaborator.
    pub async fn create_trip_with_notes(
        &self,
        name: &str,
        notes: &str,
    ) -> Result<Trip, TriplineError> {
        self.create_trip_inner(name, Some(notes.to_string())).await
    }

    async fn create_trip_inner(
        &self,
        name: &str,
        behavior_notes: Option<String>,
    ) -> Result<Trip, TriplineError> {
        let trip = Trip {
            id: Uuid::new_v4().to_string(),
            tenant_id: "tenant-test".to_string(),
            name: name.to_string(),
            share_token: Uuid::new_v4().to_string(),
            profile_template: None,
            behavior_notes,
            itinerary_ref: None,
            timezone: TEST_TIMEZONE.to_string(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        self.storage.create_trip(&trip).await?;
        Ok(trip)
    }

    /// Register a participant on a trip.
    pub async fn add_participant(
        &self,
        trip: &Trip,
        name: &str,
        phone: &str,
    ) -> Result<Participant, TriplineError> {
        let participant = Participant {
            id: Uuid::new_v4().to_string(),
            trip_id: trip.id.clone(),
            phone: phone.to_string(),
            display_name: name.to_string(),
            is_primary: false,
            created_at: String::new(),
        };
        self.storage.add_participant(&participant).await?;
        Ok(participant)
    }

    /// Resolve the trip's web channel and return the session token.
    pub async fn open_web_session(&self, trip: &Trip) -> Result<String, TriplineError> {
        let resolution = self
            .resolver
            .resolve(&trip.id, &web_address(&trip.share_token))
            .await?;
        Ok(resolution.session_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_builds_and_creates_trips() {
        let harness = TestHarness::builder().build().await.unwrap();
        let trip = harness.create_trip("Smoke Test").await.unwrap();

        let stored = harness.storage.get_trip(&trip.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Smoke Test");

        let token = harness.open_web_session(&trip).await.unwrap();
        assert!(harness.storage.get_session(&token).await.unwrap().is_some());
    }
}
