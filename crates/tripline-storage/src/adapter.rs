// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use tripline_config::model::StorageConfig;
use tripline_core::traits::{IntakeTransition, SessionUpsert};
use tripline_core::types::{
    ConversationMessage, Intake, JobStatus, Participant, ScheduledMessage, ScheduledMessageDraft,
    Session, Trip,
};
use tripline_core::{Adapter, AdapterType, HealthStatus, StorageAdapter, TriplineError};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`]
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, TriplineError> {
        self.db.get().ok_or_else(|| TriplineError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl Adapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TriplineError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), TriplineError> {
        let path = self.config.database_path.clone();
        let db = Database::open(&path).await?;
        self.db.set(db).map_err(|_| TriplineError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), TriplineError> {
        let db = self.db()?;
        db.close().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Trip operations ---

    async fn create_trip(&self, trip: &Trip) -> Result<(), TriplineError> {
        queries::trips::create_trip(self.db()?, trip).await
    }

    async fn get_trip(&self, id: &str) -> Result<Option<Trip>, TriplineError> {
        queries::trips::get_trip(self.db()?, id).await
    }

    async fn get_trip_by_share_token(&self, token: &str) -> Result<Option<Trip>, TriplineError> {
        queries::trips::get_trip_by_share_token(self.db()?, token).await
    }

    async fn update_trip_content(
        &self,
        id: &str,
        profile_template: Option<&str>,
        behavior_notes: Option<&str>,
        itinerary_ref: Option<&str>,
    ) -> Result<(), TriplineError> {
        queries::trips::update_trip_content(
            self.db()?,
            id,
            profile_template,
            behavior_notes,
            itinerary_ref,
        )
        .await
    }

    // --- Session + intake operations ---

    async fn upsert_session(
        &self,
        trip_id: &str,
        channel_address: &str,
        candidate_token: &str,
    ) -> Result<SessionUpsert, TriplineError> {
        queries::sessions::upsert_session(self.db()?, trip_id, channel_address, candidate_token)
            .await
    }

    async fn get_session(&self, token: &str) -> Result<Option<Session>, TriplineError> {
        queries::sessions::get_session(self.db()?, token).await
    }

    async fn touch_session(&self, token: &str) -> Result<(), TriplineError> {
        queries::sessions::touch_session(self.db()?, token).await
    }

    async fn get_intake(&self, session_token: &str) -> Result<Option<Intake>, TriplineError> {
        queries::sessions::get_intake(self.db()?, session_token).await
    }

    async fn complete_intake(
        &self,
        session_token: &str,
        traveler_count: i64,
        profile: &str,
    ) -> Result<IntakeTransition, TriplineError> {
        queries::sessions::complete_intake(self.db()?, session_token, traveler_count, profile)
            .await
    }

    // --- Conversation log operations ---

    async fn append_message(&self, message: &ConversationMessage) -> Result<(), TriplineError> {
        queries::messages::append_message(self.db()?, message).await
    }

    async fn get_transcript(
        &self,
        session_token: &str,
        limit: Option<i64>,
    ) -> Result<Vec<ConversationMessage>, TriplineError> {
        queries::messages::get_transcript(self.db()?, session_token, limit).await
    }

    async fn count_messages(&self, session_token: &str) -> Result<i64, TriplineError> {
        queries::messages::count_messages(self.db()?, session_token).await
    }

    // --- Participant operations ---

    async fn add_participant(&self, participant: &Participant) -> Result<(), TriplineError> {
        queries::participants::add_participant(self.db()?, participant).await
    }

    async fn list_participants(&self, trip_id: &str) -> Result<Vec<Participant>, TriplineError> {
        queries::participants::list_participants(self.db()?, trip_id).await
    }

    // --- Scheduled message operations ---

    async fn enqueue_scheduled(
        &self,
        draft: &ScheduledMessageDraft,
    ) -> Result<i64, TriplineError> {
        queries::scheduled::enqueue(self.db()?, draft).await
    }

    async fn enqueue_unique_scheduled(
        &self,
        draft: &ScheduledMessageDraft,
    ) -> Result<Option<i64>, TriplineError> {
        queries::scheduled::enqueue_unique(self.db()?, draft).await
    }

    async fn get_scheduled(&self, id: i64) -> Result<Option<ScheduledMessage>, TriplineError> {
        queries::scheduled::get(self.db()?, id).await
    }

    async fn list_deliverable(
        &self,
        now: &str,
        limit: i64,
    ) -> Result<Vec<ScheduledMessage>, TriplineError> {
        queries::scheduled::list_deliverable(self.db()?, now, limit).await
    }

    async fn claim_scheduled(
        &self,
        id: i64,
        locked_until: &str,
        now: &str,
    ) -> Result<bool, TriplineError> {
        queries::scheduled::claim(self.db()?, id, locked_until, now).await
    }

    async fn mark_sent(&self, id: i64, delivery_id: &str) -> Result<(), TriplineError> {
        queries::scheduled::mark_sent(self.db()?, id, delivery_id).await
    }

    async fn mark_failed_attempt(
        &self,
        id: i64,
        error: &str,
    ) -> Result<JobStatus, TriplineError> {
        queries::scheduled::mark_failed_attempt(self.db()?, id, error).await
    }

    async fn delete_scheduled(&self, id: i64) -> Result<(), TriplineError> {
        queries::scheduled::delete(self.db()?, id).await
    }
}
