// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends.
//!
//! The persistence layer is the engine's single source of truth and its only
//! lock domain: all cross-request coordination is expressed here as
//! conflict-safe upserts ([`upsert_session`](StorageAdapter::upsert_session),
//! [`enqueue_unique_scheduled`](StorageAdapter::enqueue_unique_scheduled)) or
//! claim-then-act conditional updates
//! ([`complete_intake`](StorageAdapter::complete_intake),
//! [`claim_scheduled`](StorageAdapter::claim_scheduled)). No application-level
//! locks exist anywhere in the engine.

use async_trait::async_trait;

use crate::error::TriplineError;
use crate::traits::adapter::Adapter;
use crate::types::{
    ConversationMessage, Intake, JobStatus, Participant, ScheduledMessage, ScheduledMessageDraft,
    Session, Trip,
};

/// Result of a conflict-safe session upsert.
///
/// Two callers racing on first contact both receive the same `token`;
/// exactly one of them observes `created = true`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUpsert {
    pub token: String,
    pub created: bool,
}

/// Result of a conditional intake completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeTransition {
    /// This caller won the AWAITING -> ACTIVE transition.
    Completed,
    /// The intake was already complete; the stored profile is untouched.
    AlreadyCompleted,
    /// No intake row exists for the token.
    NotFound,
}

/// Adapter for storage and persistence backends.
#[async_trait]
pub trait StorageAdapter: Adapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), TriplineError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), TriplineError>;

    // --- Trip operations ---

    async fn create_trip(&self, trip: &Trip) -> Result<(), TriplineError>;

    async fn get_trip(&self, id: &str) -> Result<Option<Trip>, TriplineError>;

    async fn get_trip_by_share_token(&self, token: &str) -> Result<Option<Trip>, TriplineError>;

    /// Updates the operator-mutable content fields. The share token is never
    /// touched.
    async fn update_trip_content(
        &self,
        id: &str,
        profile_template: Option<&str>,
        behavior_notes: Option<&str>,
        itinerary_ref: Option<&str>,
    ) -> Result<(), TriplineError>;

    // --- Session + intake operations ---

    /// Conflict-safe upsert keyed on `(trip_id, channel_address)`.
    ///
    /// Creates the session row with `candidate_token` and its zeroed intake
    /// row as one transaction when the pair is unseen; otherwise returns the
    /// existing row's token. Also repairs a session that is missing its
    /// paired intake row.
    async fn upsert_session(
        &self,
        trip_id: &str,
        channel_address: &str,
        candidate_token: &str,
    ) -> Result<SessionUpsert, TriplineError>;

    async fn get_session(&self, token: &str) -> Result<Option<Session>, TriplineError>;

    /// Bumps the session's `last_activity_at`.
    async fn touch_session(&self, token: &str) -> Result<(), TriplineError>;

    async fn get_intake(&self, session_token: &str) -> Result<Option<Intake>, TriplineError>;

    /// Conditional AWAITING -> ACTIVE transition.
    ///
    /// Only succeeds while `completed_at` is still null, so exactly one
    /// caller ever observes [`IntakeTransition::Completed`] for a session.
    async fn complete_intake(
        &self,
        session_token: &str,
        traveler_count: i64,
        profile: &str,
    ) -> Result<IntakeTransition, TriplineError>;

    // --- Conversation log operations ---

    /// Appends one transcript entry. Entries are never mutated or removed.
    async fn append_message(&self, message: &ConversationMessage) -> Result<(), TriplineError>;

    /// Reads a session's transcript in insertion order.
    async fn get_transcript(
        &self,
        session_token: &str,
        limit: Option<i64>,
    ) -> Result<Vec<ConversationMessage>, TriplineError>;

    async fn count_messages(&self, session_token: &str) -> Result<i64, TriplineError>;

    // --- Participant operations ---

    async fn add_participant(&self, participant: &Participant) -> Result<(), TriplineError>;

    async fn list_participants(&self, trip_id: &str) -> Result<Vec<Participant>, TriplineError>;

    // --- Scheduled message operations ---

    /// Inserts a job unconditionally (operator ad-hoc scheduling).
    async fn enqueue_scheduled(
        &self,
        draft: &ScheduledMessageDraft,
    ) -> Result<i64, TriplineError>;

    /// Inserts a job only if no job of the same `message_type` exists for
    /// `(trip_id, recipient)`, in one atomic statement. Returns `None` when
    /// deduplicated.
    async fn enqueue_unique_scheduled(
        &self,
        draft: &ScheduledMessageDraft,
    ) -> Result<Option<i64>, TriplineError>;

    async fn get_scheduled(&self, id: i64) -> Result<Option<ScheduledMessage>, TriplineError>;

    /// Lists delivery candidates: `pending` jobs plus `sending` jobs whose
    /// claim lock expired before `now` (crash recovery).
    async fn list_deliverable(
        &self,
        now: &str,
        limit: i64,
    ) -> Result<Vec<ScheduledMessage>, TriplineError>;

    /// Atomically claims a job for delivery: moves it to `sending` with a
    /// lock expiry, only from a claimable state. Returns `false` when a
    /// concurrent pass already holds the job.
    async fn claim_scheduled(
        &self,
        id: i64,
        locked_until: &str,
        now: &str,
    ) -> Result<bool, TriplineError>;

    /// Finalizes a successful delivery: `sending -> sent`, stamped once.
    async fn mark_sent(&self, id: i64, delivery_id: &str) -> Result<(), TriplineError>;

    /// Records a failed attempt. Returns the resulting status: back to
    /// [`JobStatus::Pending`] for a later pass, or [`JobStatus::Failed`]
    /// once the attempt cap is reached.
    async fn mark_failed_attempt(
        &self,
        id: i64,
        error: &str,
    ) -> Result<JobStatus, TriplineError>;

    /// Operator deletion; the scheduler never deletes jobs.
    async fn delete_scheduled(&self, id: i64) -> Result<(), TriplineError>;
}
