// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The intake gate: AWAITING -> ACTIVE, one way, exactly once.
//!
//! Conversation access is refused until a traveler profile has been
//! submitted for the session. The transition itself is the idempotency key
//! for participant fan-out: however often a caller retries the submission
//! after a transport failure, only the invocation that actually flips
//! `completed_at` runs the fan-out.

use std::sync::Arc;

use tracing::{debug, info};
use tripline_core::traits::IntakeTransition;
use tripline_core::types::IntakeSubmission;
use tripline_core::{StorageAdapter, TriplineError};

use crate::fanout::ParticipantFanout;

/// Outcome of an intake submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    /// This submission performed the AWAITING -> ACTIVE transition and ran
    /// participant fan-out; `notified` counts the jobs enqueued.
    Completed { notified: usize },
    /// The session was already ACTIVE. Benign: the stored profile is
    /// untouched and fan-out did not run again.
    AlreadyCompleted,
}

/// Applies intake submissions and triggers fan-out on first completion.
pub struct IntakeGate {
    storage: Arc<dyn StorageAdapter>,
    fanout: ParticipantFanout,
}

impl IntakeGate {
    pub fn new(storage: Arc<dyn StorageAdapter>, fanout: ParticipantFanout) -> Self {
        Self { storage, fanout }
    }

    /// Submit a traveler profile for a session.
    ///
    /// Exactly one submission per session ever observes
    /// [`IntakeOutcome::Completed`]; that one runs participant fan-out
    /// synchronously before returning.
    pub async fn submit_intake(
        &self,
        session_token: &str,
        submission: &IntakeSubmission,
    ) -> Result<IntakeOutcome, TriplineError> {
        let session = self
            .storage
            .get_session(session_token)
            .await?
            .ok_or_else(|| TriplineError::not_found("session", session_token))?;

        let profile = serde_json::to_string(&submission.profile)
            .map_err(|e| TriplineError::Internal(format!("unserializable profile: {e}")))?;

        match self
            .storage
            .complete_intake(session_token, submission.traveler_count, &profile)
            .await?
        {
            IntakeTransition::Completed => {
                info!(session_token, trip_id = session.trip_id.as_str(), "intake completed");
                let notified = self.fanout.run(&session.trip_id).await?;
                Ok(IntakeOutcome::Completed { notified })
            }
            IntakeTransition::AlreadyCompleted => {
                debug!(session_token, "duplicate intake submission ignored");
                Ok(IntakeOutcome::AlreadyCompleted)
            }
            IntakeTransition::NotFound => {
                Err(TriplineError::not_found("intake", session_token))
            }
        }
    }
}
