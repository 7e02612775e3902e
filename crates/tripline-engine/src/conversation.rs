// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation log and message exchange.
//!
//! One synchronous turn: persist the traveler's utterance, call the
//! generation collaborator, persist and return the reply. The traveler's
//! entry is appended before the generation call, so it survives any
//! collaborator failure; the channel then receives a fixed apology instead
//! of an error. A session is a single serialized conversation -- entries
//! are strictly ordered by insertion.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use tripline_core::types::{
    ConversationMessage, MessageRole, SessionContext, TranscriptEntry, Trip,
};
use tripline_core::{GenerationAdapter, StorageAdapter, TriplineError};
use uuid::Uuid;

use crate::now_iso;

/// Fixed reply substituted for any generation failure or timeout. The
/// channel never sees a raw error.
pub const APOLOGY_TEXT: &str =
    "Sorry, I could not put together a reply just now. Please send your message again in a moment.";

/// Synthesized first entry of every conversation.
pub fn welcome_text(trip_name: &str) -> String {
    format!(
        "Welcome to {trip_name}! I'm your trip assistant. Ask me anything about the plan, \
         the area, or your travel schedule."
    )
}

/// Drives one conversational turn per call.
pub struct ConversationService {
    storage: Arc<dyn StorageAdapter>,
    generation: Arc<dyn GenerationAdapter>,
    generation_timeout: Duration,
    transcript_limit: i64,
}

impl ConversationService {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        generation: Arc<dyn GenerationAdapter>,
        generation_timeout: Duration,
        transcript_limit: i64,
    ) -> Self {
        Self {
            storage,
            generation,
            generation_timeout,
            transcript_limit,
        }
    }

    /// Append the traveler's message and produce the assistant's reply.
    ///
    /// Refuses with [`TriplineError::IntakeRequired`] while the session is
    /// AWAITING. On the first access to an ACTIVE session with an empty
    /// log, the welcome entry is synthesized before anything else -- checked
    /// against the persisted log, so a retried first call cannot duplicate
    /// it.
    pub async fn append_and_respond(
        &self,
        session_token: &str,
        traveler_text: &str,
    ) -> Result<String, TriplineError> {
        let session = self
            .storage
            .get_session(session_token)
            .await?
            .ok_or_else(|| TriplineError::not_found("session", session_token))?;
        let intake = self
            .storage
            .get_intake(session_token)
            .await?
            .ok_or_else(|| TriplineError::not_found("intake", session_token))?;

        if !intake.is_complete() {
            return Err(TriplineError::IntakeRequired {
                session_token: session_token.to_string(),
            });
        }

        let trip = self
            .storage
            .get_trip(&session.trip_id)
            .await?
            .ok_or_else(|| TriplineError::not_found("trip", &session.trip_id))?;

        if self.storage.count_messages(session_token).await? == 0 {
            self.append(session_token, MessageRole::Assistant, &welcome_text(&trip.name))
                .await?;
            debug!(session_token, "welcome entry synthesized");
        }

        // The traveler's utterance is never lost, whatever generation does.
        self.append(session_token, MessageRole::Traveler, traveler_text)
            .await?;
        self.storage.touch_session(session_token).await?;

        let reply = self.generate_reply(session_token, &trip, traveler_text).await;
        self.append(session_token, MessageRole::Assistant, &reply)
            .await?;
        Ok(reply)
    }

    /// Call the generation collaborator under a bounded timeout, folding
    /// every failure mode into the apology text.
    async fn generate_reply(&self, session_token: &str, trip: &Trip, traveler_text: &str) -> String {
        let transcript = match self
            .storage
            .get_transcript(session_token, Some(self.transcript_limit))
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                warn!(session_token, error = %e, "transcript read failed before generation");
                return APOLOGY_TEXT.to_string();
            }
        };

        let context = SessionContext {
            trip_name: trip.name.clone(),
            behavior_notes: trip.behavior_notes.clone(),
            transcript: transcript
                .iter()
                .filter_map(|m| {
                    m.role.parse::<MessageRole>().ok().map(|role| TranscriptEntry {
                        role,
                        content: m.content.clone(),
                    })
                })
                .collect(),
        };

        match tokio::time::timeout(
            self.generation_timeout,
            self.generation.generate(&context, traveler_text),
        )
        .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!(session_token, error = %e, "generation failed, substituting apology");
                APOLOGY_TEXT.to_string()
            }
            Err(_) => {
                warn!(
                    session_token,
                    timeout_secs = self.generation_timeout.as_secs(),
                    "generation timed out, substituting apology"
                );
                APOLOGY_TEXT.to_string()
            }
        }
    }

    async fn append(
        &self,
        session_token: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<(), TriplineError> {
        let message = ConversationMessage {
            id: Uuid::new_v4().to_string(),
            session_token: session_token.to_string(),
            role: role.to_string(),
            content: content.to_string(),
            created_at: now_iso(),
        };
        self.storage.append_message(&message).await
    }
}
