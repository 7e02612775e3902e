// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Tripline workspace.
//!
//! Row types mirror the storage schema one to one. All timestamps are TEXT
//! ISO-8601 UTC (`2026-01-01T00:00:00.000Z`), which sorts lexicographically
//! in insertion order.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque conversation key for one (trip, channel address) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(pub String);

/// Delivery receipt returned by the messaging gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryId(pub String);

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum AdapterType {
    Storage,
    Generation,
    Gateway,
}

/// Author of a conversation entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Traveler,
    Assistant,
}

/// Lifecycle of a scheduled notification job.
///
/// `pending -> sending -> sent` is the happy path. A failed gateway call
/// moves the job back to `pending` until the attempt cap is reached, after
/// which it parks in `failed` for operator attention. `sent` is terminal and
/// reached at most once per job.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Sending,
    Sent,
    Failed,
}

// --- Storage row types ---

/// An operator-created trip with a public share token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    /// Opaque, unguessable; the only credential the web channel needs.
    /// Immutable once the trip is created.
    pub share_token: String,
    /// Expected traveler-profile fields, as a JSON template.
    pub profile_template: Option<String>,
    /// Free-text instructions forwarded to the generation collaborator.
    pub behavior_notes: Option<String>,
    /// Link to an externally sourced itinerary.
    pub itinerary_ref: Option<String>,
    /// IANA timezone name used when scheduling notifications for this trip.
    pub timezone: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One conversation, keyed by an opaque token and bound to exactly one
/// (trip, channel address) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub trip_id: String,
    /// Normalized channel address (phone or synthetic web marker).
    pub channel_address: String,
    pub last_activity_at: String,
    pub created_at: String,
}

/// The traveler-profile gate for one session (1:1 by session token).
///
/// `completed_at IS NULL` means the session is still AWAITING and
/// conversation access is refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intake {
    pub session_token: String,
    pub traveler_count: i64,
    /// Structured traveler-profile payload as JSON text.
    pub profile: Option<String>,
    pub completed_at: Option<String>,
    pub created_at: String,
}

impl Intake {
    /// Whether the session has passed the intake gate.
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// One append-only transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    pub session_token: String,
    /// Stored as TEXT; parses into [`MessageRole`].
    pub role: String,
    pub content: String,
    pub created_at: String,
}

/// A phone contact registered on a trip by an operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub trip_id: String,
    pub phone: String,
    pub display_name: String,
    /// Advisory only; at most one primary contact per trip is not enforced.
    pub is_primary: bool,
    pub created_at: String,
}

/// A queued, timezone-scoped, single-delivery notification job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledMessage {
    pub id: i64,
    pub trip_id: String,
    /// Normalized recipient phone.
    pub recipient: String,
    /// Literal message body; mutually exclusive with `template_id`.
    pub body: Option<String>,
    pub template_id: Option<String>,
    /// Template variables as JSON text.
    pub variables: Option<String>,
    /// Local calendar date `YYYY-MM-DD`, interpreted in `timezone`.
    pub send_date: String,
    /// Local wall-clock time `HH:MM`, interpreted in `timezone`.
    pub send_time: String,
    /// IANA timezone name.
    pub timezone: String,
    pub message_type: String,
    /// Stored as TEXT; parses into [`JobStatus`].
    pub status: String,
    pub attempts: i64,
    pub max_attempts: i64,
    /// Claim lock expiry; a `sending` row with an expired lock is reclaimable.
    pub locked_until: Option<String>,
    pub last_error: Option<String>,
    pub delivery_id: Option<String>,
    pub sent_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Insert payload for a new scheduled message; the scheduler owns every
/// other column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledMessageDraft {
    pub trip_id: String,
    pub recipient: String,
    pub body: Option<String>,
    pub template_id: Option<String>,
    pub variables: Option<String>,
    pub send_date: String,
    pub send_time: String,
    pub timezone: String,
    pub message_type: String,
    pub max_attempts: i64,
}

/// Traveler-profile payload accepted by the intake gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeSubmission {
    pub traveler_count: i64,
    pub profile: serde_json::Value,
}

// --- Collaborator exchange types ---

/// One transcript entry handed to the generation collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: MessageRole,
    pub content: String,
}

/// Conversation context for a generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    pub trip_name: String,
    pub behavior_notes: Option<String>,
    pub transcript: Vec<TranscriptEntry>,
}

/// What the messaging gateway should deliver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MessageContent {
    /// A literal message body.
    Body(String),
    /// A gateway-side template rendered with the job's variables.
    Template(String),
}
