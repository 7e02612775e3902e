// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Tripline conversation and scheduling engine.
//!
//! Turns a shared trip link into a gated, multi-channel conversational
//! session and fans out timezone-aware outbound notifications to trip
//! participants. The engine holds no shared in-memory mutable state: all
//! cross-request coordination lives in the storage layer as conflict-safe
//! upserts and claim-then-act conditional updates, so it stays correct
//! across independent stateless workers.

pub mod conversation;
pub mod fanout;
pub mod identity;
pub mod intake;
pub mod resolver;
pub mod scheduler;

pub use conversation::ConversationService;
pub use fanout::ParticipantFanout;
pub use intake::{IntakeGate, IntakeOutcome};
pub use resolver::{Resolution, SessionResolver};
pub use scheduler::{PassSummary, Scheduler};

use chrono::{DateTime, SecondsFormat, Utc};

/// Format an instant the way the storage layer stamps rows:
/// `2026-01-01T00:00:00.000Z`.
pub(crate) fn fmt_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// The current instant in storage timestamp format.
pub(crate) fn now_iso() -> String {
    fmt_iso(Utc::now())
}
