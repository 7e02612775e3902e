// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tripline conversation and scheduling engine.

use thiserror::Error;

/// The primary error type used across all Tripline adapter traits and engine operations.
///
/// `IntakeRequired` and `AlreadyCompleted` are flow-control conditions rather
/// than faults: callers redirect to the intake form or treat the submission as
/// a benign no-op. Neither is ever surfaced to a channel as a system error.
#[derive(Debug, Error)]
pub enum TriplineError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Generation collaborator errors (API failure, malformed response).
    #[error("generation error: {message}")]
    Generation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Messaging gateway errors (send rejected, transport failure).
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Conversation access attempted before the session's intake was completed.
    #[error("intake required for session {session_token}")]
    IntakeRequired { session_token: String },

    /// Duplicate intake submission for an already-active session.
    #[error("intake already completed for session {session_token}")]
    AlreadyCompleted { session_token: String },

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TriplineError {
    /// Shorthand for a [`TriplineError::NotFound`] with owned strings.
    pub fn not_found(entity: &str, id: &str) -> Self {
        TriplineError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}
