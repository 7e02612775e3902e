// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tripline conversation and scheduling engine.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Tripline workspace. The storage backend
//! and both external collaborators (generation service, messaging gateway)
//! implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TriplineError;
pub use types::{AdapterType, DeliveryId, HealthStatus, JobStatus, MessageRole, SessionToken};

pub use traits::{Adapter, GenerationAdapter, MessagingGateway, StorageAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tripline_error_has_all_variants() {
        let _config = TriplineError::Config("test".into());
        let _storage = TriplineError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _generation = TriplineError::Generation {
            message: "test".into(),
            source: None,
        };
        let _gateway = TriplineError::Gateway {
            message: "test".into(),
            source: None,
        };
        let _intake = TriplineError::IntakeRequired {
            session_token: "tok".into(),
        };
        let _dup = TriplineError::AlreadyCompleted {
            session_token: "tok".into(),
        };
        let _not_found = TriplineError::NotFound {
            entity: "trip".into(),
            id: "t-1".into(),
        };
        let _timeout = TriplineError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = TriplineError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        let variants = [
            AdapterType::Storage,
            AdapterType::Generation,
            AdapterType::Gateway,
        ];
        for variant in &variants {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
    }

    #[test]
    fn message_role_serializes_lowercase() {
        assert_eq!(MessageRole::Traveler.to_string(), "traveler");
        assert_eq!(MessageRole::Assistant.to_string(), "assistant");
    }

    #[test]
    fn job_status_round_trips() {
        use std::str::FromStr;

        for status in [
            JobStatus::Pending,
            JobStatus::Sending,
            JobStatus::Sent,
            JobStatus::Failed,
        ] {
            let parsed = JobStatus::from_str(&status.to_string()).expect("should parse back");
            assert_eq!(status, parsed);
        }
    }
}
