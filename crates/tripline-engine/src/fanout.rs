// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Participant fan-out: the one-time broadcast when a trip's intake first
//! completes.
//!
//! Every registered participant phone becomes its own session (so later
//! inbound messages from that number resolve correctly) and receives
//! exactly one `intake_completed` notification job, scheduled for "now" in
//! the trip's timezone. The per-participant dedupe key is
//! `(trip, phone, job type)`, enforced atomically by the storage layer's
//! check-before-insert, so a duplicate invocation enqueues nothing new.

use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use serde_json::json;
use tracing::{debug, warn};
use tripline_core::types::ScheduledMessageDraft;
use tripline_core::{StorageAdapter, TriplineError};
use uuid::Uuid;

use crate::identity::normalize_address;

/// Job type enqueued for each participant on intake completion.
pub const INTAKE_COMPLETED_TYPE: &str = "intake_completed";

/// Template rendered by the messaging gateway for intake notifications.
pub const INTAKE_COMPLETED_TEMPLATE: &str = "intake_completed";

/// Broadcasts intake completion to a trip's participants.
#[derive(Clone)]
pub struct ParticipantFanout {
    storage: Arc<dyn StorageAdapter>,
    default_country_code: String,
    public_base_url: String,
    max_attempts: i64,
}

impl ParticipantFanout {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        default_country_code: String,
        public_base_url: String,
        max_attempts: i64,
    ) -> Self {
        Self {
            storage,
            default_country_code,
            public_base_url,
            max_attempts,
        }
    }

    /// Share link advertised in participant notifications.
    fn share_link(&self, share_token: &str) -> String {
        format!("{}/{share_token}", self.public_base_url.trim_end_matches('/'))
    }

    /// Run the fan-out for a trip. Returns the number of jobs enqueued
    /// (deduplicated repeats count zero).
    ///
    /// A failure on one participant is logged and does not block the
    /// others; the dedupe guard makes a later re-run safe for whoever was
    /// skipped.
    pub async fn run(&self, trip_id: &str) -> Result<usize, TriplineError> {
        let trip = self
            .storage
            .get_trip(trip_id)
            .await?
            .ok_or_else(|| TriplineError::not_found("trip", trip_id))?;

        let timezone: Tz = trip.timezone.parse().unwrap_or_else(|_| {
            warn!(trip_id, timezone = trip.timezone.as_str(), "unparseable trip timezone, using UTC");
            Tz::UTC
        });
        let local_now = Utc::now().with_timezone(&timezone);
        let send_date = local_now.format("%Y-%m-%d").to_string();
        let send_time = local_now.format("%H:%M").to_string();

        let participants = self.storage.list_participants(trip_id).await?;
        let mut enqueued = 0;

        for participant in &participants {
            if participant.phone.trim().is_empty() {
                continue;
            }
            let phone = normalize_address(&participant.phone, &self.default_country_code);

            // The participant's number gets its own session, distinct from
            // the channel the intake itself was filled on.
            let candidate = Uuid::new_v4().to_string();
            if let Err(e) = self.storage.upsert_session(trip_id, &phone, &candidate).await {
                warn!(trip_id, phone = phone.as_str(), error = %e, "participant session upsert failed");
                continue;
            }

            let variables = json!({
                "participant_name": participant.display_name,
                "trip_name": trip.name,
                "share_link": self.share_link(&trip.share_token),
            });
            let draft = ScheduledMessageDraft {
                trip_id: trip_id.to_string(),
                recipient: phone.clone(),
                body: None,
                template_id: Some(INTAKE_COMPLETED_TEMPLATE.to_string()),
                variables: Some(variables.to_string()),
                send_date: send_date.clone(),
                send_time: send_time.clone(),
                timezone: trip.timezone.clone(),
                message_type: INTAKE_COMPLETED_TYPE.to_string(),
                max_attempts: self.max_attempts,
            };
            match self.storage.enqueue_unique_scheduled(&draft).await {
                Ok(Some(id)) => {
                    debug!(trip_id, phone = phone.as_str(), job_id = id, "fan-out job enqueued");
                    enqueued += 1;
                }
                Ok(None) => {
                    debug!(trip_id, phone = phone.as_str(), "fan-out job already present");
                }
                Err(e) => {
                    warn!(trip_id, phone = phone.as_str(), error = %e, "fan-out enqueue failed");
                }
            }
        }

        Ok(enqueued)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tripline_test_utils::TestHarness;

    #[tokio::test]
    async fn each_participant_gets_session_and_job() {
        let harness = TestHarness::builder().build().await.unwrap();
        let trip = harness.create_trip("Alps 2026").await.unwrap();
        harness
            .add_participant(&trip, "Ada", "06 1111 1111")
            .await
            .unwrap();
        harness
            .add_participant(&trip, "Ben", "+31622222222")
            .await
            .unwrap();

        let enqueued = harness.fanout.run(&trip.id).await.unwrap();
        assert_eq!(enqueued, 2);

        // Participant phones resolve to the sessions fan-out created.
        let resolution = harness
            .resolver
            .resolve(&trip.id, "+31611111111")
            .await
            .unwrap();
        assert!(!resolution.is_new, "fan-out already created this session");

        let jobs = harness
            .storage
            .list_deliverable("2099-01-01T00:00:00.000Z", 100)
            .await
            .unwrap();
        assert_eq!(jobs.len(), 2);
        for job in &jobs {
            assert_eq!(job.message_type, "intake_completed");
            assert_eq!(job.timezone, trip.timezone);
            let variables: serde_json::Value =
                serde_json::from_str(job.variables.as_deref().unwrap()).unwrap();
            assert_eq!(variables["trip_name"], "Alps 2026");
            assert!(
                variables["share_link"]
                    .as_str()
                    .unwrap()
                    .ends_with(&trip.share_token)
            );
        }
    }

    #[tokio::test]
    async fn duplicate_run_enqueues_nothing() {
        let harness = TestHarness::builder().build().await.unwrap();
        let trip = harness.create_trip("Alps 2026").await.unwrap();
        harness
            .add_participant(&trip, "Ada", "06 1111 1111")
            .await
            .unwrap();

        assert_eq!(harness.fanout.run(&trip.id).await.unwrap(), 1);
        assert_eq!(harness.fanout.run(&trip.id).await.unwrap(), 0);

        let jobs = harness
            .storage
            .list_deliverable("2099-01-01T00:00:00.000Z", 100)
            .await
            .unwrap();
        assert_eq!(jobs.len(), 1);
    }

    #[tokio::test]
    async fn participants_without_phone_are_skipped() {
        let harness = TestHarness::builder().build().await.unwrap();
        let trip = harness.create_trip("Alps 2026").await.unwrap();
        harness.add_participant(&trip, "Ada", "").await.unwrap();
        harness.add_participant(&trip, "Ben", "  ").await.unwrap();
        harness
            .add_participant(&trip, "Cas", "0633333333")
            .await
            .unwrap();

        assert_eq!(harness.fanout.run(&trip.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn equivalent_phone_formats_deduplicate() {
        let harness = TestHarness::builder().build().await.unwrap();
        let trip = harness.create_trip("Alps 2026").await.unwrap();
        // Same number registered twice in different formats.
        harness
            .add_participant(&trip, "Ada", "06 1111 1111")
            .await
            .unwrap();
        harness
            .add_participant(&trip, "Ada again", "+31611111111")
            .await
            .unwrap();

        assert_eq!(harness.fanout.run(&trip.id).await.unwrap(), 1);
    }
}
