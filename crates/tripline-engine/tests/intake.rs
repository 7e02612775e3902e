// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intake gate behavior, exercised through the shared test harness.
//!
//! These live as integration tests (not inline unit tests) because the
//! harness pulls in `tripline-engine` as a normal dependency; running them
//! in-crate would link two distinct copies of the engine and the
//! `IntakeOutcome` values would not unify.

use serde_json::json;
use tripline_core::StorageAdapter;
use tripline_core::TriplineError;
use tripline_core::types::IntakeSubmission;
use tripline_engine::IntakeOutcome;
use tripline_test_utils::TestHarness;

fn submission() -> IntakeSubmission {
    IntakeSubmission {
        traveler_count: 2,
        profile: json!({"travelers": [{"name": "Ada"}, {"name": "Ben"}]}),
    }
}

#[tokio::test]
async fn submission_transitions_to_active() {
    let harness = TestHarness::builder().build().await.unwrap();
    let trip = harness.create_trip("Alps 2026").await.unwrap();
    let token = harness.open_web_session(&trip).await.unwrap();

    let outcome = harness
        .intake
        .submit_intake(&token, &submission())
        .await
        .unwrap();
    assert!(matches!(outcome, IntakeOutcome::Completed { .. }));

    let intake = harness.storage.get_intake(&token).await.unwrap().unwrap();
    assert!(intake.is_complete());
    assert_eq!(intake.traveler_count, 2);
}

#[tokio::test]
async fn retried_submission_is_benign_and_preserves_profile() {
    let harness = TestHarness::builder().build().await.unwrap();
    let trip = harness.create_trip("Alps 2026").await.unwrap();
    let token = harness.open_web_session(&trip).await.unwrap();

    harness
        .intake
        .submit_intake(&token, &submission())
        .await
        .unwrap();

    let retry = IntakeSubmission {
        traveler_count: 9,
        profile: json!({"travelers": []}),
    };
    let outcome = harness.intake.submit_intake(&token, &retry).await.unwrap();
    assert_eq!(outcome, IntakeOutcome::AlreadyCompleted);

    let intake = harness.storage.get_intake(&token).await.unwrap().unwrap();
    assert_eq!(intake.traveler_count, 2, "first profile must win");
}

#[tokio::test]
async fn fanout_runs_once_per_transition() {
    let harness = TestHarness::builder().build().await.unwrap();
    let trip = harness.create_trip("Alps 2026").await.unwrap();
    harness
        .add_participant(&trip, "Ada", "06 1111 1111")
        .await
        .unwrap();
    harness
        .add_participant(&trip, "Ben", "06 2222 2222")
        .await
        .unwrap();
    let token = harness.open_web_session(&trip).await.unwrap();

    let first = harness
        .intake
        .submit_intake(&token, &submission())
        .await
        .unwrap();
    assert_eq!(first, IntakeOutcome::Completed { notified: 2 });

    // The retry does not re-run fan-out.
    let second = harness
        .intake
        .submit_intake(&token, &submission())
        .await
        .unwrap();
    assert_eq!(second, IntakeOutcome::AlreadyCompleted);

    let jobs = harness
        .storage
        .list_deliverable("2099-01-01T00:00:00.000Z", 100)
        .await
        .unwrap();
    assert_eq!(jobs.len(), 2, "one job per participant, no duplicates");
}

#[tokio::test]
async fn unknown_session_is_an_error() {
    let harness = TestHarness::builder().build().await.unwrap();
    let result = harness.intake.submit_intake("nope", &submission()).await;
    assert!(matches!(result, Err(TriplineError::NotFound { .. })));
}
