// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tripline integration tests.
//!
//! Provides mock collaborators and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockGeneration`] - Mock generation collaborator with pre-configured
//!   replies, scripted failures, and artificial latency
//! - [`MockGateway`] - Mock messaging gateway with send capture and
//!   scripted failures
//! - [`TestHarness`] - Temp-SQLite harness wiring the full engine together

pub mod harness;
pub mod mock_gateway;
pub mod mock_generation;

pub use harness::TestHarness;
pub use mock_gateway::{MockGateway, SentRecord};
pub use mock_generation::MockGeneration;
