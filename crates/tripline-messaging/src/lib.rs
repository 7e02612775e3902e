// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client adapter for the outbound messaging gateway.
//!
//! Implements [`tripline_core::MessagingGateway`] against the gateway's
//! JSON API. One call here is one delivery attempt: the scheduler owns the
//! retry policy, so this client deliberately never retries a failed send --
//! a retried POST could double-deliver a message the gateway had actually
//! accepted.

pub mod client;
pub mod types;

pub use client::HttpGateway;
