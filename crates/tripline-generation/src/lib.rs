// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client adapter for the generation collaborator.
//!
//! Implements [`tripline_core::GenerationAdapter`] against the generation
//! service's JSON API. The engine treats the collaborator as best effort:
//! errors returned here are folded into the fixed apology reply by the
//! conversation service and never reach a channel.

pub mod client;
pub mod types;

pub use client::HttpGeneration;
