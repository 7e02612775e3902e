// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the Tripline engine's seams.
//!
//! The engine never talks to SQLite, the generation service, or the
//! messaging gateway directly; it goes through these traits so tests can
//! substitute deterministic mocks. All adapters extend the [`Adapter`] base
//! trait and use `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod gateway;
pub mod generation;
pub mod storage;

pub use adapter::Adapter;
pub use gateway::MessagingGateway;
pub use generation::GenerationAdapter;
pub use storage::{IntakeTransition, SessionUpsert, StorageAdapter};
