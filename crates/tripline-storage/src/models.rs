// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `tripline-core::types` for use across
//! adapter trait boundaries. This module re-exports them for convenience
//! within the storage crate.

pub use tripline_core::types::{
    ConversationMessage, Intake, Participant, ScheduledMessage, ScheduledMessageDraft, Session,
    Trip,
};
