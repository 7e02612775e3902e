// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation adapter trait for the assistant-text collaborator.

use async_trait::async_trait;

use crate::error::TriplineError;
use crate::traits::adapter::Adapter;
use crate::types::SessionContext;

/// Adapter for the external text-generation service.
///
/// The engine treats this collaborator as best effort: any error or timeout
/// is recovered locally by the conversation service and never surfaced to a
/// channel. Implementations must not retry internally beyond transient
/// transport hiccups; retry policy belongs to the caller.
#[async_trait]
pub trait GenerationAdapter: Adapter {
    /// Produces assistant text for the traveler's latest utterance, given the
    /// session transcript and the trip's behavior instructions.
    async fn generate(
        &self,
        context: &SessionContext,
        traveler_text: &str,
    ) -> Result<String, TriplineError>;
}
