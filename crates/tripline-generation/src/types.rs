// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the generation service API.

use serde::{Deserialize, Serialize};
use tripline_core::types::TranscriptEntry;

/// Request body for `POST /generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub trip_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub transcript: Vec<TranscriptEntry>,
    pub message: String,
}

/// Response body for a successful generation.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub reply: String,
}

/// Error body returned by the generation service.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "type")]
    pub type_: String,
    pub message: String,
}
