// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the messaging gateway API.

use serde::{Deserialize, Serialize};

/// Request body for `POST /messages`.
#[derive(Debug, Clone, Serialize)]
pub struct SendRequest {
    pub to: String,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    pub variables: serde_json::Value,
}

/// Response body for an accepted delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct SendResponse {
    pub delivery_id: String,
}

/// Error body returned by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayErrorResponse {
    pub error: GatewayErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayErrorDetail {
    pub code: String,
    pub message: String,
}
