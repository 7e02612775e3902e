// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging gateway trait for outbound notification delivery.

use async_trait::async_trait;

use crate::error::TriplineError;
use crate::traits::adapter::Adapter;
use crate::types::{DeliveryId, MessageContent};

/// Adapter for the outbound messaging gateway.
///
/// Delivery idempotency on the provider side is the gateway's concern; the
/// engine's scheduler guarantees it never calls [`send`](Self::send) twice
/// for the same job. Implementations therefore must not retry a failed send
/// on their own.
#[async_trait]
pub trait MessagingGateway: Adapter {
    /// Delivers one message to a phone recipient.
    ///
    /// `variables` are only meaningful for [`MessageContent::Template`];
    /// callers pass an empty JSON object otherwise.
    async fn send(
        &self,
        recipient: &str,
        content: &MessageContent,
        variables: &serde_json::Value,
    ) -> Result<DeliveryId, TriplineError>;
}
