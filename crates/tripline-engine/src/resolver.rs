// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session resolution: maps a (trip, channel address) pair to exactly one
//! conversation key.
//!
//! First contact creates the session and its zeroed intake row as one unit;
//! every later contact for the same pair returns the same token. The race
//! between two near-simultaneous first contacts (two browser tabs, a
//! webhook retry) is settled by the storage layer's conflict-safe upsert,
//! not by anything in this module.

use std::sync::Arc;

use tracing::debug;
use tripline_core::{StorageAdapter, TriplineError};
use uuid::Uuid;

use crate::identity::{normalize_address, web_address};

/// Outcome of a resolve call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub session_token: String,
    pub is_new: bool,
}

/// Resolves channel addresses to session tokens.
pub struct SessionResolver {
    storage: Arc<dyn StorageAdapter>,
    default_country_code: String,
}

impl SessionResolver {
    pub fn new(storage: Arc<dyn StorageAdapter>, default_country_code: String) -> Self {
        Self {
            storage,
            default_country_code,
        }
    }

    /// Resolve a raw channel address against a trip.
    ///
    /// Normalizes the address, then upserts the session keyed on
    /// `(trip_id, normalized_address)` with a freshly generated candidate
    /// token. When another caller won the race, the winner's token comes
    /// back and the candidate is discarded.
    pub async fn resolve(
        &self,
        trip_id: &str,
        raw_address: &str,
    ) -> Result<Resolution, TriplineError> {
        if self.storage.get_trip(trip_id).await?.is_none() {
            return Err(TriplineError::not_found("trip", trip_id));
        }

        let address = normalize_address(raw_address, &self.default_country_code);
        let candidate = Uuid::new_v4().to_string();
        let upsert = self
            .storage
            .upsert_session(trip_id, &address, &candidate)
            .await?;

        if upsert.created {
            debug!(trip_id, address = address.as_str(), "session created");
        }
        Ok(Resolution {
            session_token: upsert.token,
            is_new: upsert.created,
        })
    }

    /// Resolve the web channel for a public share token.
    ///
    /// The share token is the only credential the web channel carries; it
    /// identifies the trip and doubles as the session's channel address.
    pub async fn resolve_share_link(
        &self,
        share_token: &str,
    ) -> Result<(String, Resolution), TriplineError> {
        let trip = self
            .storage
            .get_trip_by_share_token(share_token)
            .await?
            .ok_or_else(|| TriplineError::not_found("trip share token", share_token))?;

        let resolution = self.resolve(&trip.id, &web_address(share_token)).await?;
        Ok((trip.id, resolution))
    }
}
