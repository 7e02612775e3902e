// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait shared by storage and collaborator adapters.

use async_trait::async_trait;

use crate::error::TriplineError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for all Tripline adapters.
///
/// Every adapter (storage, generation, gateway) implements this trait,
/// which provides identity and health check capabilities.
#[async_trait]
pub trait Adapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the kind of adapter (storage, generation, gateway).
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, TriplineError>;
}
