// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Tripline conversation engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Tripline configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TriplineConfig {
    /// Engine identity, identity normalization, and conversation settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Generation collaborator settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Outbound messaging gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Scheduled-message delivery settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Engine identity and conversation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Display name of the platform instance.
    #[serde(default = "default_engine_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Country code prepended when normalizing a nationally formatted phone
    /// number (a single leading zero), without the `+`.
    #[serde(default = "default_country_code")]
    pub default_country_code: String,

    /// IANA timezone assigned to trips that do not set their own.
    #[serde(default = "default_timezone")]
    pub default_timezone: String,

    /// Base URL used to build public share links.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    /// Maximum number of transcript entries handed to the generation
    /// collaborator per turn.
    #[serde(default = "default_transcript_limit")]
    pub transcript_limit: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: default_engine_name(),
            log_level: default_log_level(),
            default_country_code: default_country_code(),
            default_timezone: default_timezone(),
            public_base_url: default_public_base_url(),
            transcript_limit: default_transcript_limit(),
        }
    }
}

fn default_engine_name() -> String {
    "tripline".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_country_code() -> String {
    "31".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_public_base_url() -> String {
    "https://trips.example.com/t".to_string()
}

fn default_transcript_limit() -> i64 {
    50
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Whether to enable WAL journal mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("tripline/tripline.db").display().to_string())
        .unwrap_or_else(|| "tripline.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Generation collaborator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Base URL of the generation service.
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// API key for the generation service. `None` requires the
    /// `TRIPLINE_GENERATION_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier forwarded to the generation service.
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Bound on one generation call. Timeouts are recovered with the apology
    /// reply, identically to failures.
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            api_key: None,
            model: default_generation_model(),
            timeout_secs: default_generation_timeout_secs(),
        }
    }
}

fn default_generation_base_url() -> String {
    "https://generation.internal/v1".to_string()
}

fn default_generation_model() -> String {
    "travel-concierge-1".to_string()
}

fn default_generation_timeout_secs() -> u64 {
    30
}

/// Outbound messaging gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Base URL of the messaging gateway.
    #[serde(default = "default_gateway_base_url")]
    pub base_url: String,

    /// Bearer token for the gateway API.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Sender identity registered with the gateway.
    #[serde(default = "default_sender_id")]
    pub sender_id: String,

    /// HTTP timeout for one send call.
    #[serde(default = "default_gateway_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_gateway_base_url(),
            api_token: None,
            sender_id: default_sender_id(),
            timeout_secs: default_gateway_timeout_secs(),
        }
    }
}

fn default_gateway_base_url() -> String {
    "https://gateway.internal/v1".to_string()
}

fn default_sender_id() -> String {
    "tripline".to_string()
}

fn default_gateway_timeout_secs() -> u64 {
    15
}

/// Scheduled-message delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Maximum jobs examined per scheduler pass.
    #[serde(default = "default_batch_size")]
    pub batch_size: i64,

    /// Delivery attempts before a job parks in the failed state and an
    /// operator alert fires.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i64,

    /// How long a claimed job stays locked before a crashed pass's claim
    /// becomes reclaimable.
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_attempts: default_max_attempts(),
            lock_timeout_secs: default_lock_timeout_secs(),
        }
    }
}

fn default_batch_size() -> i64 {
    100
}

fn default_max_attempts() -> i64 {
    5
}

fn default_lock_timeout_secs() -> u64 {
    300
}
