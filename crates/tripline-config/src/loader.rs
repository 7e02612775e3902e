// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./tripline.toml` > `~/.config/tripline/tripline.toml`
//! > `/etc/tripline/tripline.toml` with environment variable overrides via
//! the `TRIPLINE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::TriplineConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tripline/tripline.toml` (system-wide)
/// 3. `~/.config/tripline/tripline.toml` (user XDG config)
/// 4. `./tripline.toml` (local directory)
/// 5. `TRIPLINE_*` environment variables
pub fn load_config() -> Result<TriplineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TriplineConfig::default()))
        .merge(Toml::file("/etc/tripline/tripline.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("tripline/tripline.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("tripline.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<TriplineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TriplineConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TriplineConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TriplineConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `TRIPLINE_ENGINE_DEFAULT_COUNTRY_CODE`
/// must map to `engine.default_country_code`, not `engine.default.country.code`.
fn env_provider() -> Env {
    Env::prefixed("TRIPLINE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: TRIPLINE_STORAGE_DATABASE_PATH -> "storage_database_path"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("engine_", "engine.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("generation_", "generation.", 1)
            .replacen("gateway_", "gateway.", 1)
            .replacen("scheduler_", "scheduler.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.engine.name, "tripline");
        assert_eq!(config.gateway.sender_id, "tripline");
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [engine]
            default_country_code = "44"

            [scheduler]
            batch_size = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.default_country_code, "44");
        assert_eq!(config.scheduler.batch_size, 10);
        // Untouched sections keep their defaults.
        assert_eq!(config.scheduler.max_attempts, 5);
    }

    #[test]
    fn unknown_section_key_errors() {
        let result = load_config_from_str("[storage]\ndatabse_path = \"x.db\"\n");
        assert!(result.is_err());
    }
}
