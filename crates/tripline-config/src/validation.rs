// SPDX-FileCopyrightText: 2026 Tripline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as parseable timezone names, numeric country codes, and
//! positive scheduler bounds.

use crate::diagnostic::ConfigError;
use crate::model::TriplineConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TriplineConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    let cc = config.engine.default_country_code.trim();
    if cc.is_empty() || !cc.chars().all(|c| c.is_ascii_digit()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "engine.default_country_code must be digits only, got `{cc}`"
            ),
        });
    }

    if config
        .engine
        .default_timezone
        .parse::<chrono_tz::Tz>()
        .is_err()
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "engine.default_timezone `{}` is not a known IANA timezone",
                config.engine.default_timezone
            ),
        });
    }

    if config.engine.public_base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "engine.public_base_url must not be empty".to_string(),
        });
    }

    if config.engine.transcript_limit <= 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "engine.transcript_limit must be positive, got {}",
                config.engine.transcript_limit
            ),
        });
    }

    if config.scheduler.batch_size <= 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "scheduler.batch_size must be positive, got {}",
                config.scheduler.batch_size
            ),
        });
    }

    if config.scheduler.max_attempts <= 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "scheduler.max_attempts must be positive, got {}",
                config.scheduler.max_attempts
            ),
        });
    }

    if config.scheduler.lock_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "scheduler.lock_timeout_secs must be positive".to_string(),
        });
    }

    if config.generation.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "generation.timeout_secs must be positive".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TriplineConfig;

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&TriplineConfig::default()).is_ok());
    }

    #[test]
    fn bad_country_code_is_rejected() {
        let mut config = TriplineConfig::default();
        config.engine.default_country_code = "+31".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn bad_timezone_is_rejected() {
        let mut config = TriplineConfig::default();
        config.engine.default_timezone = "Nowhere/Atlantis".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = TriplineConfig::default();
        config.storage.database_path = " ".to_string();
        config.scheduler.batch_size = 0;
        config.scheduler.max_attempts = -1;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
