// SPDX-FileCopyrightText: 2026 Barbero Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as parseable cron expressions and coherent reminder
//! windows.

use std::str::FromStr;

use crate::diagnostic::ConfigError;
use crate::model::BarberoConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &BarberoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.scheduler.poll_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "scheduler.poll_interval_secs must be positive".to_string(),
        });
    }

    if let Err(e) = cron::Schedule::from_str(&config.scheduler.digest_cron) {
        errors.push(ConfigError::Validation {
            message: format!(
                "scheduler.digest_cron `{}` is not a valid cron expression \
                 (seconds-first, e.g. `0 0 8 * * *`): {e}",
                config.scheduler.digest_cron
            ),
        });
    }

    validate_window(
        "scheduler.customer_window_mins",
        config.scheduler.customer_window_mins,
        &mut errors,
    );
    validate_window(
        "scheduler.admin_window_mins",
        config.scheduler.admin_window_mins,
        &mut errors,
    );

    // The look-ahead must reach at least as far as the furthest reminder
    // window, otherwise events in-window would never be fetched.
    let lookahead_mins = config.scheduler.lookahead_hours * 60;
    if lookahead_mins < config.scheduler.customer_window_mins[1] {
        errors.push(ConfigError::Validation {
            message: format!(
                "scheduler.lookahead_hours ({}) does not cover customer_window_mins upper bound ({})",
                config.scheduler.lookahead_hours, config.scheduler.customer_window_mins[1]
            ),
        });
    }

    if config.callback.port == 0 {
        errors.push(ConfigError::Validation {
            message: "callback.port must be non-zero".to_string(),
        });
    }

    if config.callback.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "callback.host must not be empty".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn validate_window(name: &str, window: [i64; 2], errors: &mut Vec<ConfigError>) {
    let [lo, hi] = window;
    if lo < 0 {
        errors.push(ConfigError::Validation {
            message: format!("{name} lower bound must be non-negative, got {lo}"),
        });
    }
    if lo > hi {
        errors.push(ConfigError::Validation {
            message: format!("{name} bounds are inverted: [{lo}, {hi}]"),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = BarberoConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = BarberoConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))
        ));
    }

    #[test]
    fn bad_cron_fails_validation() {
        let mut config = BarberoConfig::default();
        config.scheduler.digest_cron = "every day at eight".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("digest_cron"))
        ));
    }

    #[test]
    fn inverted_window_fails_validation() {
        let mut config = BarberoConfig::default();
        config.scheduler.customer_window_mins = [70, 50];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("inverted"))
        ));
    }

    #[test]
    fn short_lookahead_fails_validation() {
        let mut config = BarberoConfig::default();
        config.scheduler.lookahead_hours = 1; // customer window reaches 70 min
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("lookahead_hours"))
        ));
    }

    #[test]
    fn zero_poll_interval_fails_validation() {
        let mut config = BarberoConfig::default();
        config.scheduler.poll_interval_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("poll_interval_secs"))
        ));
    }
}
