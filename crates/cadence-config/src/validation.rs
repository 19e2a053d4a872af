// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as ordered ranges, fractions, and non-zero caps.

use cadence_core::RequestCategory;
use strum::IntoEnumIterator;

use crate::diagnostic::ConfigError;
use crate::model::CadenceConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CadenceConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.log.level.to_ascii_lowercase().as_str()) {
        fail(format!(
            "log.level `{}` is not one of {}",
            config.log.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if config.rate_limit.window_secs == 0 {
        fail("rate_limit.window_secs must be greater than 0".to_string());
    }

    for category in RequestCategory::iter() {
        if config.rate_limit.caps.cap(category) == 0 {
            fail(format!(
                "rate_limit.caps.{category} must be greater than 0 (a zero cap blocks the category forever)"
            ));
        }
    }

    let location = &config.location;
    if location.min_interval_secs > location.max_interval_secs {
        fail(format!(
            "location.min_interval_secs ({}) must not exceed location.max_interval_secs ({})",
            location.min_interval_secs, location.max_interval_secs
        ));
    }
    for (name, value) in [
        ("min_step_fraction", location.min_step_fraction),
        ("max_step_fraction", location.max_step_fraction),
    ] {
        if !(value > 0.0 && value <= 1.0) {
            fail(format!("location.{name} must be within (0, 1], got {value}"));
        }
    }
    if location.min_step_fraction > location.max_step_fraction {
        fail(format!(
            "location.min_step_fraction ({}) must not exceed location.max_step_fraction ({})",
            location.min_step_fraction, location.max_step_fraction
        ));
    }

    if config.heartbeat.min_interval_secs > config.heartbeat.max_interval_secs {
        fail(format!(
            "heartbeat.min_interval_secs ({}) must not exceed heartbeat.max_interval_secs ({})",
            config.heartbeat.min_interval_secs, config.heartbeat.max_interval_secs
        ));
    }

    if !(0.0..1.0).contains(&config.typing.jitter_fraction) {
        fail(format!(
            "typing.jitter_fraction must be within [0, 1), got {}",
            config.typing.jitter_fraction
        ));
    }

    let user_agent = &config.user_agent;
    if !(0.0..=1.0).contains(&user_agent.variant_probability) {
        fail(format!(
            "user_agent.variant_probability must be within [0, 1], got {}",
            user_agent.variant_probability
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let analytics = &config.analytics;
    if analytics.retention_days == 0 {
        fail("analytics.retention_days must be at least 1".to_string());
    }
    if analytics.sweep_interval_secs == 0 {
        fail("analytics.sweep_interval_secs must be greater than 0".to_string());
    }
    if analytics.query_timeout_secs == 0 {
        fail("analytics.query_timeout_secs must be greater than 0".to_string());
    }
    if analytics.recorder_queue_capacity == 0 {
        fail("analytics.recorder_queue_capacity must be greater than 0".to_string());
    }
    if let Some(offset) = analytics.utc_offset_minutes {
        if offset.abs() >= 24 * 60 {
            fail(format!(
                "analytics.utc_offset_minutes must be within ±1439, got {offset}"
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
