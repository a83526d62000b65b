// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as score thresholds staying in [0,1] and the evacuation
//! target staying below its trigger.

use crate::diagnostic::ConfigError;
use crate::model::MnemaConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &MnemaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.embedding.memory_dimensions == 0 {
        errors.push(ConfigError::Validation {
            message: "embedding.memory_dimensions must be at least 1".to_string(),
        });
    }
    if config.embedding.entity_dimensions == 0 {
        errors.push(ConfigError::Validation {
            message: "embedding.entity_dimensions must be at least 1".to_string(),
        });
    }

    check_unit_range(
        &mut errors,
        "retrieval.similarity_threshold",
        config.retrieval.similarity_threshold as f64,
    );
    check_unit_range(
        &mut errors,
        "retrieval.min_importance",
        config.retrieval.min_importance as f64,
    );
    if config.retrieval.default_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "retrieval.default_limit must be at least 1".to_string(),
        });
    }
    if config.retrieval.sigmoid_steepness <= 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "retrieval.sigmoid_steepness must be positive, got {}",
                config.retrieval.sigmoid_steepness
            ),
        });
    }

    if config.fingerprint.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "fingerprint.model must not be empty".to_string(),
        });
    }
    if config.fingerprint.window_pairs == 0 {
        errors.push(ConfigError::Validation {
            message: "fingerprint.window_pairs must be at least 1".to_string(),
        });
    }

    if config.evacuation.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "evacuation.model must not be empty".to_string(),
        });
    }
    if config.evacuation.trigger_threshold == 0 {
        errors.push(ConfigError::Validation {
            message: "evacuation.trigger_threshold must be at least 1".to_string(),
        });
    }
    if config.evacuation.target_survivors == 0 {
        errors.push(ConfigError::Validation {
            message: "evacuation.target_survivors must be at least 1".to_string(),
        });
    }
    if config.evacuation.target_survivors > config.evacuation.trigger_threshold {
        errors.push(ConfigError::Validation {
            message: format!(
                "evacuation.target_survivors ({}) must not exceed evacuation.trigger_threshold ({})",
                config.evacuation.target_survivors, config.evacuation.trigger_threshold
            ),
        });
    }
    if config.evacuation.window_pairs == 0 {
        errors.push(ConfigError::Validation {
            message: "evacuation.window_pairs must be at least 1".to_string(),
        });
    }

    check_unit_range(
        &mut errors,
        "entities.similarity_threshold",
        config.entities.similarity_threshold,
    );

    if config.entity_gc.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "entity_gc.model must not be empty".to_string(),
        });
    }
    if config.entity_gc.dormancy_days == 0 {
        errors.push(ConfigError::Validation {
            message: "entity_gc.dormancy_days must be at least 1".to_string(),
        });
    }
    if config.entity_gc.min_links > config.entity_gc.max_links {
        errors.push(ConfigError::Validation {
            message: format!(
                "entity_gc.min_links ({}) must not exceed entity_gc.max_links ({})",
                config.entity_gc.min_links, config.entity_gc.max_links
            ),
        });
    }
    check_unit_range(
        &mut errors,
        "entity_gc.string_threshold",
        config.entity_gc.string_threshold,
    );
    check_unit_range(
        &mut errors,
        "entity_gc.cooccurrence_threshold",
        config.entity_gc.cooccurrence_threshold,
    );
    if config.entity_gc.max_candidates == 0 {
        errors.push(ConfigError::Validation {
            message: "entity_gc.max_candidates must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_unit_range(errors: &mut Vec<ConfigError>, key: &str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ConfigError::Validation {
            message: format!("{key} must be between 0.0 and 1.0, got {value}"),
        });
    }
}
