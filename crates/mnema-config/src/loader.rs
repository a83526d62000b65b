// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./mnema.toml` > `~/.config/mnema/mnema.toml` >
//! `/etc/mnema/mnema.toml` with environment variable overrides via the
//! `MNEMA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MnemaConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/mnema/mnema.toml` (system-wide)
/// 3. `~/.config/mnema/mnema.toml` (user XDG config)
/// 4. `./mnema.toml` (local directory)
/// 5. `MNEMA_*` environment variables
pub fn load_config() -> Result<MnemaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemaConfig::default()))
        .merge(Toml::file("/etc/mnema/mnema.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("mnema/mnema.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("mnema.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and embedded configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<MnemaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MnemaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `MNEMA_RETRIEVAL_MIN_IMPORTANCE` must
/// map to `retrieval.min_importance`, not `retrieval.min.importance`.
fn env_provider() -> Env {
    Env::prefixed("MNEMA_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: MNEMA_RETRIEVAL_MIN_IMPORTANCE -> "retrieval_min_importance"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("embedding_", "embedding.", 1)
            .replacen("retrieval_", "retrieval.", 1)
            .replacen("fingerprint_", "fingerprint.", 1)
            .replacen("evacuation_", "evacuation.", 1)
            .replacen("entities_", "entities.", 1)
            .replacen("entity_gc_", "entity_gc.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_without_any_file() {
        let config = load_config_from_str("").expect("empty config should load");
        assert_eq!(config.embedding.memory_dimensions, 768);
        assert_eq!(config.retrieval.default_limit, 5);
        assert_eq!(config.evacuation.trigger_threshold, 30);
    }

    #[test]
    fn toml_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[retrieval]
similarity_threshold = 0.5
default_limit = 10

[evacuation]
trigger_threshold = 40
"#,
        )
        .expect("config should load");
        assert!((config.retrieval.similarity_threshold - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.retrieval.default_limit, 10);
        assert_eq!(config.evacuation.trigger_threshold, 40);
        // Untouched sections keep defaults.
        assert_eq!(config.evacuation.target_survivors, 15);
        assert_eq!(config.entity_gc.dormancy_days, 30);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let result = load_config_from_str(
            r#"
[retrieval]
similarty_threshold = 0.5
"#,
        );
        assert!(result.is_err(), "typoed key must be rejected");
    }

    #[test]
    fn unknown_section_is_rejected() {
        let result = load_config_from_str(
            r#"
[retrievals]
default_limit = 10
"#,
        );
        assert!(result.is_err(), "unknown section must be rejected");
    }

    #[test]
    fn entity_gc_section_parses() {
        let config = load_config_from_str(
            r#"
[entity_gc]
dormancy_days = 14
string_threshold = 0.7
max_candidates = 3
"#,
        )
        .expect("config should load");
        assert_eq!(config.entity_gc.dormancy_days, 14);
        assert!((config.entity_gc.string_threshold - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.entity_gc.max_candidates, 3);
        // Defaults for the rest of the section.
        assert_eq!(config.entity_gc.candidate_pool, 50);
        assert_eq!(config.entity_gc.sample_memories, 5);
    }
}
