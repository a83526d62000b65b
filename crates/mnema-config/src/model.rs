// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Mnema memory engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Mnema configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MnemaConfig {
    /// Embedding vector widths.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Hybrid search and reranking settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Fingerprint generation settings.
    #[serde(default)]
    pub fingerprint: FingerprintConfig,

    /// Pinned-set evacuation settings.
    #[serde(default)]
    pub evacuation: EvacuationConfig,

    /// Entity extraction and clustering settings.
    #[serde(default)]
    pub entities: EntitiesConfig,

    /// Entity garbage collection settings.
    #[serde(default)]
    pub entity_gc: EntityGcConfig,
}

/// Embedding vector width configuration.
///
/// Memory and entity embeddings use different widths: entity vectors only
/// drive merge-candidate search and are kept coarser.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Width of memory embeddings.
    #[serde(default = "default_memory_dimensions")]
    pub memory_dimensions: usize,

    /// Width of entity embeddings.
    #[serde(default = "default_entity_dimensions")]
    pub entity_dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            memory_dimensions: default_memory_dimensions(),
            entity_dimensions: default_entity_dimensions(),
        }
    }
}

fn default_memory_dimensions() -> usize {
    768
}

fn default_entity_dimensions() -> usize {
    256
}

/// Hybrid search and reranking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Minimum cosine similarity for the vector search leg (0.0-1.0).
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Memories below this importance are filtered out of search results
    /// regardless of their fused rank (0.0-1.0).
    #[serde(default = "default_min_importance")]
    pub min_importance: f32,

    /// Default number of memories surfaced per turn.
    #[serde(default = "default_retrieval_limit")]
    pub default_limit: usize,

    /// Link-graph expansion depth from each surfaced memory.
    #[serde(default = "default_link_depth")]
    pub link_depth: u32,

    /// Midpoint of the sigmoid mapping raw RRF scores into [0,1].
    /// The default is the RRF score of a memory ranked first in exactly
    /// one of the two fused lists.
    #[serde(default = "default_sigmoid_midpoint")]
    pub sigmoid_midpoint: f32,

    /// Steepness of the sigmoid mapping raw RRF scores into [0,1].
    #[serde(default = "default_sigmoid_steepness")]
    pub sigmoid_steepness: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            min_importance: default_min_importance(),
            default_limit: default_retrieval_limit(),
            link_depth: default_link_depth(),
            sigmoid_midpoint: default_sigmoid_midpoint(),
            sigmoid_steepness: default_sigmoid_steepness(),
        }
    }
}

fn default_similarity_threshold() -> f32 {
    0.35
}

fn default_min_importance() -> f32 {
    0.0
}

fn default_retrieval_limit() -> usize {
    5
}

fn default_link_depth() -> u32 {
    1
}

fn default_sigmoid_midpoint() -> f32 {
    1.0 / 61.0
}

fn default_sigmoid_steepness() -> f32 {
    150.0
}

/// Fingerprint generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FingerprintConfig {
    /// Model used for fingerprint generation.
    #[serde(default = "default_fingerprint_model")]
    pub model: String,

    /// Number of most recent conversational pairs included in the prompt.
    #[serde(default = "default_fingerprint_window_pairs")]
    pub window_pairs: usize,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            model: default_fingerprint_model(),
            window_pairs: default_fingerprint_window_pairs(),
        }
    }
}

fn default_fingerprint_model() -> String {
    "claude-haiku-4-5-20250901".to_string()
}

fn default_fingerprint_window_pairs() -> usize {
    6
}

/// Pinned-set evacuation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EvacuationConfig {
    /// Model used for evacuation judgment.
    #[serde(default = "default_evacuation_model")]
    pub model: String,

    /// Pinned-set size above which evacuation triggers.
    #[serde(default = "default_trigger_threshold")]
    pub trigger_threshold: usize,

    /// Survivor count the evacuation prompt asks the model to keep.
    #[serde(default = "default_target_survivors")]
    pub target_survivors: usize,

    /// Number of conversational pairs in the extended evacuation window.
    #[serde(default = "default_evacuation_window_pairs")]
    pub window_pairs: usize,
}

impl Default for EvacuationConfig {
    fn default() -> Self {
        Self {
            model: default_evacuation_model(),
            trigger_threshold: default_trigger_threshold(),
            target_survivors: default_target_survivors(),
            window_pairs: default_evacuation_window_pairs(),
        }
    }
}

fn default_evacuation_model() -> String {
    "claude-haiku-4-5-20250901".to_string()
}

fn default_trigger_threshold() -> usize {
    30
}

fn default_target_survivors() -> usize {
    15
}

fn default_evacuation_window_pairs() -> usize {
    10
}

/// Entity extraction and clustering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EntitiesConfig {
    /// Minimum normalized edit ratio for two entity names to cluster (0.0-1.0).
    #[serde(default = "default_cluster_threshold")]
    pub similarity_threshold: f64,
}

impl Default for EntitiesConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_cluster_threshold(),
        }
    }
}

fn default_cluster_threshold() -> f64 {
    0.85
}

/// Entity garbage collection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EntityGcConfig {
    /// Model used for GC review calls.
    #[serde(default = "default_gc_model")]
    pub model: String,

    /// Days without a new link before an entity counts as dormant.
    #[serde(default = "default_dormancy_days")]
    pub dormancy_days: u32,

    /// Lower bound of the link-count band for GC eligibility.
    #[serde(default = "default_min_links")]
    pub min_links: u32,

    /// Upper bound of the link-count band for GC eligibility.
    #[serde(default = "default_max_links")]
    pub max_links: u32,

    /// Wide-net size of the entity vector search feeding candidate scoring.
    #[serde(default = "default_candidate_pool")]
    pub candidate_pool: usize,

    /// Minimum name similarity a merge candidate must pass on its own (0.0-1.0).
    #[serde(default = "default_string_threshold")]
    pub string_threshold: f64,

    /// Minimum linked-memory Jaccard a merge candidate must pass on its own (0.0-1.0).
    #[serde(default = "default_cooccurrence_threshold")]
    pub cooccurrence_threshold: f64,

    /// Maximum scored candidates presented per review call.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,

    /// Maximum linked memories quoted per review call.
    #[serde(default = "default_sample_memories")]
    pub sample_memories: usize,
}

impl Default for EntityGcConfig {
    fn default() -> Self {
        Self {
            model: default_gc_model(),
            dormancy_days: default_dormancy_days(),
            min_links: default_min_links(),
            max_links: default_max_links(),
            candidate_pool: default_candidate_pool(),
            string_threshold: default_string_threshold(),
            cooccurrence_threshold: default_cooccurrence_threshold(),
            max_candidates: default_max_candidates(),
            sample_memories: default_sample_memories(),
        }
    }
}

fn default_gc_model() -> String {
    "claude-haiku-4-5-20250901".to_string()
}

fn default_dormancy_days() -> u32 {
    30
}

fn default_min_links() -> u32 {
    2
}

fn default_max_links() -> u32 {
    200
}

fn default_candidate_pool() -> usize {
    50
}

fn default_string_threshold() -> f64 {
    0.6
}

fn default_cooccurrence_threshold() -> f64 {
    0.2
}

fn default_max_candidates() -> usize {
    5
}

fn default_sample_memories() -> usize {
    5
}
