// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Transient retrieval records.
//!
//! These carry the per-search fields (fused score, raw signals, attached
//! link-graph children) that never persist. They wrap the stored
//! [`Memory`] record instead of mutating it.

use mnema_core::memory::Memory;
use serde::{Deserialize, Serialize};

/// A memory surfaced by hybrid search, with its retrieval scores and any
/// link-graph children attached during expansion.
///
/// Serializes to the nested structure the orchestration layer consumes:
/// the memory's own fields flattened at the top level, children under
/// `linked_memories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfacedMemory {
    #[serde(flatten)]
    pub memory: Memory,
    /// Sigmoid-normalized fused relevance in [0,1]. The only retrieval
    /// score decision logic reads.
    pub similarity_score: f32,
    /// Raw RRF score before normalization. Kept for debugging and logging.
    pub fusion_score: f32,
    /// Raw cosine similarity from the vector leg. `None` when this memory
    /// was only reached through the lexical leg.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_similarity: Option<f32>,
    /// Link-graph children attached during expansion, ordered by
    /// link-aware rerank score descending.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub linked_memories: Vec<LinkedMemory>,
}

impl SurfacedMemory {
    /// Wraps a stored memory with its retrieval scores, clamping the
    /// normalized score into [0,1].
    pub fn new(
        memory: Memory,
        similarity_score: f32,
        fusion_score: f32,
        vector_similarity: Option<f32>,
    ) -> Self {
        Self {
            memory,
            similarity_score: similarity_score.clamp(0.0, 1.0),
            fusion_score,
            vector_similarity,
            linked_memories: Vec::new(),
        }
    }

    /// The 8-char short id used in prompts, if the id can be shortened.
    pub fn short_id(&self) -> Option<String> {
        self.memory.short_id()
    }
}

/// A secondary memory reached via link-graph expansion from a primary
/// result, with the edge metadata that justified attaching it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedMemory {
    #[serde(flatten)]
    pub memory: Memory,
    pub link_metadata: LinkMetadata,
    /// Link-aware rerank score: type weight × inherited importance ×
    /// link confidence. Orders children under one primary.
    pub link_score: f32,
}

/// How a linked memory was reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkMetadata {
    /// Edge type as a string; traversal may synthesize types (such as
    /// `shares_entity`) or subtyped forms (`supersedes:partial`) that are
    /// never stored.
    pub link_type: String,
    /// Edge confidence where the store has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Traversal distance from the primary, 1 for direct links.
    pub depth: u32,
    /// Id of the memory this one was reached from.
    pub linked_from: String,
}
