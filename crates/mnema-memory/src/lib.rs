// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory retrieval and retention for the Mnema engine.
//!
//! Implements the per-turn memory path: fingerprint generation, hybrid
//! search with RRF fusion, proactive surfacing with link-graph expansion,
//! pure retention/merge, and batch evacuation of oversized pinned sets.
//!
//! ## Architecture
//!
//! - **FingerprintGenerator**: LLM query expansion + retention decisions
//! - **HybridSearcher**: lexical + vector fusion over the store primitives
//! - **SurfacingService**: search, link expansion, link-aware rerank
//! - **retention**: pure pin-filter and merge helpers
//! - **MemoryEvacuator**: LLM-judged batch eviction
//! - **scoring**: RRF, sigmoid normalization, similarity primitives
//! - **window**: bounded conversation windows for prompts

pub mod evacuation;
pub mod fingerprint;
pub mod retention;
pub mod retrieval;
pub mod scoring;
pub mod surfacing;
pub mod types;
pub mod window;

pub use evacuation::MemoryEvacuator;
pub use fingerprint::{Fingerprint, FingerprintGenerator};
pub use retention::{apply_retention, merge_memories};
pub use retrieval::HybridSearcher;
pub use surfacing::SurfacingService;
pub use types::{LinkMetadata, LinkedMemory, SurfacedMemory};
