// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity extraction, fuzzy clustering, and garbage collection.
//!
//! Memories are linked to named entities so related facts stay reachable
//! from each other. This crate covers that pipeline end to end: pulling
//! typed entity mentions out of text ([`extract`]), collapsing spelling
//! variants onto a canonical name ([`cluster`]), and periodically merging
//! or retiring entities that went dormant ([`gc`]).

pub mod cluster;
pub mod extract;
pub mod gc;

pub use cluster::{
    SharedEntity, cluster_similar_entities, find_shared_entities, name_similarity,
};
pub use extract::{EntityExtractor, ExtractedEntity, normalize_name};
pub use gc::{EntityGcService, GcReport, MergeCandidate};
