// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store adapter trait for the memory and entity persistence backend.

use async_trait::async_trait;

use crate::entity::{Entity, EntityType};
use crate::error::MnemaError;
use crate::memory::{Memory, RelatedMemory};
use crate::traits::adapter::PluginAdapter;
use crate::types::UserId;

/// Adapter for the persistence backend holding memories, entities, and the
/// link graph.
///
/// Every method takes a [`UserId`]; implementations must guarantee that no
/// call ever reads or writes across user boundaries. The core holds no state
/// of its own and relies on this isolation instead of locking.
///
/// The two search methods return ranked id lists, most relevant first. Score
/// values are backend-specific and only the ordering is meaningful to the
/// caller; rank fusion happens in the core.
#[async_trait]
pub trait MemoryStore: PluginAdapter {
    /// Keyword search over memory text. Returns (id, score) ordered most
    /// relevant first.
    async fn search_lexical(
        &self,
        user: &UserId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<(String, f64)>, MnemaError>;

    /// Vector similarity search over memory embeddings. Returns
    /// (id, cosine similarity) at or above `threshold`, ordered descending.
    async fn search_vector(
        &self,
        user: &UserId,
        embedding: &[f32],
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<(String, f32)>, MnemaError>;

    /// Fetches full memory records, preserving the order of `ids`. Missing
    /// and archived ids are silently omitted.
    async fn get_memories_by_ids(
        &self,
        user: &UserId,
        ids: &[String],
    ) -> Result<Vec<Memory>, MnemaError>;

    /// Walks the link graph outward from one memory up to `depth` hops,
    /// returning every reached memory with its edge metadata. The seed
    /// itself is not included.
    async fn traverse_related(
        &self,
        user: &UserId,
        memory_id: &str,
        depth: u32,
    ) -> Result<Vec<RelatedMemory>, MnemaError>;

    /// Records a retrieval hit: bumps access count and touches the
    /// last-accessed timestamp.
    async fn update_access_stats(
        &self,
        user: &UserId,
        memory_id: &str,
    ) -> Result<(), MnemaError>;

    /// Finds entities eligible for GC review: no link newer than
    /// `dormancy_days` and a link count within [min_links, max_links].
    async fn find_dormant_entities(
        &self,
        user: &UserId,
        dormancy_days: u32,
        min_links: u32,
        max_links: u32,
    ) -> Result<Vec<Entity>, MnemaError>;

    /// Vector similarity search over entity embeddings, restricted to one
    /// entity type. Returns (entity, cosine similarity) pairs at or above
    /// `threshold`, ordered by similarity descending.
    async fn vector_search_entities(
        &self,
        user: &UserId,
        embedding: &[f32],
        entity_type: EntityType,
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<(Entity, f32)>, MnemaError>;

    /// All memories linked to an entity. Callers slice samples and id sets
    /// out of the full list.
    async fn get_memories_for_entity(
        &self,
        user: &UserId,
        entity_id: &str,
    ) -> Result<Vec<Memory>, MnemaError>;

    /// Redirects every link of `source_id` onto `target_id`, then archives
    /// the source entity.
    async fn merge_entities(
        &self,
        user: &UserId,
        source_id: &str,
        target_id: &str,
    ) -> Result<(), MnemaError>;

    /// Soft-deletes an entity. Linked memories are untouched.
    async fn archive_entity(&self, user: &UserId, entity_id: &str) -> Result<(), MnemaError>;
}
