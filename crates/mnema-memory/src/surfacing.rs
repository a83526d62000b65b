// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proactive surfacing: hybrid search plus link-graph expansion.
//!
//! Primaries come from hybrid search. Each primary is then expanded
//! through the link graph and its children are reranked by link type,
//! inherited importance, and link confidence. Children never displace
//! primaries; they hang off them as `linked_memories`.

use std::collections::HashSet;
use std::sync::Arc;

use mnema_config::model::{EmbeddingConfig, RetrievalConfig};
use mnema_core::error::MnemaError;
use mnema_core::memory::RelatedMemory;
use mnema_core::traits::MemoryStore;
use mnema_core::types::UserId;
use tracing::{debug, warn};

use crate::retrieval::HybridSearcher;
use crate::types::{LinkMetadata, LinkedMemory, SurfacedMemory};

/// Children whose stored link confidence falls below this are dropped from
/// expansion. Links without a confidence value pass the gate.
const MIN_LINK_CONFIDENCE: f32 = 0.6;

/// Weight a link type contributes to a child's rerank score.
///
/// Contradiction-shaped links rank highest: a conflicting memory next to
/// the one it conflicts with is exactly what the assistant must see.
/// Subtyped forms (`supersedes:partial`) take their base type's weight.
pub fn link_type_weight(link_type: &str) -> f32 {
    let base = link_type.split(':').next().unwrap_or(link_type);
    match base {
        "conflicts" | "invalidated_by" => 1.0,
        "supersedes" => 0.9,
        "causes" | "motivated_by" => 0.8,
        "instance_of" => 0.7,
        "shares_entity" => 0.4,
        _ => 0.5,
    }
}

/// Surfaces memories for a turn: hybrid search, link expansion, rerank,
/// access tracking.
pub struct SurfacingService {
    store: Arc<dyn MemoryStore>,
    searcher: HybridSearcher,
    retrieval: RetrievalConfig,
    embedding: EmbeddingConfig,
}

impl SurfacingService {
    pub fn new(
        store: Arc<dyn MemoryStore>,
        retrieval: RetrievalConfig,
        embedding: EmbeddingConfig,
    ) -> Self {
        let searcher = HybridSearcher::new(store.clone(), retrieval.clone());
        Self {
            store,
            searcher,
            retrieval,
            embedding,
        }
    }

    /// Surface memories for an already-embedded fingerprint.
    ///
    /// The embedding width must match the configured memory width exactly;
    /// a mismatch is an input error, never silently truncated or padded.
    pub async fn search_with_embedding(
        &self,
        user: &UserId,
        embedding: &[f32],
        fingerprint_text: &str,
        limit: usize,
    ) -> Result<Vec<SurfacedMemory>, MnemaError> {
        if embedding.len() != self.embedding.memory_dimensions {
            return Err(MnemaError::InvalidInput(format!(
                "query embedding has {} dimensions, expected {}",
                embedding.len(),
                self.embedding.memory_dimensions
            )));
        }

        let mut primaries = self
            .searcher
            .search(user, fingerprint_text, embedding, limit)
            .await?;

        if self.retrieval.link_depth > 0 && !primaries.is_empty() {
            self.expand_links(user, &mut primaries).await?;
        }

        // Access tracking is best effort: a failed stat bump must never
        // cost the turn its memories.
        for primary in &primaries {
            if let Err(e) = self
                .store
                .update_access_stats(user, &primary.memory.id)
                .await
            {
                warn!(
                    memory_id = %primary.memory.id,
                    error = %e,
                    "failed to update access stats"
                );
            }
        }

        debug!(
            surfaced = primaries.len(),
            linked = primaries
                .iter()
                .map(|p| p.linked_memories.len())
                .sum::<usize>(),
            "surfacing complete"
        );
        Ok(primaries)
    }

    /// Attach link-graph children to each primary, reranked.
    ///
    /// A child already surfaced as a primary is dropped; the same child
    /// reached from two different primaries attaches to both. Primary
    /// ordering is never touched.
    async fn expand_links(
        &self,
        user: &UserId,
        primaries: &mut [SurfacedMemory],
    ) -> Result<(), MnemaError> {
        let primary_ids: HashSet<String> =
            primaries.iter().map(|p| p.memory.id.clone()).collect();

        for primary in primaries.iter_mut() {
            let related = self
                .store
                .traverse_related(user, &primary.memory.id, self.retrieval.link_depth)
                .await?;

            let mut children: Vec<LinkedMemory> = related
                .into_iter()
                .filter_map(|r| rerank_child(r, primary.memory.importance, &primary_ids))
                .collect();

            children.sort_by(|a, b| {
                b.link_score
                    .partial_cmp(&a.link_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.memory.id.cmp(&b.memory.id))
            });
            primary.linked_memories = children;
        }
        Ok(())
    }
}

/// Score one traversed child against its parent, or drop it.
///
/// final = type_weight × (0.7·child importance + 0.3·parent importance)
///         × link confidence (1.0 when the edge has none).
fn rerank_child(
    related: RelatedMemory,
    parent_importance: f32,
    primary_ids: &HashSet<String>,
) -> Option<LinkedMemory> {
    if primary_ids.contains(&related.memory.id) {
        return None;
    }
    if let Some(confidence) = related.link_confidence {
        if confidence < MIN_LINK_CONFIDENCE {
            return None;
        }
    }

    let weight = link_type_weight(&related.link_type);
    let inherited = 0.7 * related.memory.importance + 0.3 * parent_importance;
    let link_score = weight * inherited * related.link_confidence.unwrap_or(1.0);

    Some(LinkedMemory {
        memory: related.memory,
        link_metadata: LinkMetadata {
            link_type: related.link_type,
            confidence: related.link_confidence,
            reasoning: related.reasoning,
            depth: related.depth,
            linked_from: related.linked_from,
        },
        link_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnema_core::memory::{LinkType, Memory, MemoryLink};
    use mnema_test_utils::InMemoryStore;

    fn embedding_for(dimensions: usize, direction: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; dimensions];
        v[direction % dimensions] = 1.0;
        v
    }

    fn test_config() -> (RetrievalConfig, EmbeddingConfig) {
        let retrieval = RetrievalConfig::default();
        let embedding = EmbeddingConfig {
            memory_dimensions: 8,
            entity_dimensions: 4,
        };
        (retrieval, embedding)
    }

    async fn linked_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        let user = UserId("u1".to_string());

        let mut seed = Memory::new("u1", "the user moved to Lisbon in March");
        seed.id = "aaaaaaaa-0000-0000-0000-000000000001".to_string();
        seed.embedding = Some(embedding_for(8, 0));
        seed.set_importance(0.8);

        let mut conflicting = Memory::new("u1", "the user said they live in Porto");
        conflicting.id = "bbbbbbbb-0000-0000-0000-000000000002".to_string();
        conflicting.set_importance(0.6);

        let mut weak = Memory::new("u1", "the user once mentioned Portugal");
        weak.id = "cccccccc-0000-0000-0000-000000000003".to_string();
        weak.set_importance(0.9);

        store.insert_memory(&user, seed).await;
        store.insert_memory(&user, conflicting).await;
        store.insert_memory(&user, weak).await;

        let mut conflict_link = MemoryLink::new(
            "aaaaaaaa-0000-0000-0000-000000000001",
            "bbbbbbbb-0000-0000-0000-000000000002",
            LinkType::Conflicts,
        );
        conflict_link.confidence = 0.9;
        store.insert_link(&user, conflict_link).await;

        let mut weak_link = MemoryLink::new(
            "aaaaaaaa-0000-0000-0000-000000000001",
            "cccccccc-0000-0000-0000-000000000003",
            LinkType::Causes,
        );
        weak_link.confidence = 0.3;
        store.insert_link(&user, weak_link).await;

        store
    }

    #[tokio::test]
    async fn rejects_wrong_embedding_width() {
        let store = Arc::new(InMemoryStore::new());
        let (retrieval, embedding) = test_config();
        let service = SurfacingService::new(store, retrieval, embedding);
        let user = UserId("u1".to_string());

        let err = service
            .search_with_embedding(&user, &[0.0f32; 3], "query", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, MnemaError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn attaches_linked_children_with_metadata() {
        let store = linked_store().await;
        let (retrieval, embedding) = test_config();
        let service = SurfacingService::new(store, retrieval, embedding);
        let user = UserId("u1".to_string());

        let results = service
            .search_with_embedding(&user, &embedding_for(8, 0), "moved Lisbon March", 1)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        let primary = &results[0];
        assert!(primary.memory.id.starts_with("aaaaaaaa"));

        // The conflicts child passes the gate, the 0.3-confidence child does not.
        assert_eq!(primary.linked_memories.len(), 1);
        let child = &primary.linked_memories[0];
        assert!(child.memory.id.starts_with("bbbbbbbb"));
        assert_eq!(child.link_metadata.link_type, "conflicts");
        assert_eq!(child.link_metadata.depth, 1);
        assert_eq!(
            child.link_metadata.linked_from,
            "aaaaaaaa-0000-0000-0000-000000000001"
        );

        // 1.0 (conflicts) * (0.7*0.6 + 0.3*0.8) * 0.9
        let expected = 1.0 * (0.7 * 0.6 + 0.3 * 0.8) * 0.9;
        assert!((child.link_score - expected).abs() < 1e-5);
    }

    #[tokio::test]
    async fn children_already_surfaced_as_primaries_are_dropped() {
        let store = linked_store().await;
        let user = UserId("u1".to_string());

        // Give the conflicting memory an embedding so it surfaces as a
        // primary alongside the seed.
        let mut conflicting = store
            .get_memory(&user, "bbbbbbbb-0000-0000-0000-000000000002")
            .await
            .unwrap();
        conflicting.embedding = Some(embedding_for(8, 0));
        store.insert_memory(&user, conflicting).await;

        let (retrieval, embedding) = test_config();
        let service = SurfacingService::new(store, retrieval, embedding);

        let results = service
            .search_with_embedding(&user, &embedding_for(8, 0), "Lisbon Porto live", 5)
            .await
            .unwrap();
        let surfaced_ids: HashSet<&str> =
            results.iter().map(|m| m.memory.id.as_str()).collect();
        assert!(surfaced_ids.contains("bbbbbbbb-0000-0000-0000-000000000002"));

        for primary in &results {
            for child in &primary.linked_memories {
                assert!(
                    !surfaced_ids.contains(child.memory.id.as_str()),
                    "child {} duplicates a primary",
                    child.memory.id
                );
            }
        }
    }

    #[tokio::test]
    async fn access_stats_bumped_for_primaries_only() {
        let store = linked_store().await;
        let (retrieval, embedding) = test_config();
        let service = SurfacingService::new(store.clone(), retrieval, embedding);
        let user = UserId("u1".to_string());

        service
            .search_with_embedding(&user, &embedding_for(8, 0), "moved Lisbon March", 1)
            .await
            .unwrap();

        let seed = store
            .get_memory(&user, "aaaaaaaa-0000-0000-0000-000000000001")
            .await
            .unwrap();
        assert_eq!(seed.access_count, 1);
        assert!(seed.last_accessed_at.is_some());

        // The linked child was attached, not surfaced: untouched.
        let child = store
            .get_memory(&user, "bbbbbbbb-0000-0000-0000-000000000002")
            .await
            .unwrap();
        assert_eq!(child.access_count, 0);
    }

    #[tokio::test]
    async fn access_stats_failure_never_fails_the_search() {
        let store = linked_store().await;
        store.set_fail_access_stats(true);
        let (retrieval, embedding) = test_config();
        let service = SurfacingService::new(store, retrieval, embedding);
        let user = UserId("u1".to_string());

        let results = service
            .search_with_embedding(&user, &embedding_for(8, 0), "moved Lisbon March", 1)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn zero_link_depth_skips_expansion() {
        let store = linked_store().await;
        let (mut retrieval, embedding) = test_config();
        retrieval.link_depth = 0;
        let service = SurfacingService::new(store, retrieval, embedding);
        let user = UserId("u1".to_string());

        let results = service
            .search_with_embedding(&user, &embedding_for(8, 0), "moved Lisbon March", 1)
            .await
            .unwrap();
        assert!(results[0].linked_memories.is_empty());
    }

    #[test]
    fn link_weights_rank_contradictions_highest() {
        assert_eq!(link_type_weight("conflicts"), 1.0);
        assert_eq!(link_type_weight("invalidated_by"), 1.0);
        assert_eq!(link_type_weight("supersedes"), 0.9);
        assert_eq!(link_type_weight("causes"), 0.8);
        assert_eq!(link_type_weight("motivated_by"), 0.8);
        assert_eq!(link_type_weight("instance_of"), 0.7);
        assert_eq!(link_type_weight("shares_entity"), 0.4);
        assert_eq!(link_type_weight("never_heard_of_it"), 0.5);
    }

    #[test]
    fn subtyped_links_take_their_base_weight() {
        assert_eq!(link_type_weight("supersedes:partial"), 0.9);
        assert_eq!(link_type_weight("conflicts:temporal"), 1.0);
        assert_eq!(link_type_weight("unknown:subtype"), 0.5);
    }

    #[test]
    fn rerank_drops_low_confidence_and_keeps_confidenceless() {
        let primary_ids = HashSet::new();
        let child = Memory::new("u1", "child");

        let gated = RelatedMemory {
            memory: child.clone(),
            link_type: "causes".to_string(),
            link_confidence: Some(0.59),
            reasoning: None,
            depth: 1,
            linked_from: "parent".to_string(),
        };
        assert!(rerank_child(gated, 0.5, &primary_ids).is_none());

        let confidenceless = RelatedMemory {
            memory: child,
            link_type: "shares_entity".to_string(),
            link_confidence: None,
            reasoning: None,
            depth: 1,
            linked_from: "parent".to_string(),
        };
        let kept = rerank_child(confidenceless, 0.5, &primary_ids).expect("kept");
        // Confidence multiplier defaults to 1.0.
        let expected = 0.4 * (0.7 * 0.5 + 0.3 * 0.5);
        assert!((kept.link_score - expected).abs() < 1e-6);
    }
}
