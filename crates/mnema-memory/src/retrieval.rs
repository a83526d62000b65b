// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hybrid retrieval: lexical and vector search fused with RRF.
//!
//! The store exposes two ranked primitives, keyword search and vector
//! similarity search. The searcher runs both, fuses the rankings with
//! Reciprocal Rank Fusion (k=60), maps the raw fused score through a
//! sigmoid into [0,1], and filters by importance. Raw RRF and raw cosine
//! ride along on each result for diagnostics; only the normalized score
//! drives downstream decisions.

use std::collections::HashMap;
use std::sync::Arc;

use mnema_config::model::RetrievalConfig;
use mnema_core::error::MnemaError;
use mnema_core::traits::MemoryStore;
use mnema_core::types::UserId;
use tracing::debug;

use crate::scoring::{reciprocal_rank_fusion, sigmoid_normalize};
use crate::types::SurfacedMemory;

/// Fuses the store's two ranked search primitives into one scored list.
pub struct HybridSearcher {
    store: Arc<dyn MemoryStore>,
    config: RetrievalConfig,
}

impl HybridSearcher {
    pub fn new(store: Arc<dyn MemoryStore>, config: RetrievalConfig) -> Self {
        Self { store, config }
    }

    /// Run hybrid search for an already-embedded query.
    ///
    /// Both legs are oversampled at twice the requested limit so the
    /// importance filter cannot starve the result set, then the fused
    /// list is cut back to `limit`. Results are ordered by normalized
    /// score descending.
    pub async fn search(
        &self,
        user: &UserId,
        query_text: &str,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<SurfacedMemory>, MnemaError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let oversample = limit * 2;

        let lexical = self
            .store
            .search_lexical(user, query_text, oversample)
            .await?;
        let vector = self
            .store
            .search_vector(
                user,
                query_embedding,
                oversample,
                self.config.similarity_threshold,
            )
            .await?;

        // Raw cosines from the vector leg, reattached to the fused results.
        let cosine_by_id: HashMap<&str, f32> =
            vector.iter().map(|(id, sim)| (id.as_str(), *sim)).collect();

        let fused = reciprocal_rank_fusion(&lexical, &vector);
        if fused.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = fused.iter().map(|(id, _)| id.clone()).collect();
        let memories = self.store.get_memories_by_ids(user, &ids).await?;
        let mut memory_by_id: HashMap<String, _> = memories
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();

        let mut results = Vec::with_capacity(fused.len());
        for (id, fusion_score) in &fused {
            let Some(memory) = memory_by_id.remove(id) else {
                // Fetched set can be smaller than the fused ranking when a
                // memory was archived between the search and the fetch.
                continue;
            };
            if memory.importance < self.config.min_importance {
                continue;
            }
            let similarity = sigmoid_normalize(
                *fusion_score,
                self.config.sigmoid_midpoint,
                self.config.sigmoid_steepness,
            );
            let vector_similarity = cosine_by_id.get(id.as_str()).copied();
            results.push(SurfacedMemory::new(
                memory,
                similarity,
                *fusion_score,
                vector_similarity,
            ));
        }
        results.truncate(limit);

        debug!(
            lexical = lexical.len(),
            vector = vector.len(),
            surfaced = results.len(),
            "hybrid search complete"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnema_core::memory::Memory;
    use mnema_test_utils::InMemoryStore;

    fn unit_vec(direction: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; 8];
        v[direction] = 1.0;
        v
    }

    async fn seeded_store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        let user = UserId("u1".to_string());

        let mut tea = Memory::new("u1", "the user drinks green tea every morning");
        tea.id = "aaaaaaaa-0000-0000-0000-000000000001".to_string();
        tea.embedding = Some(unit_vec(0));
        tea.set_importance(0.8);
        store.insert_memory(&user, tea).await;

        let mut coffee = Memory::new("u1", "the user quit coffee last year");
        coffee.id = "bbbbbbbb-0000-0000-0000-000000000002".to_string();
        coffee.embedding = Some(unit_vec(1));
        coffee.set_importance(0.6);
        store.insert_memory(&user, coffee).await;

        let mut trivia = Memory::new("u1", "tea trivia: tea plants are camellias");
        trivia.id = "cccccccc-0000-0000-0000-000000000003".to_string();
        trivia.embedding = Some(unit_vec(2));
        trivia.set_importance(0.1);
        store.insert_memory(&user, trivia).await;

        store
    }

    #[tokio::test]
    async fn fuses_lexical_and_vector_results() {
        let store = seeded_store().await;
        let searcher = HybridSearcher::new(store, RetrievalConfig::default());
        let user = UserId("u1".to_string());

        // Query vector points at the tea memory; the word matches it too.
        let results = searcher.search(&user, "tea", &unit_vec(0), 5).await.unwrap();
        assert!(!results.is_empty());
        assert_eq!(
            results[0].memory.id,
            "aaaaaaaa-0000-0000-0000-000000000001"
        );
        // Appears in both legs: raw cosine rides along.
        assert!(results[0].vector_similarity.is_some());
        assert!(results[0].fusion_score > 0.0);
        assert!((0.0..=1.0).contains(&results[0].similarity_score));
    }

    #[tokio::test]
    async fn lexical_only_match_has_no_vector_similarity() {
        let store = seeded_store().await;
        let searcher = HybridSearcher::new(store, RetrievalConfig::default());
        let user = UserId("u1".to_string());

        // Query vector orthogonal to every stored embedding.
        let results = searcher
            .search(&user, "coffee", &unit_vec(7), 5)
            .await
            .unwrap();
        let coffee = results
            .iter()
            .find(|m| m.memory.id.starts_with("bbbbbbbb"))
            .expect("lexical match should surface");
        assert!(coffee.vector_similarity.is_none());
    }

    #[tokio::test]
    async fn min_importance_filters_low_importance_memories() {
        let store = seeded_store().await;
        let config = RetrievalConfig {
            min_importance: 0.5,
            ..RetrievalConfig::default()
        };
        let searcher = HybridSearcher::new(store, config);
        let user = UserId("u1".to_string());

        let results = searcher.search(&user, "tea", &unit_vec(2), 5).await.unwrap();
        assert!(
            results.iter().all(|m| m.memory.importance >= 0.5),
            "no surfaced memory may fall below min_importance"
        );
        assert!(
            !results.iter().any(|m| m.memory.id.starts_with("cccccccc")),
            "the trivia memory is below the floor"
        );
    }

    #[tokio::test]
    async fn respects_limit_after_filtering() {
        let store = seeded_store().await;
        let searcher = HybridSearcher::new(store, RetrievalConfig::default());
        let user = UserId("u1".to_string());

        let results = searcher.search(&user, "tea", &unit_vec(0), 1).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn zero_limit_returns_empty() {
        let store = seeded_store().await;
        let searcher = HybridSearcher::new(store, RetrievalConfig::default());
        let user = UserId("u1".to_string());
        let results = searcher.search(&user, "tea", &unit_vec(0), 0).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn no_matches_returns_empty() {
        let store = seeded_store().await;
        let searcher = HybridSearcher::new(store, RetrievalConfig::default());
        let user = UserId("u1".to_string());
        let results = searcher
            .search(&user, "zzzz qqqq", &unit_vec(7), 5)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn other_users_memories_never_surface() {
        let store = seeded_store().await;
        let searcher = HybridSearcher::new(store, RetrievalConfig::default());
        let stranger = UserId("u2".to_string());
        let results = searcher
            .search(&stranger, "tea", &unit_vec(0), 5)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
