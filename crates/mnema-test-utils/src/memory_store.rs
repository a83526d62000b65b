// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reference `MemoryStore` implementation over in-memory tables.
//!
//! Lexical search is naive token overlap and vector search is exact
//! cosine over every row; only the ranking contract matters to callers.
//! Link traversal walks stored links in both directions and synthesizes
//! `shares_entity` edges between memories linked to the same entity.
//! BTreeMap tables keep iteration order deterministic across runs.

use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use mnema_core::entity::{Entity, EntityType};
use mnema_core::error::MnemaError;
use mnema_core::memory::{Memory, RelatedMemory};
use mnema_core::traits::adapter::PluginAdapter;
use mnema_core::traits::store::MemoryStore;
use mnema_core::types::{AdapterType, HealthStatus, UserId};

#[derive(Default)]
struct Tables {
    memories: BTreeMap<String, Memory>,
    entities: BTreeMap<String, Entity>,
    /// entity id → ids of memories linked to it.
    entity_links: BTreeMap<String, BTreeSet<String>>,
}

/// In-memory `MemoryStore` for tests.
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    fail_access_stats: AtomicBool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            fail_access_stats: AtomicBool::new(false),
        }
    }

    /// Insert or replace a memory row.
    pub async fn insert_memory(&self, user: &UserId, mut memory: Memory) {
        memory.user_id = user.as_str().to_string();
        self.tables
            .lock()
            .await
            .memories
            .insert(memory.id.clone(), memory);
    }

    /// Record a link in both endpoints' link arrays.
    pub async fn insert_link(&self, user: &UserId, link: mnema_core::memory::MemoryLink) {
        let mut tables = self.tables.lock().await;
        if let Some(from) = tables.memories.get_mut(&link.from_id) {
            if from.user_id == user.as_str() {
                from.outbound_links.push(link.clone());
            }
        }
        if let Some(to) = tables.memories.get_mut(&link.to_id) {
            if to.user_id == user.as_str() {
                to.inbound_links.push(link);
            }
        }
    }

    /// Insert or replace an entity row.
    pub async fn insert_entity(&self, user: &UserId, mut entity: Entity) {
        entity.user_id = user.as_str().to_string();
        self.tables
            .lock()
            .await
            .entities
            .insert(entity.id.clone(), entity);
    }

    /// Record that a memory is linked to an entity.
    ///
    /// Only membership is recorded here; `link_count` and `last_linked_at`
    /// are seeded on the entity row directly so tests control dormancy.
    pub async fn link_memory_to_entity(&self, _user: &UserId, memory_id: &str, entity_id: &str) {
        self.tables
            .lock()
            .await
            .entity_links
            .entry(entity_id.to_string())
            .or_default()
            .insert(memory_id.to_string());
    }

    /// Snapshot of one memory row.
    pub async fn get_memory(&self, user: &UserId, id: &str) -> Option<Memory> {
        let tables = self.tables.lock().await;
        tables
            .memories
            .get(id)
            .filter(|m| m.user_id == user.as_str())
            .cloned()
    }

    /// Snapshot of one entity row.
    pub async fn get_entity(&self, user: &UserId, id: &str) -> Option<Entity> {
        let tables = self.tables.lock().await;
        tables
            .entities
            .get(id)
            .filter(|e| e.user_id == user.as_str())
            .cloned()
    }

    /// Make every `update_access_stats` call fail, for swallow-path tests.
    pub fn set_fail_access_stats(&self, fail: bool) {
        self.fail_access_stats.store(fail, Ordering::SeqCst);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric())
                .to_string()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

#[async_trait]
impl PluginAdapter for InMemoryStore {
    fn name(&self) -> &str {
        "in-memory-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Store
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemaError> {
        Ok(())
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn search_lexical(
        &self,
        user: &UserId,
        query: &str,
        limit: usize,
    ) -> Result<Vec<(String, f64)>, MnemaError> {
        let query_tokens: HashSet<String> = tokenize(query).into_iter().collect();
        if query_tokens.is_empty() {
            return Ok(Vec::new());
        }
        let tables = self.tables.lock().await;
        let mut scored: Vec<(String, f64)> = tables
            .memories
            .values()
            .filter(|m| m.user_id == user.as_str() && !m.archived)
            .filter_map(|m| {
                let overlap = tokenize(&m.text)
                    .into_iter()
                    .collect::<HashSet<_>>()
                    .intersection(&query_tokens)
                    .count();
                if overlap > 0 {
                    Some((m.id.clone(), overlap as f64))
                } else {
                    None
                }
            })
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn search_vector(
        &self,
        user: &UserId,
        embedding: &[f32],
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<(String, f32)>, MnemaError> {
        let tables = self.tables.lock().await;
        let mut scored: Vec<(String, f32)> = tables
            .memories
            .values()
            .filter(|m| m.user_id == user.as_str() && !m.archived)
            .filter_map(|m| {
                let stored = m.embedding.as_ref()?;
                let similarity = cosine(embedding, stored);
                if similarity >= threshold {
                    Some((m.id.clone(), similarity))
                } else {
                    None
                }
            })
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn get_memories_by_ids(
        &self,
        user: &UserId,
        ids: &[String],
    ) -> Result<Vec<Memory>, MnemaError> {
        let tables = self.tables.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.memories.get(id))
            .filter(|m| m.user_id == user.as_str() && !m.archived)
            .cloned()
            .collect())
    }

    async fn traverse_related(
        &self,
        user: &UserId,
        memory_id: &str,
        depth: u32,
    ) -> Result<Vec<RelatedMemory>, MnemaError> {
        let tables = self.tables.lock().await;
        let mut related = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        visited.insert(memory_id.to_string());
        let mut frontier: VecDeque<(String, u32)> = VecDeque::new();
        frontier.push_back((memory_id.to_string(), 0));

        while let Some((current_id, current_depth)) = frontier.pop_front() {
            if current_depth >= depth {
                continue;
            }
            let Some(current) = tables.memories.get(&current_id) else {
                continue;
            };

            // (neighbor id, link type, confidence, reasoning)
            let mut edges: Vec<(String, String, Option<f32>, Option<String>)> = Vec::new();
            for link in &current.outbound_links {
                edges.push((
                    link.to_id.clone(),
                    link.link_type.to_string(),
                    Some(link.confidence),
                    link.reasoning.clone(),
                ));
            }
            for link in &current.inbound_links {
                edges.push((
                    link.from_id.clone(),
                    link.link_type.to_string(),
                    Some(link.confidence),
                    link.reasoning.clone(),
                ));
            }
            for members in tables.entity_links.values() {
                if !members.contains(&current_id) {
                    continue;
                }
                for other in members {
                    if other != &current_id {
                        edges.push((other.clone(), "shares_entity".to_string(), None, None));
                    }
                }
            }

            for (neighbor_id, link_type, confidence, reasoning) in edges {
                if visited.contains(&neighbor_id) {
                    continue;
                }
                let Some(neighbor) = tables.memories.get(&neighbor_id) else {
                    continue;
                };
                if neighbor.user_id != user.as_str() || neighbor.archived {
                    continue;
                }
                visited.insert(neighbor_id.clone());
                related.push(RelatedMemory {
                    memory: neighbor.clone(),
                    link_type,
                    link_confidence: confidence,
                    reasoning,
                    depth: current_depth + 1,
                    linked_from: current_id.clone(),
                });
                frontier.push_back((neighbor_id, current_depth + 1));
            }
        }
        Ok(related)
    }

    async fn update_access_stats(
        &self,
        user: &UserId,
        memory_id: &str,
    ) -> Result<(), MnemaError> {
        if self.fail_access_stats.load(Ordering::SeqCst) {
            return Err(MnemaError::Internal(
                "access stats update failed".to_string(),
            ));
        }
        let mut tables = self.tables.lock().await;
        let memory = tables
            .memories
            .get_mut(memory_id)
            .filter(|m| m.user_id == user.as_str())
            .ok_or_else(|| MnemaError::InvalidInput(format!("no such memory: {memory_id}")))?;
        memory.access_count += 1;
        let now = Utc::now();
        memory.last_accessed_at = Some(now);
        memory.updated_at = now;
        // Each recall nudges importance upward; set_importance clamps at 1.0.
        let bumped = memory.importance + 0.01;
        memory.set_importance(bumped);
        Ok(())
    }

    async fn find_dormant_entities(
        &self,
        user: &UserId,
        dormancy_days: u32,
        min_links: u32,
        max_links: u32,
    ) -> Result<Vec<Entity>, MnemaError> {
        let cutoff = Utc::now() - Duration::days(i64::from(dormancy_days));
        let tables = self.tables.lock().await;
        Ok(tables
            .entities
            .values()
            .filter(|e| e.user_id == user.as_str() && !e.archived)
            .filter(|e| e.link_count >= min_links && e.link_count <= max_links)
            .filter(|e| match e.last_linked_at {
                Some(t) => t <= cutoff,
                // Never linked but inside the band: dormant.
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn vector_search_entities(
        &self,
        user: &UserId,
        embedding: &[f32],
        entity_type: EntityType,
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<(Entity, f32)>, MnemaError> {
        let tables = self.tables.lock().await;
        let mut scored: Vec<(Entity, f32)> = tables
            .entities
            .values()
            .filter(|e| {
                e.user_id == user.as_str() && !e.archived && e.entity_type == entity_type
            })
            .filter_map(|e| {
                let stored = e.embedding.as_ref()?;
                let similarity = cosine(embedding, stored);
                if similarity >= threshold {
                    Some((e.clone(), similarity))
                } else {
                    None
                }
            })
            .collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn get_memories_for_entity(
        &self,
        user: &UserId,
        entity_id: &str,
    ) -> Result<Vec<Memory>, MnemaError> {
        let tables = self.tables.lock().await;
        let Some(members) = tables.entity_links.get(entity_id) else {
            return Ok(Vec::new());
        };
        Ok(members
            .iter()
            .filter_map(|id| tables.memories.get(id))
            .filter(|m| m.user_id == user.as_str() && !m.archived)
            .cloned()
            .collect())
    }

    async fn merge_entities(
        &self,
        user: &UserId,
        source_id: &str,
        target_id: &str,
    ) -> Result<(), MnemaError> {
        let mut tables = self.tables.lock().await;
        for id in [source_id, target_id] {
            let known = tables
                .entities
                .get(id)
                .is_some_and(|e| e.user_id == user.as_str());
            if !known {
                return Err(MnemaError::InvalidInput(format!("no such entity: {id}")));
            }
        }

        let source_members = tables.entity_links.remove(source_id).unwrap_or_default();
        let target_members = tables.entity_links.entry(target_id.to_string()).or_default();
        target_members.extend(source_members);
        let merged_count = target_members.len() as u32;

        let now = Utc::now();
        if let Some(target) = tables.entities.get_mut(target_id) {
            target.link_count = merged_count;
            target.updated_at = now;
        }
        if let Some(source) = tables.entities.get_mut(source_id) {
            source.archived = true;
            source.link_count = 0;
            source.updated_at = now;
        }
        Ok(())
    }

    async fn archive_entity(&self, user: &UserId, entity_id: &str) -> Result<(), MnemaError> {
        let mut tables = self.tables.lock().await;
        let entity = tables
            .entities
            .get_mut(entity_id)
            .filter(|e| e.user_id == user.as_str())
            .ok_or_else(|| {
                MnemaError::InvalidInput(format!("no such entity: {entity_id}"))
            })?;
        entity.archived = true;
        entity.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnema_core::memory::{LinkType, MemoryLink};

    fn user() -> UserId {
        UserId::new("u1")
    }

    async fn store_with_memories() -> InMemoryStore {
        let store = InMemoryStore::new();
        let u = user();

        let mut a = Memory::new("u1", "the user adopted a cat named Miso");
        a.id = "aaaaaaaa-0000-0000-0000-000000000001".to_string();
        a.embedding = Some(vec![1.0, 0.0, 0.0]);
        store.insert_memory(&u, a).await;

        let mut b = Memory::new("u1", "the cat knocked over a plant");
        b.id = "bbbbbbbb-0000-0000-0000-000000000002".to_string();
        b.embedding = Some(vec![0.9, 0.1, 0.0]);
        store.insert_memory(&u, b).await;

        let mut c = Memory::new("u1", "the user works at a bakery");
        c.id = "cccccccc-0000-0000-0000-000000000003".to_string();
        c.embedding = Some(vec![0.0, 0.0, 1.0]);
        store.insert_memory(&u, c).await;

        store
    }

    #[tokio::test]
    async fn lexical_search_ranks_by_overlap() {
        let store = store_with_memories().await;
        let results = store.search_lexical(&user(), "the cat", 10).await.unwrap();
        assert_eq!(results.len(), 3);
        // Both cat memories mention "the" and "cat", the bakery one only "the".
        assert!(results[0].0.starts_with("aaaaaaaa") || results[0].0.starts_with("bbbbbbbb"));
        assert!(results[2].0.starts_with("cccccccc"));
        assert!(results[0].1 > results[2].1);
    }

    #[tokio::test]
    async fn vector_search_applies_threshold_and_order() {
        let store = store_with_memories().await;
        let results = store
            .search_vector(&user(), &[1.0, 0.0, 0.0], 10, 0.5)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].0.starts_with("aaaaaaaa"));
        assert!(results[0].1 > results[1].1);
    }

    #[tokio::test]
    async fn archived_memories_are_invisible() {
        let store = store_with_memories().await;
        let u = user();
        let mut archived = store
            .get_memory(&u, "aaaaaaaa-0000-0000-0000-000000000001")
            .await
            .unwrap();
        archived.archived = true;
        store.insert_memory(&u, archived).await;

        let lexical = store.search_lexical(&u, "cat", 10).await.unwrap();
        assert!(lexical.iter().all(|(id, _)| !id.starts_with("aaaaaaaa")));

        let fetched = store
            .get_memories_by_ids(&u, &["aaaaaaaa-0000-0000-0000-000000000001".to_string()])
            .await
            .unwrap();
        assert!(fetched.is_empty());
    }

    #[tokio::test]
    async fn get_memories_by_ids_preserves_requested_order() {
        let store = store_with_memories().await;
        let ids = vec![
            "cccccccc-0000-0000-0000-000000000003".to_string(),
            "missing".to_string(),
            "aaaaaaaa-0000-0000-0000-000000000001".to_string(),
        ];
        let memories = store.get_memories_by_ids(&user(), &ids).await.unwrap();
        assert_eq!(memories.len(), 2);
        assert!(memories[0].id.starts_with("cccccccc"));
        assert!(memories[1].id.starts_with("aaaaaaaa"));
    }

    #[tokio::test]
    async fn traversal_walks_both_directions_and_depths() {
        let store = store_with_memories().await;
        let u = user();
        store
            .insert_link(
                &u,
                MemoryLink::new(
                    "aaaaaaaa-0000-0000-0000-000000000001",
                    "bbbbbbbb-0000-0000-0000-000000000002",
                    LinkType::Causes,
                ),
            )
            .await;
        store
            .insert_link(
                &u,
                MemoryLink::new(
                    "cccccccc-0000-0000-0000-000000000003",
                    "bbbbbbbb-0000-0000-0000-000000000002",
                    LinkType::Conflicts,
                ),
            )
            .await;

        // Depth 1 from A reaches only B, via the outbound link.
        let related = store
            .traverse_related(&u, "aaaaaaaa-0000-0000-0000-000000000001", 1)
            .await
            .unwrap();
        assert_eq!(related.len(), 1);
        assert!(related[0].memory.id.starts_with("bbbbbbbb"));
        assert_eq!(related[0].link_type, "causes");
        assert_eq!(related[0].depth, 1);

        // Depth 2 also reaches C through B's inbound link.
        let related = store
            .traverse_related(&u, "aaaaaaaa-0000-0000-0000-000000000001", 2)
            .await
            .unwrap();
        assert_eq!(related.len(), 2);
        let c = related
            .iter()
            .find(|r| r.memory.id.starts_with("cccccccc"))
            .unwrap();
        assert_eq!(c.depth, 2);
        assert!(c.linked_from.starts_with("bbbbbbbb"));
    }

    #[tokio::test]
    async fn traversal_synthesizes_shared_entity_edges() {
        let store = store_with_memories().await;
        let u = user();
        store
            .link_memory_to_entity(&u, "aaaaaaaa-0000-0000-0000-000000000001", "entity-1")
            .await;
        store
            .link_memory_to_entity(&u, "cccccccc-0000-0000-0000-000000000003", "entity-1")
            .await;

        let related = store
            .traverse_related(&u, "aaaaaaaa-0000-0000-0000-000000000001", 1)
            .await
            .unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].link_type, "shares_entity");
        assert!(related[0].link_confidence.is_none());
    }

    #[tokio::test]
    async fn access_stats_bump_and_injected_failure() {
        let store = store_with_memories().await;
        let u = user();
        let id = "aaaaaaaa-0000-0000-0000-000000000001";
        store.update_access_stats(&u, id).await.unwrap();
        store.update_access_stats(&u, id).await.unwrap();
        let memory = store.get_memory(&u, id).await.unwrap();
        assert_eq!(memory.access_count, 2);
        assert!(memory.last_accessed_at.is_some());
        assert!((memory.importance - 0.52).abs() < 1e-6);

        store.set_fail_access_stats(true);
        assert!(store.update_access_stats(&u, id).await.is_err());
    }

    #[tokio::test]
    async fn dormancy_respects_band_and_age() {
        let store = InMemoryStore::new();
        let u = user();

        let mut dormant = Entity::new("u1", "Old Project", EntityType::Product);
        dormant.id = "d0000000-0000-0000-0000-000000000001".to_string();
        dormant.link_count = 5;
        dormant.last_linked_at = Some(Utc::now() - Duration::days(60));
        store.insert_entity(&u, dormant).await;

        let mut fresh = Entity::new("u1", "New Project", EntityType::Product);
        fresh.id = "f0000000-0000-0000-0000-000000000002".to_string();
        fresh.link_count = 5;
        fresh.last_linked_at = Some(Utc::now() - Duration::days(2));
        store.insert_entity(&u, fresh).await;

        let mut sparse = Entity::new("u1", "Mentioned Once", EntityType::Product);
        sparse.id = "s0000000-0000-0000-0000-000000000003".to_string();
        sparse.link_count = 1;
        sparse.last_linked_at = Some(Utc::now() - Duration::days(60));
        store.insert_entity(&u, sparse).await;

        let mut never_linked = Entity::new("u1", "Phantom", EntityType::Product);
        never_linked.id = "c0000000-0000-0000-0000-000000000004".to_string();
        never_linked.link_count = 3;
        store.insert_entity(&u, never_linked).await;

        let dormant = store
            .find_dormant_entities(&u, 30, 2, 200)
            .await
            .unwrap();
        let ids: Vec<&str> = dormant.iter().map(|e| e.id.as_str()).collect();
        assert!(ids.contains(&"d0000000-0000-0000-0000-000000000001"));
        assert!(ids.contains(&"c0000000-0000-0000-0000-000000000004"));
        assert!(!ids.contains(&"f0000000-0000-0000-0000-000000000002"));
        assert!(!ids.contains(&"s0000000-0000-0000-0000-000000000003"));
    }

    #[tokio::test]
    async fn merge_redirects_links_and_archives_source() {
        let store = store_with_memories().await;
        let u = user();

        let mut source = Entity::new("u1", "Acme Corp", EntityType::Organization);
        source.id = "e0000000-0000-0000-0000-000000000001".to_string();
        source.link_count = 1;
        store.insert_entity(&u, source).await;
        let mut target = Entity::new("u1", "Acme Corporation", EntityType::Organization);
        target.id = "e0000000-0000-0000-0000-000000000002".to_string();
        target.link_count = 1;
        store.insert_entity(&u, target).await;

        store
            .link_memory_to_entity(
                &u,
                "aaaaaaaa-0000-0000-0000-000000000001",
                "e0000000-0000-0000-0000-000000000001",
            )
            .await;
        store
            .link_memory_to_entity(
                &u,
                "bbbbbbbb-0000-0000-0000-000000000002",
                "e0000000-0000-0000-0000-000000000002",
            )
            .await;

        store
            .merge_entities(
                &u,
                "e0000000-0000-0000-0000-000000000001",
                "e0000000-0000-0000-0000-000000000002",
            )
            .await
            .unwrap();

        let source = store
            .get_entity(&u, "e0000000-0000-0000-0000-000000000001")
            .await
            .unwrap();
        assert!(source.archived);
        assert_eq!(source.link_count, 0);

        let target = store
            .get_entity(&u, "e0000000-0000-0000-0000-000000000002")
            .await
            .unwrap();
        assert!(!target.archived);
        assert_eq!(target.link_count, 2);

        let memories = store
            .get_memories_for_entity(&u, "e0000000-0000-0000-0000-000000000002")
            .await
            .unwrap();
        assert_eq!(memories.len(), 2);
    }

    #[tokio::test]
    async fn entity_search_filters_type_and_threshold() {
        let store = InMemoryStore::new();
        let u = user();

        let mut org = Entity::new("u1", "Acme", EntityType::Organization);
        org.id = "e0000000-0000-0000-0000-000000000001".to_string();
        org.embedding = Some(vec![1.0, 0.0]);
        store.insert_entity(&u, org).await;

        let mut person = Entity::new("u1", "Acme Smith", EntityType::Person);
        person.id = "e0000000-0000-0000-0000-000000000002".to_string();
        person.embedding = Some(vec![1.0, 0.0]);
        store.insert_entity(&u, person).await;

        let mut unembedded = Entity::new("u1", "Acme Two", EntityType::Organization);
        unembedded.id = "e0000000-0000-0000-0000-000000000003".to_string();
        store.insert_entity(&u, unembedded).await;

        let results = store
            .vector_search_entities(&u, &[1.0, 0.0], EntityType::Organization, 10, 0.5)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].0.id.ends_with("1"));
        assert!((results[0].1 - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn user_isolation_holds_across_all_reads() {
        let store = store_with_memories().await;
        let stranger = UserId::new("u2");
        assert!(store
            .search_lexical(&stranger, "cat", 10)
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .search_vector(&stranger, &[1.0, 0.0, 0.0], 10, 0.0)
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .get_memories_by_ids(
                &stranger,
                &["aaaaaaaa-0000-0000-0000-000000000001".to_string()]
            )
            .await
            .unwrap()
            .is_empty());
    }
}
