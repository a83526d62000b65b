// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity garbage collection: dormant-entity review and cleanup.
//!
//! Entities accumulate as conversations name people, places, and things;
//! many turn out to be duplicates under different spellings, or noise
//! that never recurs. On a schedule, entities that have gone dormant
//! (no new link in the dormancy window, link count inside a band) are
//! scored against possible duplicates on three independent signals and
//! put before an LLM reviewer whose default answer is keep.
//!
//! Each entity moves through active → dormant-eligible → one of
//! {merged, archived, kept}. The batch never aborts on a single bad
//! item; failures are counted and the job moves on.

use std::collections::HashSet;
use std::sync::Arc;

use mnema_config::model::EntityGcConfig;
use mnema_core::entity::Entity;
use mnema_core::error::MnemaError;
use mnema_core::traits::{MemoryStore, ProviderAdapter};
use mnema_core::types::{ContentBlock, ProviderMessage, ProviderRequest, UserId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cluster::name_similarity;

/// System prompt for the GC review call.
const GC_SYSTEM_PROMPT: &str = r#"You review dormant entities in a personal memory graph and decide their fate.

An entity is a named anchor (a person, place, organization, product) that memories link to. You are shown one dormant entity, a sample of the memories linked to it, and a scored list of possible duplicate entities.

Decide one of:
- keep: the entity is distinct and worth holding. This is the default; when in doubt, keep.
- merge: the entity is clearly the same real-world thing as one of the listed candidates, just spelled or abbreviated differently. Merge only when you are confident they are the same entity, not merely related ones.
- delete: the entity is noise: a misrecognized fragment, a typo that never recurred, not a real named thing.

Respond with a single JSON object:
{"action": "keep" | "merge" | "delete", "target": "<candidate id, required for merge>", "reason": "<one short sentence>"}"#;

/// User prompt template for the GC review call.
const GC_USER_PROMPT: &str = r#"Entity under review:
name: {name}
type: {entity_type}
linked memories: {link_count}
last linked: {last_linked}

Sample of linked memories:
{memories}

Merge candidates (scored, best first):
{candidates}"#;

/// A scored possible duplicate of a dormant entity.
///
/// Candidates only exist once both the string and co-occurrence gates
/// have passed independently; the combined score is for ranking, never
/// for compensating a failed gate.
#[derive(Debug, Clone)]
pub struct MergeCandidate {
    pub entity: Entity,
    /// Cosine similarity from the entity vector search.
    pub vector_score: f32,
    /// Normalized edit similarity of the two names.
    pub string_score: f64,
    /// Jaccard overlap of the two entities' linked-memory id sets.
    pub cooccurrence_score: f64,
    /// 0.4·vector + 0.3·string + 0.3·co-occurrence.
    pub combined_score: f64,
}

/// Outcome counts for one GC batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GcReport {
    pub merged: usize,
    pub deleted: usize,
    pub kept: usize,
    pub errors: usize,
}

enum GcOutcome {
    Merged,
    Deleted,
    Kept,
}

/// Parsed review decision from the model.
#[derive(Debug, Deserialize)]
struct ReviewDecision {
    action: String,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// Scheduled garbage collection over one user's dormant entities.
pub struct EntityGcService {
    store: Arc<dyn MemoryStore>,
    provider: Arc<dyn ProviderAdapter>,
    config: EntityGcConfig,
}

impl EntityGcService {
    /// Creates a GC service. Empty model name or a template missing its
    /// placeholders is a construction-time configuration error.
    pub fn new(
        store: Arc<dyn MemoryStore>,
        provider: Arc<dyn ProviderAdapter>,
        config: EntityGcConfig,
    ) -> Result<Self, MnemaError> {
        if config.model.trim().is_empty() {
            return Err(MnemaError::Config(
                "entity_gc.model must not be empty".to_string(),
            ));
        }
        for placeholder in [
            "{name}",
            "{entity_type}",
            "{link_count}",
            "{last_linked}",
            "{memories}",
            "{candidates}",
        ] {
            if !GC_USER_PROMPT.contains(placeholder) {
                return Err(MnemaError::Config(format!(
                    "entity gc user prompt is missing the {placeholder} placeholder"
                )));
            }
        }
        Ok(Self {
            store,
            provider,
            config,
        })
    }

    /// Run one GC batch for a user.
    ///
    /// Per-item failures are counted and logged; only a failure to list
    /// the dormant set at all aborts the run.
    pub async fn run(&self, user: &UserId) -> Result<GcReport, MnemaError> {
        let dormant = self
            .store
            .find_dormant_entities(
                user,
                self.config.dormancy_days,
                self.config.min_links,
                self.config.max_links,
            )
            .await?;
        info!(user = %user, candidates = dormant.len(), "entity gc batch start");

        let mut report = GcReport::default();
        for entity in dormant {
            match self.process_entity(user, &entity).await {
                Ok(GcOutcome::Merged) => report.merged += 1,
                Ok(GcOutcome::Deleted) => report.deleted += 1,
                Ok(GcOutcome::Kept) => report.kept += 1,
                Err(e) => {
                    warn!(entity_id = %entity.id, error = %e, "entity gc item failed");
                    report.errors += 1;
                }
            }
        }

        info!(
            merged = report.merged,
            deleted = report.deleted,
            kept = report.kept,
            errors = report.errors,
            "entity gc batch complete"
        );
        Ok(report)
    }

    async fn process_entity(
        &self,
        user: &UserId,
        entity: &Entity,
    ) -> Result<GcOutcome, MnemaError> {
        let candidates = self.find_merge_candidates(user, entity).await?;
        let decision = self.review_entity(user, entity, &candidates).await?;
        self.apply_decision(user, entity, &candidates, decision)
            .await
    }

    /// Score possible duplicates of a dormant entity.
    ///
    /// Without an embedding on the entity there is no vector signal and
    /// the search is skipped entirely; no candidates are produced from a
    /// zero vector.
    pub async fn find_merge_candidates(
        &self,
        user: &UserId,
        entity: &Entity,
    ) -> Result<Vec<MergeCandidate>, MnemaError> {
        let Some(embedding) = entity.embedding.as_ref() else {
            debug!(entity_id = %entity.id, "entity has no embedding, skipping candidate search");
            return Ok(Vec::new());
        };

        let matches = self
            .store
            .vector_search_entities(
                user,
                embedding,
                entity.entity_type,
                self.config.candidate_pool,
                0.0,
            )
            .await?;

        let own_ids: HashSet<String> = self
            .store
            .get_memories_for_entity(user, &entity.id)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();

        let mut candidates = Vec::new();
        for (candidate, vector_score) in matches {
            if candidate.id == entity.id {
                continue;
            }
            let string_score = name_similarity(&entity.name, &candidate.name);
            if string_score < self.config.string_threshold {
                continue;
            }
            let candidate_ids: HashSet<String> = self
                .store
                .get_memories_for_entity(user, &candidate.id)
                .await?
                .into_iter()
                .map(|m| m.id)
                .collect();
            let cooccurrence_score = jaccard(&own_ids, &candidate_ids);
            if cooccurrence_score < self.config.cooccurrence_threshold {
                continue;
            }
            let combined_score = 0.4 * f64::from(vector_score)
                + 0.3 * string_score
                + 0.3 * cooccurrence_score;
            candidates.push(MergeCandidate {
                entity: candidate,
                vector_score,
                string_score,
                cooccurrence_score,
                combined_score,
            });
        }

        candidates.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.entity.id.cmp(&b.entity.id))
        });
        candidates.truncate(self.config.max_candidates);
        Ok(candidates)
    }

    async fn review_entity(
        &self,
        user: &UserId,
        entity: &Entity,
        candidates: &[MergeCandidate],
    ) -> Result<ReviewDecision, MnemaError> {
        let samples = self.store.get_memories_for_entity(user, &entity.id).await?;
        let sample_lines = if samples.is_empty() {
            "(none)".to_string()
        } else {
            samples
                .iter()
                .take(self.config.sample_memories)
                .map(|m| format!("- {}", m.text))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let last_linked = entity
            .last_linked_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "never".to_string());

        // Entity stats first, free text last, so memory text that happens
        // to contain a placeholder token is never re-substituted.
        let user_prompt = GC_USER_PROMPT
            .replace("{entity_type}", &entity.entity_type.to_string())
            .replace("{link_count}", &entity.link_count.to_string())
            .replace("{last_linked}", &last_linked)
            .replace("{name}", &entity.name)
            .replace("{memories}", &sample_lines)
            .replace("{candidates}", &format_candidate_lines(candidates));

        let request = ProviderRequest {
            model: self.config.model.clone(),
            system_prompt: Some(GC_SYSTEM_PROMPT.to_string()),
            messages: vec![ProviderMessage {
                role: "user".to_string(),
                content: vec![ContentBlock::Text { text: user_prompt }],
            }],
            max_tokens: 512,
        };
        let response = self.provider.complete(request).await?;
        parse_review_decision(&response.content)
    }

    async fn apply_decision(
        &self,
        user: &UserId,
        entity: &Entity,
        candidates: &[MergeCandidate],
        decision: ReviewDecision,
    ) -> Result<GcOutcome, MnemaError> {
        match decision.action.to_lowercase().as_str() {
            "merge" => {
                let Some(target_ref) = decision.target.as_deref() else {
                    warn!(entity_id = %entity.id, "merge decision without target, keeping entity");
                    return Ok(GcOutcome::Kept);
                };
                let Some(target) = resolve_target(candidates, target_ref) else {
                    warn!(
                        entity_id = %entity.id,
                        target = %target_ref,
                        "merge target not among candidates, keeping entity"
                    );
                    return Ok(GcOutcome::Kept);
                };
                self.store
                    .merge_entities(user, &entity.id, &target.entity.id)
                    .await?;
                debug!(
                    source = %entity.id,
                    target = %target.entity.id,
                    reason = decision.reason.as_deref().unwrap_or(""),
                    "merged dormant entity"
                );
                Ok(GcOutcome::Merged)
            }
            "delete" => {
                self.store.archive_entity(user, &entity.id).await?;
                debug!(
                    entity_id = %entity.id,
                    reason = decision.reason.as_deref().unwrap_or(""),
                    "archived dormant entity"
                );
                Ok(GcOutcome::Deleted)
            }
            "keep" => Ok(GcOutcome::Kept),
            other => {
                warn!(action = %other, entity_id = %entity.id, "unrecognized gc action, keeping entity");
                Ok(GcOutcome::Kept)
            }
        }
    }
}

/// One prompt line per candidate, best first.
fn format_candidate_lines(candidates: &[MergeCandidate]) -> String {
    if candidates.is_empty() {
        return "(none)".to_string();
    }
    candidates
        .iter()
        .filter_map(|c| {
            let short = c.entity.short_id()?;
            Some(format!(
                "ent_{short} \"{}\" (vector {:.2}, name {:.2}, shared memories {:.2}, combined {:.2})",
                c.entity.name,
                c.vector_score,
                c.string_score,
                c.cooccurrence_score,
                c.combined_score
            ))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Jaccard overlap of two id sets; 0 when both are empty.
fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Extract the first JSON object from a review response.
fn parse_review_decision(response: &str) -> Result<ReviewDecision, MnemaError> {
    let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) else {
        return Err(MnemaError::Parse(
            "gc review response contained no JSON object".to_string(),
        ));
    };
    if end < start {
        return Err(MnemaError::Parse(
            "gc review response contained no JSON object".to_string(),
        ));
    }
    serde_json::from_str(&response[start..=end])
        .map_err(|e| MnemaError::Parse(format!("gc review decision: {e}")))
}

/// Match a decision's target reference against the candidate list by
/// 8-char short id, case-insensitive, tolerating an `ent_` prefix and
/// full UUIDs.
fn resolve_target<'a>(
    candidates: &'a [MergeCandidate],
    target: &str,
) -> Option<&'a MergeCandidate> {
    let normalized: String = target
        .trim()
        .trim_start_matches("ent_")
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if normalized.chars().count() < 8 {
        return None;
    }
    let prefix: String = normalized.chars().take(8).collect();
    candidates
        .iter()
        .find(|c| c.entity.short_id().as_deref() == Some(prefix.as_str()))
}
