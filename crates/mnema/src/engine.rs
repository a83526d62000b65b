// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The memory engine: explicit wiring of every memory service over a set
//! of injected adapters.

use std::sync::Arc;
use std::time::Instant;

use mnema_config::{MnemaConfig, validate_config};
use mnema_core::conversation::ConversationMessage;
use mnema_core::error::MnemaError;
use mnema_core::traits::{EmbeddingAdapter, MemoryStore, NerAdapter, ProviderAdapter};
use mnema_core::types::{HealthStatus, UserId};
use mnema_entities::{EntityExtractor, EntityGcService, ExtractedEntity, GcReport};
use mnema_memory::{
    Fingerprint, FingerprintGenerator, MemoryEvacuator, SurfacedMemory, SurfacingService,
};
use tracing::{debug, info, warn};

use crate::metrics::{
    record_evacuation, record_gc_outcomes, record_surfaced, record_surfacing_latency,
};

/// The application context for the memory subsystem.
///
/// Owns one instance of each memory service, all constructed over the same
/// injected adapters. There are no globals: a host embeds the subsystem by
/// building one engine per adapter set and calling it from its turn loop
/// and its schedulers.
pub struct MemoryEngine {
    store: Arc<dyn MemoryStore>,
    provider: Arc<dyn ProviderAdapter>,
    embedder: Arc<dyn EmbeddingAdapter>,
    ner: Arc<dyn NerAdapter>,
    config: MnemaConfig,
    surfacing: SurfacingService,
    fingerprints: FingerprintGenerator,
    evacuator: MemoryEvacuator,
    extractor: EntityExtractor,
    gc: EntityGcService,
}

impl std::fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEngine").finish_non_exhaustive()
    }
}

impl MemoryEngine {
    /// Creates an engine from adapters and a validated configuration.
    ///
    /// Semantic config errors (out-of-range thresholds, empty model names,
    /// inverted bands) are all collected and reported together; a bad
    /// config never produces a partially working engine.
    pub fn new(
        store: Arc<dyn MemoryStore>,
        provider: Arc<dyn ProviderAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        ner: Arc<dyn NerAdapter>,
        config: MnemaConfig,
    ) -> Result<Self, MnemaError> {
        if let Err(errors) = validate_config(&config) {
            let detail = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(MnemaError::Config(detail));
        }

        let surfacing = SurfacingService::new(
            store.clone(),
            config.retrieval.clone(),
            config.embedding.clone(),
        );
        let fingerprints =
            FingerprintGenerator::new(provider.clone(), config.fingerprint.clone())?;
        let evacuator = MemoryEvacuator::new(provider.clone(), config.evacuation.clone())?;
        let extractor = EntityExtractor::new(ner.clone());
        let gc = EntityGcService::new(store.clone(), provider.clone(), config.entity_gc.clone())?;

        info!(
            memory_dimensions = config.embedding.memory_dimensions,
            fingerprint_model = config.fingerprint.model.as_str(),
            "memory engine initialized"
        );

        Ok(Self {
            store,
            provider,
            embedder,
            ner,
            config,
            surfacing,
            fingerprints,
            evacuator,
            extractor,
            gc,
        })
    }

    /// Surface the memories relevant to a fingerprint.
    ///
    /// Embeds the fingerprint in query mode, then runs hybrid search, link
    /// expansion, and reranking. `limit` falls back to the configured
    /// default when `None`.
    pub async fn get_relevant_memories(
        &self,
        user: &UserId,
        fingerprint_text: &str,
        limit: Option<usize>,
    ) -> Result<Vec<SurfacedMemory>, MnemaError> {
        let started = Instant::now();
        let limit = limit.unwrap_or(self.config.retrieval.default_limit);
        let embedding = self.embedder.embed_query(fingerprint_text).await?;
        let surfaced = self
            .surfacing
            .search_with_embedding(user, &embedding, fingerprint_text, limit)
            .await?;

        record_surfaced(surfaced.len());
        record_surfacing_latency(started.elapsed().as_secs_f64());
        debug!(user = %user, surfaced = surfaced.len(), "relevant memories ready");
        Ok(surfaced)
    }

    /// Generate the retrieval fingerprint for the current turn, including
    /// the retention decision over previously surfaced memories.
    ///
    /// This path is turn-critical: a provider failure propagates to the
    /// caller instead of degrading.
    pub async fn generate_fingerprint(
        &self,
        conversation: &[ConversationMessage],
        current_message: &str,
        previous_memories: Option<&[SurfacedMemory]>,
    ) -> Result<Fingerprint, MnemaError> {
        self.fingerprints
            .generate(conversation, current_message, previous_memories)
            .await
    }

    /// Whether the pinned set has outgrown the evacuation threshold.
    pub fn should_evacuate(&self, memories: &[SurfacedMemory]) -> bool {
        self.evacuator.should_evacuate(memories)
    }

    /// Shrink an oversized pinned set to the model's survivor selection.
    /// Degrades to keeping everything when the review fails.
    pub async fn evacuate(
        &self,
        memories: Vec<SurfacedMemory>,
        conversation: &[ConversationMessage],
        user_message: &str,
    ) -> Result<Vec<SurfacedMemory>, MnemaError> {
        let survivors = self
            .evacuator
            .evacuate(memories, conversation, user_message)
            .await?;
        record_evacuation();
        Ok(survivors)
    }

    /// Run one entity garbage collection batch for a user.
    pub async fn run_entity_gc(&self, user: &UserId) -> Result<GcReport, MnemaError> {
        let report = self.gc.run(user).await?;
        record_gc_outcomes(&report);
        Ok(report)
    }

    /// Extract typed, normalized entity mentions from a piece of text.
    pub async fn extract_entities(&self, text: &str) -> Result<Vec<ExtractedEntity>, MnemaError> {
        self.extractor.extract(text).await
    }

    /// Aggregate health across every owned adapter.
    ///
    /// Any unhealthy adapter makes the whole engine unhealthy: all four
    /// are load bearing. Degradations are collected and joined.
    pub async fn health_check(&self) -> Result<HealthStatus, MnemaError> {
        let statuses = [
            (self.provider.name().to_string(), self.provider.health_check().await?),
            (self.embedder.name().to_string(), self.embedder.health_check().await?),
            (self.store.name().to_string(), self.store.health_check().await?),
            (self.ner.name().to_string(), self.ner.health_check().await?),
        ];

        let mut unhealthy = Vec::new();
        let mut degraded = Vec::new();
        for (name, status) in statuses {
            match status {
                HealthStatus::Healthy => {}
                HealthStatus::Degraded(reason) => {
                    degraded.push(format!("{name}: {reason}"));
                }
                HealthStatus::Unhealthy(reason) => {
                    unhealthy.push(format!("{name}: {reason}"));
                }
            }
        }

        if !unhealthy.is_empty() {
            return Ok(HealthStatus::Unhealthy(unhealthy.join("; ")));
        }
        if !degraded.is_empty() {
            return Ok(HealthStatus::Degraded(degraded.join("; ")));
        }
        Ok(HealthStatus::Healthy)
    }

    /// Shut down every owned adapter, best effort. Individual failures are
    /// logged and do not stop the remaining shutdowns; the store goes last.
    pub async fn shutdown(&self) -> Result<(), MnemaError> {
        if let Err(e) = self.ner.shutdown().await {
            warn!(adapter = self.ner.name(), error = %e, "adapter shutdown error");
        }
        if let Err(e) = self.embedder.shutdown().await {
            warn!(adapter = self.embedder.name(), error = %e, "adapter shutdown error");
        }
        if let Err(e) = self.provider.shutdown().await {
            warn!(adapter = self.provider.name(), error = %e, "adapter shutdown error");
        }
        if let Err(e) = self.store.shutdown().await {
            warn!(adapter = self.store.name(), error = %e, "adapter shutdown error");
        }
        info!("memory engine stopped");
        Ok(())
    }
}
