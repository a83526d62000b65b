// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mnema: the long-term memory engine for conversational assistants.
//!
//! A host embeds Mnema by constructing a [`MemoryEngine`] over four
//! adapters (LLM provider, embedder, NER, store) and calling it from two
//! places: the turn loop (fingerprint, surface, retain, evacuate) and its
//! maintenance scheduler (entity garbage collection).
//!
//! ## Turn flow
//!
//! 1. [`MemoryEngine::generate_fingerprint`] expands the conversation into
//!    a retrieval fingerprint and decides which previously surfaced
//!    memories stay pinned.
//! 2. [`apply_retention`] filters the previous turn's memories to the
//!    pinned set.
//! 3. [`MemoryEngine::get_relevant_memories`] surfaces fresh candidates.
//! 4. [`merge_memories`] combines pinned and fresh, pinned copies winning.
//! 5. When the pinned set outgrows its threshold,
//!    [`MemoryEngine::evacuate`] shrinks it via an LLM review.
//!
//! This crate is a library; it has no transport, storage schema, or CLI.

pub mod engine;
pub mod metrics;

pub use engine::MemoryEngine;

pub use mnema_config::{MnemaConfig, load_and_validate};
pub use mnema_core::conversation::{ConversationMessage, MessageRole};
pub use mnema_core::entity::{Entity, EntityType};
pub use mnema_core::error::MnemaError;
pub use mnema_core::memory::{Memory, MemoryLink};
pub use mnema_core::traits::{
    EmbeddingAdapter, MemoryStore, NerAdapter, PluginAdapter, ProviderAdapter,
};
pub use mnema_core::types::{
    AdapterType, ContentBlock, EmbeddingInput, EmbeddingOutput, HealthStatus, NerSpan,
    ProviderMessage, ProviderRequest, ProviderResponse, TokenUsage, UserId,
};
pub use mnema_entities::{EntityExtractor, ExtractedEntity, GcReport};
pub use mnema_memory::{
    Fingerprint, LinkedMemory, SurfacedMemory, apply_retention, merge_memories,
};
