// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test utilities for Mnema tests.
//!
//! Provides deterministic mock adapters for every collaborator boundary:
//!
//! - [`MockProvider`]: scripted LLM responses from a FIFO queue
//! - [`MockEmbedder`]: deterministic token-hash embeddings
//! - [`MockNer`]: scripted named-entity spans
//! - [`InMemoryStore`]: a reference `MemoryStore` over in-memory tables
//!
//! All are CI-runnable with no external services.

pub mod memory_store;
pub mod mock_embedder;
pub mod mock_ner;
pub mod mock_provider;

pub use memory_store::InMemoryStore;
pub use mock_embedder::MockEmbedder;
pub use mock_ner::MockNer;
pub use mock_provider::MockProvider;
