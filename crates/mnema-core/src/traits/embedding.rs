// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::MnemaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{EmbeddingInput, EmbeddingOutput};

/// Adapter for generating vector embeddings from text.
///
/// The underlying models are asymmetric: documents and queries are encoded
/// through distinct paths whose outputs live in the same space but are not
/// interchangeable. Callers must embed stored facts with [`embed`] and
/// retrieval queries with [`embed_query`], never mix the two.
///
/// [`embed`]: EmbeddingAdapter::embed
/// [`embed_query`]: EmbeddingAdapter::embed_query
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Generates document-mode embeddings for the given texts.
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemaError>;

    /// Generates a query-mode embedding for a single retrieval query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, MnemaError>;
}
