// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding adapter producing deterministic token-hash vectors.
//!
//! Each whitespace token is hashed into two vector positions, so texts
//! sharing words get high cosine similarity and unrelated texts stay
//! near-orthogonal. Query mode nudges one reserved component before
//! normalization: query and document vectors for the same text land close
//! but never identical, mirroring an asymmetric embedding model.

use std::hash::{DefaultHasher, Hash, Hasher};

use async_trait::async_trait;

use mnema_core::error::MnemaError;
use mnema_core::traits::adapter::PluginAdapter;
use mnema_core::traits::embedding::EmbeddingAdapter;
use mnema_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};

/// Deterministic embedding adapter for tests.
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    /// Create a mock embedder producing vectors of the given width.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Document-mode vector for a text, computed synchronously.
    pub fn document_vector(&self, text: &str) -> Vec<f32> {
        token_vector(text, self.dimensions, false)
    }

    /// Query-mode vector for a text, computed synchronously.
    pub fn query_vector(&self, text: &str) -> Vec<f32> {
        token_vector(text, self.dimensions, true)
    }
}

/// Hash each lowercased token into two positions, then L2-normalize.
fn token_vector(text: &str, dimensions: usize, query_mode: bool) -> Vec<f32> {
    let mut v = vec![0.0f32; dimensions];
    if dimensions == 0 {
        return v;
    }
    for token in text.to_lowercase().split_whitespace() {
        let token = token.trim_matches(|c: char| !c.is_alphanumeric());
        if token.is_empty() {
            continue;
        }
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        let h = hasher.finish();
        v[(h as usize) % dimensions] += 1.0;
        v[((h >> 32) as usize) % dimensions] += 0.5;
    }
    if query_mode {
        v[0] += 0.05;
    }
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    v
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemaError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemaError> {
        let embeddings = input
            .texts
            .iter()
            .map(|text| self.document_vector(text))
            .collect();
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: self.dimensions,
        })
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, MnemaError> {
        Ok(self.query_vector(text))
    }
}
