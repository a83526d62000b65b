// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock NER adapter returning scripted spans.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use mnema_core::error::MnemaError;
use mnema_core::traits::adapter::PluginAdapter;
use mnema_core::traits::ner::NerAdapter;
use mnema_core::types::{AdapterType, HealthStatus, NerSpan};

/// A mock recognizer that replays scripted span lists.
///
/// Each `recognize` call pops the next list from a FIFO queue; an empty
/// queue yields no spans.
pub struct MockNer {
    results: Arc<Mutex<VecDeque<Vec<NerSpan>>>>,
}

impl MockNer {
    /// Create a recognizer that finds nothing.
    pub fn new() -> Self {
        Self {
            results: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Create a recognizer pre-loaded with one span list per expected call.
    pub fn with_results(results: Vec<Vec<NerSpan>>) -> Self {
        Self {
            results: Arc::new(Mutex::new(VecDeque::from(results))),
        }
    }

    /// Queue another span list.
    pub async fn add_result(&self, spans: Vec<NerSpan>) {
        self.results.lock().await.push_back(spans);
    }
}

impl Default for MockNer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience constructor for a span.
pub fn span(text: &str, label: &str, score: f32) -> NerSpan {
    NerSpan {
        text: text.to_string(),
        label: label.to_string(),
        score,
    }
}

#[async_trait]
impl PluginAdapter for MockNer {
    fn name(&self) -> &str {
        "mock-ner"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Ner
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemaError> {
        Ok(())
    }
}

#[async_trait]
impl NerAdapter for MockNer {
    async fn recognize(&self, _text: &str) -> Result<Vec<NerSpan>, MnemaError> {
        Ok(self.results.lock().await.pop_front().unwrap_or_default())
    }
}
