// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! NER adapter trait for named-entity recognition backends.

use async_trait::async_trait;

use crate::error::MnemaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::NerSpan;

/// Adapter for named-entity recognizers.
///
/// Implementations return raw labeled spans; label filtering against the
/// entity-type allowlist and name normalization happen in the extraction
/// layer, not here.
#[async_trait]
pub trait NerAdapter: PluginAdapter {
    /// Recognizes entity mentions in the given text.
    async fn recognize(&self, text: &str) -> Result<Vec<NerSpan>, MnemaError>;
}
