// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! NER-backed entity extraction with allowlist filtering and normalization.
//!
//! The recognizer returns raw labeled spans; this layer keeps only spans
//! whose label parses into the closed [`EntityType`] set, normalizes the
//! mention text, and drops duplicates. Casing is preserved throughout:
//! proper nouns are case-sensitive and the canonical spelling matters.

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;

use mnema_core::entity::EntityType;
use mnema_core::error::MnemaError;
use mnema_core::traits::NerAdapter;
use tracing::debug;

/// A normalized entity mention accepted from the recognizer.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedEntity {
    pub name: String,
    pub entity_type: EntityType,
    /// Recognizer confidence for the span this mention came from.
    pub score: f32,
}

/// Extracts allowlisted, normalized entity mentions from text.
pub struct EntityExtractor {
    ner: Arc<dyn NerAdapter>,
}

impl EntityExtractor {
    pub fn new(ner: Arc<dyn NerAdapter>) -> Self {
        Self { ner }
    }

    /// Recognize and normalize entity mentions in `text`.
    ///
    /// Spans with labels outside the allowlist are discarded. Duplicate
    /// (name, type) pairs keep their first occurrence.
    pub async fn extract(&self, text: &str) -> Result<Vec<ExtractedEntity>, MnemaError> {
        let spans = self.ner.recognize(text).await?;
        let mut seen: HashSet<(String, EntityType)> = HashSet::new();
        let mut extracted = Vec::new();

        for span in spans {
            let Ok(entity_type) = EntityType::from_str(&span.label) else {
                debug!(label = %span.label, text = %span.text, "discarding span with unlisted label");
                continue;
            };
            let Some(name) = normalize_name(&span.text) else {
                continue;
            };
            if seen.insert((name.clone(), entity_type)) {
                extracted.push(ExtractedEntity {
                    name,
                    entity_type,
                    score: span.score,
                });
            }
        }
        Ok(extracted)
    }
}

/// Trim and collapse internal whitespace, preserving casing.
///
/// Names under 2 characters are rejected: one-character mentions are
/// recognizer noise, never real entities.
pub fn normalize_name(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() < 2 {
        return None;
    }
    Some(collapsed)
}
