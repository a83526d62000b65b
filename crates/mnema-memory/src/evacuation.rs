// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM-judged eviction of an oversized pinned memory set.
//!
//! Retention alone only shrinks the pinned set when the model releases
//! memories turn by turn; a long session can still accumulate more than
//! fits. When the set crosses the trigger threshold the evacuator asks
//! the model to pick a survivor set in one batch call, annotating every
//! candidate with its full signal suite so the judgment is anchored in
//! the same numbers a deterministic policy would use.
//!
//! Failure policy is keep-everything: an unusable response or a failed
//! call leaves the set untouched and logs a warning. Eviction that
//! silently drops the wrong memory is worse than eviction that does not
//! happen.

use std::collections::HashSet;
use std::sync::Arc;

use mnema_config::model::EvacuationConfig;
use mnema_core::conversation::ConversationMessage;
use mnema_core::error::MnemaError;
use mnema_core::traits::ProviderAdapter;
use mnema_core::types::{ContentBlock, ProviderMessage, ProviderRequest};
use tracing::{info, warn};

use crate::fingerprint::{extract_tag_block, MEM_ID_RE};
use crate::scoring::importance_dots;
use crate::types::SurfacedMemory;
use crate::window::{format_window, recent_window};

/// System prompt for evacuation judgment.
const EVACUATION_SYSTEM_PROMPT: &str = r#"You prune an over-full working set of long-term memories for a conversational assistant.

You are shown the recent conversation, the user's latest message, and every memory currently held in context. Each memory is annotated with its relevance signals: a 5-dot importance glyph with the numeric importance, the retrieval similarity from when it was surfaced, its link count, and how many times the user has restated it.

Select the {target} memories most worth keeping for where this conversation is going. Weigh all the signals; a high mention count is the strongest evidence that a fact matters to the user long term.

Output the ids of the memories to keep inside a <survivors></survivors> block, one id per line. Every memory not listed in the block is released from context."#;

/// User prompt template for evacuation judgment.
const EVACUATION_USER_PROMPT: &str = r#"Recent conversation:
{conversation}

Latest message:
{message}

Memories in context ({count} total, keep at most {target}):
{memories}"#;

/// Batch-evicts pinned memories down to a survivor set via one LLM call.
pub struct MemoryEvacuator {
    provider: Arc<dyn ProviderAdapter>,
    config: EvacuationConfig,
}

impl MemoryEvacuator {
    /// Creates an evacuator. Empty model name or a template missing its
    /// placeholders is a construction-time configuration error.
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        config: EvacuationConfig,
    ) -> Result<Self, MnemaError> {
        if config.model.trim().is_empty() {
            return Err(MnemaError::Config(
                "evacuation.model must not be empty".to_string(),
            ));
        }
        if !EVACUATION_SYSTEM_PROMPT.contains("{target}") {
            return Err(MnemaError::Config(
                "evacuation system prompt is missing the {target} placeholder".to_string(),
            ));
        }
        for placeholder in ["{conversation}", "{message}", "{memories}", "{target}"] {
            if !EVACUATION_USER_PROMPT.contains(placeholder) {
                return Err(MnemaError::Config(format!(
                    "evacuation user prompt is missing the {placeholder} placeholder"
                )));
            }
        }
        Ok(Self { provider, config })
    }

    /// Whether the pinned set has outgrown its threshold.
    pub fn should_evacuate(&self, memories: &[SurfacedMemory]) -> bool {
        memories.len() > self.config.trigger_threshold
    }

    /// Reduce the pinned set to the model's survivor selection.
    ///
    /// Memories whose id cannot be shortened never appear in the prompt
    /// and always survive; the model cannot rule on what it cannot see.
    /// Any failure, from the call itself to a response without a
    /// `<survivors>` block, keeps the entire input set.
    pub async fn evacuate(
        &self,
        memories: Vec<SurfacedMemory>,
        conversation: &[ConversationMessage],
        user_message: &str,
    ) -> Result<Vec<SurfacedMemory>, MnemaError> {
        if memories.is_empty() {
            return Ok(memories);
        }

        let window = recent_window(conversation, self.config.window_pairs);
        let target = self.config.target_survivors.to_string();
        let user_prompt = EVACUATION_USER_PROMPT
            .replace("{target}", &target)
            .replace("{count}", &memories.len().to_string())
            .replace("{conversation}", &format_window(&window))
            .replace("{message}", user_message)
            .replace("{memories}", &format_candidate_lines(&memories));
        let system_prompt = EVACUATION_SYSTEM_PROMPT.replace("{target}", &target);

        let request = ProviderRequest {
            model: self.config.model.clone(),
            system_prompt: Some(system_prompt),
            messages: vec![ProviderMessage {
                role: "user".to_string(),
                content: vec![ContentBlock::Text { text: user_prompt }],
            }],
            max_tokens: 2048,
        };

        let response = match self.provider.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "evacuation call failed, keeping all memories");
                return Ok(memories);
            }
        };

        let Some(survivors) = parse_survivors(&response.content) else {
            warn!("evacuation response had no survivors block, keeping all memories");
            return Ok(memories);
        };

        let before = memories.len();
        let kept: Vec<SurfacedMemory> = memories
            .into_iter()
            .filter(|m| match m.short_id() {
                Some(short) => survivors.contains(&short),
                None => true,
            })
            .collect();
        info!(
            before,
            after = kept.len(),
            target = self.config.target_survivors,
            "evacuation complete"
        );
        Ok(kept)
    }
}

/// One prompt line per candidate with the full signal suite.
pub fn format_candidate_lines(memories: &[SurfacedMemory]) -> String {
    memories
        .iter()
        .filter_map(|m| {
            let short = m.short_id()?;
            Some(format!(
                "mem_{short} {} (importance {:.2}, similarity {:.2}, links {}, mentions {}) {}",
                importance_dots(m.memory.importance),
                m.memory.importance,
                m.similarity_score,
                m.memory.link_count(),
                m.memory.mention_count,
                m.memory.text
            ))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Short ids in the `<survivors>` block, or `None` when the block is absent.
///
/// Presence in the block is survival; there is no checkbox convention here.
fn parse_survivors(response: &str) -> Option<HashSet<String>> {
    let block = extract_tag_block(response, "survivors")?;
    Some(
        MEM_ID_RE
            .captures_iter(block)
            .map(|capture| capture[1].to_lowercase())
            .collect(),
    )
}
