// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM-backed query expansion for retrieval.
//!
//! A conversational fragment ("what about the other one?") is useless as a
//! search query. The fingerprint generator shows the model a bounded window
//! of recent dialogue plus the raw message and asks for a self-contained
//! retrieval query that *replaces* the message for embedding and search.
//! When previously surfaced memories are passed in, the same call also
//! decides which of them stay pinned for this turn.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use mnema_config::model::FingerprintConfig;
use mnema_core::conversation::ConversationMessage;
use mnema_core::error::MnemaError;
use mnema_core::traits::ProviderAdapter;
use mnema_core::types::{ContentBlock, ProviderMessage, ProviderRequest};
use regex::Regex;
use tracing::{debug, warn};

use crate::scoring::importance_dots;
use crate::types::SurfacedMemory;
use crate::window::{format_window, recent_window};

/// Matches the short-id tokens prompts use to address memories.
pub(crate) static MEM_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"mem_([0-9a-fA-F]{8})").unwrap());

/// System prompt for fingerprint generation.
const FINGERPRINT_SYSTEM_PROMPT: &str = r#"You expand conversational fragments into retrieval queries for a long-term memory index.

Given the recent conversation and the user's latest message, write one self-contained search query capturing what the user is talking about: resolve pronouns and references against the conversation, name the people and things involved, and include close synonyms for the key concepts. The query replaces the user's message for retrieval, so it must stand entirely on its own.

Output the query inside <fingerprint></fingerprint> tags.

If a list of previously surfaced memories is provided, also decide which of them still matter for this turn. Output a <memory_retention></memory_retention> block repeating every listed memory id on its own line, prefixed with [x] to keep it in context or [ ] to release it. Keep a memory only if it still bears on where the conversation is going."#;

/// User prompt template for fingerprint generation.
const FINGERPRINT_USER_PROMPT: &str = r#"Recent conversation:
{conversation}

Latest message:
{message}
{memories}"#;

/// A per-turn retrieval fingerprint: the expanded query plus the set of
/// previously surfaced memories to keep pinned, as 8-hex-char short ids.
/// Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub text: String,
    pub pinned_ids: HashSet<String>,
}

/// Generates retrieval fingerprints via a single LLM call per turn.
///
/// Stateless across turns: every signal the model sees is passed in by the
/// caller. LLM failures surface to the caller unretried; retry policy
/// belongs to the provider adapter.
pub struct FingerprintGenerator {
    provider: Arc<dyn ProviderAdapter>,
    config: FingerprintConfig,
}

impl FingerprintGenerator {
    /// Creates a fingerprint generator.
    ///
    /// An empty model name or a prompt template missing its placeholders
    /// is a construction-time configuration error, never degraded.
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        config: FingerprintConfig,
    ) -> Result<Self, MnemaError> {
        if config.model.trim().is_empty() {
            return Err(MnemaError::Config(
                "fingerprint.model must not be empty".to_string(),
            ));
        }
        for placeholder in ["{conversation}", "{message}", "{memories}"] {
            if !FINGERPRINT_USER_PROMPT.contains(placeholder) {
                return Err(MnemaError::Config(format!(
                    "fingerprint user prompt is missing the {placeholder} placeholder"
                )));
            }
        }
        Ok(Self { provider, config })
    }

    /// Generate a fingerprint for the current turn.
    ///
    /// `previous_memories` are the memories surfaced on earlier turns that
    /// are still in context; passing `None` skips the retention decision
    /// entirely and the returned pinned set is empty.
    pub async fn generate(
        &self,
        conversation: &[ConversationMessage],
        current_message: &str,
        previous_memories: Option<&[SurfacedMemory]>,
    ) -> Result<Fingerprint, MnemaError> {
        let window = recent_window(conversation, self.config.window_pairs);
        let conversation_text = format_window(&window);

        let memories_block = match previous_memories {
            Some(memories) if !memories.is_empty() => format!(
                "\nPreviously surfaced memories:\n{}\n",
                format_memory_lines(memories)
            ),
            _ => String::new(),
        };

        let user_prompt = FINGERPRINT_USER_PROMPT
            .replace("{conversation}", &conversation_text)
            .replace("{message}", current_message)
            .replace("{memories}", &memories_block);

        let request = ProviderRequest {
            model: self.config.model.clone(),
            system_prompt: Some(FINGERPRINT_SYSTEM_PROMPT.to_string()),
            messages: vec![ProviderMessage {
                role: "user".to_string(),
                content: vec![ContentBlock::Text { text: user_prompt }],
            }],
            max_tokens: 1024,
        };

        let response = self.provider.complete(request).await?;
        let fingerprint = parse_response(&response.content, previous_memories)?;

        debug!(
            fingerprint_len = fingerprint.text.len(),
            pinned = fingerprint.pinned_ids.len(),
            "fingerprint generated"
        );
        Ok(fingerprint)
    }
}

/// One prompt line per memory: short id, 5-dot importance glyph, text.
///
/// Memories whose id cannot be shortened to 8 hex chars are skipped; the
/// checkbox convention cannot address them.
pub fn format_memory_lines(memories: &[SurfacedMemory]) -> String {
    memories
        .iter()
        .filter_map(|m| {
            let short = m.short_id()?;
            Some(format!(
                "mem_{short} {} {}",
                importance_dots(m.memory.importance),
                m.memory.text
            ))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse a fingerprint response into query text and pinned ids.
///
/// The fingerprint is the first `<fingerprint>` block, trimmed; a response
/// without the block falls back to the entire text with any
/// `<memory_retention>` block stripped. An empty result after both steps
/// is a hard error: a turn must never proceed on a silently empty query.
///
/// Pinned ids come from `[x]` lines inside the `<memory_retention>` block.
/// With previous memories given but no block in the response at all, every
/// previous memory is pinned: dropping a memory the model never ruled on
/// is worse than carrying it one more turn.
pub fn parse_response(
    response: &str,
    previous_memories: Option<&[SurfacedMemory]>,
) -> Result<Fingerprint, MnemaError> {
    let text = match extract_tag_block(response, "fingerprint") {
        Some(block) => block.trim().to_string(),
        None => strip_tag_block(response, "memory_retention")
            .trim()
            .to_string(),
    };
    if text.is_empty() {
        return Err(MnemaError::Parse(
            "fingerprint response contained no usable query text".to_string(),
        ));
    }

    let pinned_ids = match previous_memories {
        None => HashSet::new(),
        Some(memories) => parse_retention(response, memories),
    };

    Ok(Fingerprint { text, pinned_ids })
}

/// Extract pinned short ids from the `<memory_retention>` block.
fn parse_retention(response: &str, previous_memories: &[SurfacedMemory]) -> HashSet<String> {
    match extract_tag_block(response, "memory_retention") {
        Some(block) => {
            let mut pinned = HashSet::new();
            for line in block.lines() {
                let line = line.trim_start();
                if line.starts_with("[x]") || line.starts_with("[X]") {
                    for capture in MEM_ID_RE.captures_iter(line) {
                        pinned.insert(capture[1].to_lowercase());
                    }
                }
            }
            pinned
        }
        None => {
            warn!(
                memories = previous_memories.len(),
                "fingerprint response had no retention block, pinning all previous memories"
            );
            previous_memories
                .iter()
                .filter_map(|m| m.short_id())
                .collect()
        }
    }
}

/// Content of the first `<tag>...</tag>` block, if present.
pub(crate) fn extract_tag_block<'a>(response: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let start = response.find(&open)? + open.len();
    let end = response[start..].find(&close)? + start;
    Some(&response[start..end])
}

/// Remove every `<tag>...</tag>` block. An unclosed open tag drops the
/// remainder of the text.
fn strip_tag_block(response: &str, tag: &str) -> String {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let mut out = String::with_capacity(response.len());
    let mut rest = response;
    while let Some(start) = rest.find(&open) {
        out.push_str(&rest[..start]);
        match rest[start + open.len()..].find(&close) {
            Some(end) => rest = &rest[start + open.len() + end + close.len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnema_core::memory::Memory;
    use mnema_test_utils::MockProvider;
    use proptest::prelude::*;

    fn surfaced_with_id(id: &str, text: &str, importance: f32) -> SurfacedMemory {
        let mut memory = Memory::new("u1", text);
        memory.id = id.to_string();
        memory.set_importance(importance);
        SurfacedMemory::new(memory, 0.8, 0.02, Some(0.8))
    }

    #[test]
    fn extracts_fingerprint_block_trimmed() {
        let parsed = parse_response(
            "preamble <fingerprint>  user's travel plans for Lisbon  </fingerprint> trailing",
            None,
        )
        .unwrap();
        assert_eq!(parsed.text, "user's travel plans for Lisbon");
    }

    #[test]
    fn no_previous_memories_means_empty_pinned_set() {
        let parsed = parse_response("<fingerprint>q</fingerprint>", None).unwrap();
        assert_eq!(parsed.text, "q");
        assert!(parsed.pinned_ids.is_empty());
    }

    #[test]
    fn retention_block_ignored_without_previous_memories() {
        let response = "<fingerprint>q</fingerprint>\n<memory_retention>\n[x] mem_aaaabbbb\n</memory_retention>";
        let parsed = parse_response(response, None).unwrap();
        assert!(parsed.pinned_ids.is_empty());
    }

    #[test]
    fn checkbox_lines_select_exactly_the_checked_ids() {
        let memories = vec![
            surfaced_with_id("aaaabbbb-0000-0000-0000-000000000000", "fact a", 0.5),
            surfaced_with_id("ccccdddd-0000-0000-0000-000000000000", "fact b", 0.5),
            surfaced_with_id("eeeeffff-0000-0000-0000-000000000000", "fact c", 0.5),
        ];
        let response = r#"<fingerprint>q</fingerprint>
<memory_retention>
[x] mem_aaaabbbb fact a
[ ] mem_ccccdddd fact b
[X] mem_EEEEFFFF fact c
</memory_retention>"#;
        let parsed = parse_response(response, Some(&memories)).unwrap();
        let expected: HashSet<String> = ["aaaabbbb", "eeeeffff"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(parsed.pinned_ids, expected);
    }

    #[test]
    fn unchecked_lines_are_not_pinned() {
        let memories = vec![surfaced_with_id("aaaabbbb-0000-0000-0000-000000000000", "a", 0.5)];
        let response =
            "<fingerprint>q</fingerprint>\n<memory_retention>\n[ ] mem_aaaabbbb\n</memory_retention>";
        let parsed = parse_response(response, Some(&memories)).unwrap();
        assert!(parsed.pinned_ids.is_empty());
    }

    #[test]
    fn missing_retention_block_pins_everything() {
        let memories = vec![
            surfaced_with_id("aaaabbbb-0000-0000-0000-000000000000", "a", 0.5),
            surfaced_with_id("ccccdddd-0000-0000-0000-000000000000", "b", 0.5),
        ];
        let parsed = parse_response("<fingerprint>q</fingerprint>", Some(&memories)).unwrap();
        let expected: HashSet<String> = ["aaaabbbb", "ccccdddd"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(parsed.pinned_ids, expected);
    }

    #[test]
    fn missing_fingerprint_tag_falls_back_to_stripped_response() {
        let response =
            "likely topics: lisbon, flights\n<memory_retention>\n[x] mem_aaaabbbb\n</memory_retention>";
        let parsed = parse_response(response, None).unwrap();
        assert_eq!(parsed.text, "likely topics: lisbon, flights");
    }

    #[test]
    fn empty_response_after_fallback_is_a_hard_error() {
        let response = "<memory_retention>\n[x] mem_aaaabbbb\n</memory_retention>";
        let err = parse_response(response, None).unwrap_err();
        assert!(matches!(err, MnemaError::Parse(_)));
        assert!(matches!(
            parse_response("   ", None).unwrap_err(),
            MnemaError::Parse(_)
        ));
    }

    #[test]
    fn empty_fingerprint_block_is_a_hard_error() {
        let err = parse_response("<fingerprint>   </fingerprint>", None).unwrap_err();
        assert!(matches!(err, MnemaError::Parse(_)));
    }

    #[test]
    fn memory_lines_carry_short_id_dots_and_text() {
        let memories = vec![
            surfaced_with_id("550E8400-e29b-41d4-a716-446655440000", "likes tea", 1.0),
            surfaced_with_id("660e8400-e29b-41d4-a716-446655440000", "owns a cat", 0.0),
        ];
        let lines = format_memory_lines(&memories);
        assert_eq!(
            lines,
            "mem_550e8400 ●●●●● likes tea\nmem_660e8400 ○○○○○ owns a cat"
        );
    }

    #[test]
    fn memory_lines_skip_unaddressable_ids() {
        let memories = vec![
            surfaced_with_id("short", "cannot be addressed", 0.5),
            surfaced_with_id("aaaabbbb-0000-0000-0000-000000000000", "fine", 0.5),
        ];
        let lines = format_memory_lines(&memories);
        assert_eq!(lines.lines().count(), 1);
        assert!(lines.contains("mem_aaaabbbb"));
    }

    #[test]
    fn strip_tag_block_removes_all_occurrences() {
        let text = "a <memory_retention>x</memory_retention> b <memory_retention>y</memory_retention> c";
        assert_eq!(strip_tag_block(text, "memory_retention"), "a  b  c");
    }

    #[test]
    fn strip_tag_block_drops_unclosed_remainder() {
        let text = "kept <memory_retention>never closed";
        assert_eq!(strip_tag_block(text, "memory_retention"), "kept ");
    }

    #[test]
    fn new_rejects_empty_model() {
        let provider = Arc::new(MockProvider::new());
        let config = FingerprintConfig {
            model: "  ".to_string(),
            ..FingerprintConfig::default()
        };
        assert!(matches!(
            FingerprintGenerator::new(provider, config),
            Err(MnemaError::Config(_))
        ));
    }

    #[tokio::test]
    async fn generate_substitutes_window_message_and_memories() {
        let provider = Arc::new(MockProvider::with_responses(vec![
            "<fingerprint>expanded query</fingerprint>".to_string(),
        ]));
        let generator =
            FingerprintGenerator::new(provider.clone(), FingerprintConfig::default()).unwrap();

        let conversation = vec![
            ConversationMessage::user("I'm planning a trip"),
            ConversationMessage::assistant("Where to?"),
        ];
        let memories = vec![surfaced_with_id(
            "aaaabbbb-0000-0000-0000-000000000000",
            "prefers window seats",
            0.6,
        )];

        let fingerprint = generator
            .generate(&conversation, "Lisbon, I think", Some(&memories))
            .await
            .unwrap();
        assert_eq!(fingerprint.text, "expanded query");
        // No retention block in the response: fail open.
        assert!(fingerprint.pinned_ids.contains("aaaabbbb"));

        let requests = provider.requests().await;
        assert_eq!(requests.len(), 1);
        let prompt = match &requests[0].messages[0].content[0] {
            ContentBlock::Text { text } => text.clone(),
        };
        assert!(prompt.contains("User: I'm planning a trip"));
        assert!(prompt.contains("Assistant: Where to?"));
        assert!(prompt.contains("Lisbon, I think"));
        assert!(prompt.contains("mem_aaaabbbb"));
        assert!(prompt.contains("prefers window seats"));
        assert!(!prompt.contains("{conversation}"));
        assert!(!prompt.contains("{memories}"));
    }

    #[tokio::test]
    async fn generate_propagates_unparseable_response() {
        let provider = Arc::new(MockProvider::with_responses(vec!["   ".to_string()]));
        let generator = FingerprintGenerator::new(provider, FingerprintConfig::default()).unwrap();
        let err = generator.generate(&[], "hello", None).await.unwrap_err();
        assert!(matches!(err, MnemaError::Parse(_)));
    }

    #[test]
    fn system_prompt_documents_both_output_tags() {
        assert!(FINGERPRINT_SYSTEM_PROMPT.contains("<fingerprint>"));
        assert!(FINGERPRINT_SYSTEM_PROMPT.contains("<memory_retention>"));
        assert!(FINGERPRINT_SYSTEM_PROMPT.contains("[x]"));
    }

    proptest! {
        #[test]
        fn any_fingerprint_block_content_round_trips_trimmed(content in "[ a-zA-Z0-9',]{1,60}") {
            prop_assume!(!content.trim().is_empty());
            let response = format!("noise <fingerprint>{content}</fingerprint> noise");
            let parsed = parse_response(&response, None).unwrap();
            prop_assert_eq!(parsed.text, content.trim().to_string());
        }

        #[test]
        fn pinned_ids_are_always_lowercase_hex(hex in "[0-9A-F]{8}") {
            let memories = vec![surfaced_with_id(
                "aaaabbbb-0000-0000-0000-000000000000", "m", 0.5,
            )];
            let response = format!(
                "<fingerprint>q</fingerprint>\n<memory_retention>\n[x] mem_{hex}\n</memory_retention>"
            );
            let parsed = parse_response(&response, Some(&memories)).unwrap();
            prop_assert_eq!(parsed.pinned_ids.len(), 1);
            let id = parsed.pinned_ids.iter().next().unwrap();
            prop_assert_eq!(id.clone(), hex.to_lowercase());
        }
    }
}
