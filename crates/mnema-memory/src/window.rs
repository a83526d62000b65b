// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded conversation windows for LLM prompts.
//!
//! Both the fingerprint generator and the evacuator show the model recent
//! dialogue, bounded in conversational *pairs* rather than raw messages.
//! Collapsed segment summaries are skipped: their detail is already gone
//! from context and re-quoting the summary would double-count it.

use mnema_core::conversation::{ConversationMessage, MessageRole};

/// Collect the last `max_pairs` conversational pairs from `history`.
///
/// Walks backward, skipping collapsed segment-summary messages. Each user
/// message closes one pair (a user turn plus whatever assistant messages
/// follow it), so the window ends as soon as `max_pairs` user messages are
/// collected. Returned in original chronological order.
pub fn recent_window(
    history: &[ConversationMessage],
    max_pairs: usize,
) -> Vec<&ConversationMessage> {
    let mut window: Vec<&ConversationMessage> = Vec::new();
    let mut pairs = 0;

    for message in history.iter().rev() {
        if message.is_collapsed_summary() {
            continue;
        }
        window.push(message);
        if message.role == MessageRole::User {
            pairs += 1;
            if pairs >= max_pairs {
                break;
            }
        }
    }

    window.reverse();
    window
}

/// Render a window as `Role: content` lines for prompt substitution.
pub fn format_window(window: &[&ConversationMessage]) -> String {
    window
        .iter()
        .map(|m| {
            let role = match m.role {
                MessageRole::User => "User",
                MessageRole::Assistant => "Assistant",
                MessageRole::System => "System",
            };
            format!("{role}: {}", m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
