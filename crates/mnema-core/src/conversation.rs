// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation history records consumed by the windowing logic.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Speaker role of a conversation message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// Lifecycle of a conversation segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentStatus {
    Active,
    /// The segment was summarized and its detail removed from context.
    Collapsed,
}

/// Typed message metadata. The only fields the memory core reads are the
/// segment markers used to skip collapsed summaries during window building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Marks a message that stands in for a whole conversation segment.
    pub segment_boundary: bool,
    pub status: SegmentStatus,
}

impl Default for MessageMetadata {
    fn default() -> Self {
        Self {
            segment_boundary: false,
            status: SegmentStatus::Active,
        }
    }
}

/// A single message of conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    pub metadata: Option<MessageMetadata>,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            metadata: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            metadata: None,
        }
    }

    /// A collapsed segment-summary message, which window building skips.
    pub fn collapsed_summary(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
            metadata: Some(MessageMetadata {
                segment_boundary: true,
                status: SegmentStatus::Collapsed,
            }),
        }
    }

    /// True when this message is a segment summary whose segment has been
    /// collapsed out of context.
    pub fn is_collapsed_summary(&self) -> bool {
        self.metadata
            .as_ref()
            .is_some_and(|m| m.segment_boundary && m.status == SegmentStatus::Collapsed)
    }
}
