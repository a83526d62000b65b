// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types: the atomic fact record and its typed link graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// A single long-term memory fact.
///
/// Importance, confidence, and any similarity score attached downstream are
/// always kept in [0,1]. Memories are soft-deleted via `archived`, never
/// removed outright.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    /// Stable UUID-format identifier.
    pub id: String,
    /// Owning user; the store scopes every query by this.
    pub user_id: String,
    /// The factual content of this memory.
    pub text: String,
    /// Embedding vector for semantic search. `None` until the fact is embedded.
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
    /// Long-term importance score in [0,1].
    pub importance: f32,
    /// Extraction confidence in [0,1].
    pub confidence: f32,
    /// Times this fact was re-stated in conversation. The strongest
    /// importance signal the evacuator sees.
    pub mention_count: u32,
    /// Times this memory was surfaced into context.
    pub access_count: u32,
    /// Links pointing at this memory.
    pub inbound_links: Vec<MemoryLink>,
    /// Links originating from this memory.
    pub outbound_links: Vec<MemoryLink>,
    /// Soft-delete flag.
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Memory {
    /// Creates a new memory with a fresh id and neutral scores.
    pub fn new(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            text: text.into(),
            embedding: None,
            importance: 0.5,
            confidence: 1.0,
            mention_count: 0,
            access_count: 0,
            inbound_links: Vec::new(),
            outbound_links: Vec::new(),
            archived: false,
            created_at: now,
            updated_at: now,
            last_accessed_at: None,
            expires_at: None,
        }
    }

    /// Sets importance, clamped to [0,1].
    pub fn set_importance(&mut self, value: f32) {
        self.importance = value.clamp(0.0, 1.0);
    }

    /// Sets confidence, clamped to [0,1].
    pub fn set_confidence(&mut self, value: f32) {
        self.confidence = value.clamp(0.0, 1.0);
    }

    /// Total link degree across both directions.
    pub fn link_count(&self) -> usize {
        self.inbound_links.len() + self.outbound_links.len()
    }

    /// The 8-char short form of this memory's id.
    pub fn short_id(&self) -> Option<String> {
        short_id(&self.id)
    }
}

/// First 8 chars of an id after stripping dashes and lowercasing.
///
/// This is the addressing convention LLM prompts and their parsed responses
/// use everywhere (retention checkboxes, evacuation survivors, GC merge
/// targets). Ids shorter than 8 chars after stripping cannot be addressed.
pub fn short_id(id: &str) -> Option<String> {
    let stripped: String = id
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if stripped.chars().count() < 8 {
        return None;
    }
    Some(stripped.chars().take(8).collect())
}

/// Relationship type of a stored memory link. A closed set: parsing any
/// other value is a validation failure.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    Conflicts,
    Supersedes,
    Causes,
    InstanceOf,
    InvalidatedBy,
    MotivatedBy,
}

/// A directed, typed edge between two memories.
///
/// Stored redundantly in both endpoints' link arrays so traversal in either
/// direction needs no extra lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryLink {
    pub from_id: String,
    pub to_id: String,
    pub link_type: LinkType,
    /// Link confidence in [0,1].
    pub confidence: f32,
    /// Free-text justification recorded when the link was created.
    pub reasoning: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MemoryLink {
    pub fn new(from_id: impl Into<String>, to_id: impl Into<String>, link_type: LinkType) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            link_type,
            confidence: 1.0,
            reasoning: None,
            created_at: Utc::now(),
        }
    }
}

/// A memory reached by traversing the link graph from a seed memory.
///
/// `link_type` is an open string here, not [`LinkType`]: traversal may
/// synthesize edges that are never stored, such as `shares_entity` between
/// memories linked to the same entity, or subtyped forms like
/// `supersedes:partial`.
#[derive(Debug, Clone)]
pub struct RelatedMemory {
    pub memory: Memory,
    pub link_type: String,
    /// Edge confidence where the store has one; synthesized edges carry `None`.
    pub link_confidence: Option<f32>,
    pub reasoning: Option<String>,
    /// Traversal distance from the seed, 1 for direct links.
    pub depth: u32,
    /// Id of the memory this one was reached from.
    pub linked_from: String,
}
