// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named-entity anchor nodes for the memory link graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::memory::short_id;

/// Entity tags the extractor accepts. A closed set: NER spans with any
/// other label are discarded.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Person,
    Organization,
    Place,
    Product,
    Event,
    WorkOfArt,
    Law,
    Language,
    Group,
    Facility,
}

/// A canonical named-entity node.
///
/// `name` is the fuzzy-cluster representative chosen for a group of mention
/// spellings, not any particular mention. Entity embeddings are coarser than
/// memory embeddings since they only drive merge-candidate search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub entity_type: EntityType,
    #[serde(skip)]
    pub embedding: Option<Vec<f32>>,
    /// Number of memories currently linked to this entity.
    pub link_count: u32,
    /// When a memory was last linked. `None` means no link on record.
    pub last_linked_at: Option<DateTime<Utc>>,
    /// Soft-delete flag; set by GC delete decisions and by merges.
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    /// Creates a new entity with a fresh id and no links.
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        entity_type: EntityType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            name: name.into(),
            entity_type,
            embedding: None,
            link_count: 0,
            last_linked_at: None,
            archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// The 8-char short form of this entity's id, as used in GC review prompts.
    pub fn short_id(&self) -> Option<String> {
        short_id(&self.id)
    }
}
