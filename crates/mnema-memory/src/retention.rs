// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure per-turn retention: filter previously surfaced memories down to the
//! pinned set and merge them with freshly retrieved ones.

use std::collections::HashSet;

use mnema_core::memory::short_id;

use crate::types::SurfacedMemory;

/// Keep the previously surfaced memories whose 8-char short id is pinned.
///
/// Input order is preserved. Memories whose id cannot be shortened were
/// never addressable by the retention checklist and are never retained.
pub fn apply_retention(
    previous: Vec<SurfacedMemory>,
    pinned_ids: &HashSet<String>,
) -> Vec<SurfacedMemory> {
    previous
        .into_iter()
        .filter(|m| match m.short_id() {
            Some(short) => pinned_ids.contains(&short),
            None => false,
        })
        .collect()
}

/// Merge pinned memories with freshly retrieved ones.
///
/// Pinned memories come first in their original order; fresh memories
/// follow in retrieval order. When the same memory appears in both, the
/// pinned copy wins: it carries the similarity score from the turn that
/// originally surfaced it. Fresh memories without an id are dropped.
pub fn merge_memories(
    pinned: Vec<SurfacedMemory>,
    fresh: Vec<SurfacedMemory>,
) -> Vec<SurfacedMemory> {
    let mut seen: HashSet<String> = pinned
        .iter()
        .filter(|m| !m.memory.id.is_empty())
        .map(|m| m.memory.id.clone())
        .collect();

    let mut merged = pinned;
    for memory in fresh {
        if memory.memory.id.is_empty() {
            continue;
        }
        if seen.insert(memory.memory.id.clone()) {
            merged.push(memory);
        }
    }
    merged
}

/// Short ids of every memory in the slice, for prompt checklists and
/// fail-open pinning.
pub fn short_ids(memories: &[SurfacedMemory]) -> HashSet<String> {
    memories
        .iter()
        .filter_map(|m| short_id(&m.memory.id))
        .collect()
}
