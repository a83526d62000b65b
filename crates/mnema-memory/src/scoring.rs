// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure scoring primitives: cosine similarity, Reciprocal Rank Fusion,
//! sigmoid normalization, string similarity, Jaccard co-occurrence, and
//! importance-dot rendering.
//!
//! Everything here is stateless; services layer these into retrieval and
//! GC decisions.

use std::collections::{HashMap, HashSet};

/// RRF constant per research literature.
pub const RRF_K: f32 = 60.0;

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or zero-norm inputs rather than
/// panicking; callers feed this raw store data.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Reciprocal Rank Fusion: merge two ranked lists into a single ranking.
///
/// RRF score for document d = sum(1 / (k + rank_i + 1)) over each list
/// containing d, with k = 60 per Cormack et al. Rank-based fusion avoids
/// the scale mismatch between lexical and cosine scores; the raw scores in
/// the input pairs only establish order and are otherwise ignored.
///
/// Both input lists must be ordered most relevant first. The fused output
/// is ordered by RRF score descending, ties broken by id ascending so the
/// ranking is deterministic.
pub fn reciprocal_rank_fusion(
    lexical_results: &[(String, f64)],
    vector_results: &[(String, f32)],
) -> Vec<(String, f32)> {
    let mut scores: HashMap<String, f32> = HashMap::new();

    for (rank, (id, _)) in lexical_results.iter().enumerate() {
        *scores.entry(id.clone()).or_insert(0.0) += 1.0 / (RRF_K + rank as f32 + 1.0);
    }

    for (rank, (id, _)) in vector_results.iter().enumerate() {
        *scores.entry(id.clone()).or_insert(0.0) += 1.0 / (RRF_K + rank as f32 + 1.0);
    }

    let mut fused: Vec<(String, f32)> = scores.into_iter().collect();
    fused.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    fused
}

/// Map a raw RRF score into [0,1] via a sigmoid centered on `midpoint`.
///
/// Raw RRF scores live in a narrow band near zero (a solo rank-0 hit
/// scores 1/61), useless for thresholding directly. With the default
/// midpoint of 1/(k+1) a memory ranked first in exactly one list lands at
/// 0.5; a memory ranked first in both lists approaches 1.0.
pub fn sigmoid_normalize(raw: f32, midpoint: f32, steepness: f32) -> f32 {
    let normalized = 1.0 / (1.0 + (-steepness * (raw - midpoint)).exp());
    normalized.clamp(0.0, 1.0)
}

/// Normalized edit-distance ratio between two strings, case-insensitive.
///
/// 1.0 for identical strings (ignoring case), 0.0 for entirely different.
/// Entity name casing is preserved for display but never discriminates
/// during matching.
pub fn string_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Jaccard similarity of two id sets: |A ∩ B| / |A ∪ B|.
///
/// Empty-union input yields 0.0, not 1.0: two entities with no linked
/// memories share no evidence of co-occurrence.
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f64 / union as f64
}

/// Render an importance score as a 5-dot glyph, `●`×k + `○`×(5−k).
///
/// k = round(importance·5) clamped to [1,5] for any positive importance:
/// a barely-positive score still renders one filled dot, so the prompt
/// never presents a live memory as worthless. Zero (or negative) renders
/// all hollow.
pub fn importance_dots(importance: f32) -> String {
    let filled = if importance > 0.0 {
        ((importance * 5.0).round() as i32).clamp(1, 5) as usize
    } else {
        0
    };
    let mut dots = String::with_capacity(5 * '●'.len_utf8());
    for _ in 0..filled {
        dots.push('●');
    }
    for _ in filled..5 {
        dots.push('○');
    }
    dots
}
