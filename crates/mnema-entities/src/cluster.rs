// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fuzzy clustering of entity name variants.
//!
//! Greedy, longest-first: candidates are processed longest string first
//! on the assumption that longer mentions are the more complete spelling,
//! and each one either joins the best-matching established canonical or
//! becomes a new canonical itself. The result depends on processing
//! order; with the fixed sort and tie-break below it is deterministic for
//! a given input set, but adding a name to the set can change which
//! canonical wins. That is accepted behavior, not a defect to fix here.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use strsim::normalized_levenshtein;

/// Normalized edit similarity of two names, case-insensitive.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Map each input name to the canonical spelling of its cluster.
///
/// A name joins the earliest-established canonical with similarity at or
/// above `threshold`; otherwise it founds its own cluster. Canonical
/// spellings keep their original casing.
pub fn cluster_similar_entities(names: &[String], threshold: f64) -> HashMap<String, String> {
    let mut ordered: Vec<&String> = names.iter().collect();
    ordered.sort_by(|a, b| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });

    let mut canonicals: Vec<String> = Vec::new();
    let mut mapping: HashMap<String, String> = HashMap::new();

    for name in ordered {
        if mapping.contains_key(name.as_str()) {
            continue;
        }
        let mut best: Option<(usize, f64)> = None;
        for (i, canonical) in canonicals.iter().enumerate() {
            let similarity = name_similarity(name, canonical);
            let improves = match best {
                // Strict improvement only: the first-established canonical
                // wins similarity ties.
                Some((_, best_sim)) => similarity > best_sim,
                None => true,
            };
            if improves {
                best = Some((i, similarity));
            }
        }
        match best {
            Some((i, similarity)) if similarity >= threshold => {
                mapping.insert(name.clone(), canonicals[i].clone());
            }
            _ => {
                canonicals.push(name.clone());
                mapping.insert(name.clone(), name.clone());
            }
        }
    }
    mapping
}

/// A canonical entity appearing in two or more of the input sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedEntity {
    pub name: String,
    /// Indices of the input sets containing a member of this cluster,
    /// ascending.
    pub set_indices: Vec<usize>,
}

/// Cluster names across many texts' entity sets and return the canonical
/// entities present in at least two sets.
///
/// This is the co-occurrence primitive: two memories that mention
/// spellings of the same entity share that entity.
pub fn find_shared_entities(entity_sets: &[Vec<String>], threshold: f64) -> Vec<SharedEntity> {
    let all_names: Vec<String> = entity_sets.iter().flatten().cloned().collect();
    let mapping = cluster_similar_entities(&all_names, threshold);

    let mut occurrences: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();
    for (index, set) in entity_sets.iter().enumerate() {
        for name in set {
            if let Some(canonical) = mapping.get(name) {
                occurrences
                    .entry(canonical.clone())
                    .or_default()
                    .insert(index);
            }
        }
    }

    occurrences
        .into_iter()
        .filter(|(_, indices)| indices.len() >= 2)
        .map(|(name, indices)| SharedEntity {
            name,
            set_indices: indices.into_iter().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn close_spellings_join_the_longest_canonical() {
        let input = names(&["Acme Corporatio", "Acme Corporation", "Blue Bakery"]);
        let mapping = cluster_similar_entities(&input, 0.85);
        assert_eq!(mapping["Acme Corporatio"], "Acme Corporation");
        assert_eq!(mapping["Acme Corporation"], "Acme Corporation");
        assert_eq!(mapping["Blue Bakery"], "Blue Bakery");
    }

    #[test]
    fn dissimilar_names_found_their_own_clusters() {
        let input = names(&["Robert Smith", "Bob", "Lisbon"]);
        let mapping = cluster_similar_entities(&input, 0.85);
        assert_eq!(mapping.len(), 3);
        for name in &input {
            assert_eq!(&mapping[name], name);
        }
    }

    #[test]
    fn matching_is_case_insensitive() {
        let input = names(&["LISBON", "Lisbon"]);
        let mapping = cluster_similar_entities(&input, 0.85);
        assert_eq!(mapping["LISBON"], mapping["Lisbon"]);
    }

    #[test]
    fn repeated_runs_produce_identical_mappings() {
        let input = names(&[
            "Robert Smith",
            "Robert Smth",
            "robert smith",
            "Acme Corp",
            "Acme Corp.",
            "Lisbon",
        ]);
        let first = cluster_similar_entities(&input, 0.85);
        let second = cluster_similar_entities(&input, 0.85);
        assert_eq!(first, second);
    }

    #[test]
    fn threshold_is_inclusive() {
        // "abcd" vs "abcde": distance 1 over max len 5 = similarity 0.8.
        let input = names(&["abcde", "abcd"]);
        let at = cluster_similar_entities(&input, 0.8);
        assert_eq!(at["abcd"], "abcde");
        let above = cluster_similar_entities(&input, 0.81);
        assert_eq!(above["abcd"], "abcd");
    }

    #[test]
    fn shared_entities_require_two_sets() {
        let sets = vec![
            names(&["Robert Smith", "Lisbon"]),
            names(&["robert smith"]),
            names(&["Lisbon", "Acme Corp"]),
        ];
        let shared = find_shared_entities(&sets, 0.85);
        assert_eq!(shared.len(), 2);

        let lisbon = shared.iter().find(|s| s.name == "Lisbon").unwrap();
        assert_eq!(lisbon.set_indices, vec![0, 2]);

        let robert = shared
            .iter()
            .find(|s| s.name.to_lowercase() == "robert smith")
            .unwrap();
        assert_eq!(robert.set_indices, vec![0, 1]);
    }

    #[test]
    fn no_overlap_means_no_shared_entities() {
        let sets = vec![names(&["Lisbon"]), names(&["Acme Corp"])];
        assert!(find_shared_entities(&sets, 0.85).is_empty());
    }

    #[test]
    fn name_similarity_bounds() {
        assert!((name_similarity("same", "same") - 1.0).abs() < f64::EPSILON);
        assert!((name_similarity("SAME", "same") - 1.0).abs() < f64::EPSILON);
        assert!(name_similarity("abc", "xyz") < 0.01);
    }

    proptest! {
        #[test]
        fn every_input_name_is_mapped(raw in proptest::collection::vec("[A-Za-z ]{2,12}", 0..8)) {
            let mapping = cluster_similar_entities(&raw, 0.85);
            for name in &raw {
                prop_assert!(mapping.contains_key(name));
            }
        }

        #[test]
        fn canonicals_map_to_themselves(raw in proptest::collection::vec("[A-Za-z]{2,10}", 0..8)) {
            let mapping = cluster_similar_entities(&raw, 0.85);
            for canonical in mapping.values() {
                prop_assert_eq!(&mapping[canonical], canonical);
            }
        }
    }
}
