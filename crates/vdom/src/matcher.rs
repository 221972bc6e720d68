//! Node identity heuristics and child-list reconciliation.

use crate::node::{Attributes, VNode};

/// Same-index pairs above this similarity are matched without searching.
pub const POSITION_MATCH_THRESHOLD: f64 = 0.7;
/// The best search candidate must score above this to be accepted.
// Both thresholds are empirical; changing them changes the produced scripts.
pub const BEST_MATCH_THRESHOLD: f64 = 0.5;

/// Whether two nodes could be the same node: same kind, and identical data for character
/// data or equal names for elements. Attributes are not compared.
pub fn elements_match(a: &VNode, b: &VNode) -> bool {
    match (a, b) {
        (VNode::Element(a), VNode::Element(b)) => a.name == b.name,
        (VNode::Text(a), VNode::Text(b)) | (VNode::Comment(a), VNode::Comment(b)) => {
            a.data == b.data
        }
        (VNode::Fragment(_), VNode::Fragment(_)) => true,
        _ => false,
    }
}

/// Explicit identity hint: `data-key`, falling back to `id`.
pub fn element_key(node: &VNode) -> Option<&str> {
    node.attributes().and_then(key_of)
}

fn key_of(attributes: &Attributes) -> Option<&str> {
    attributes.get("data-key").or_else(|| attributes.get("id"))
}

/// Similarity in `[0, 1]`. Different kinds or element names score 0. Elements sharing a key
/// score 1; otherwise the score is the share of the attribute-name union whose values agree.
pub fn calculate_similarity(a: &VNode, b: &VNode) -> f64 {
    let (a, b) = match (a, b) {
        (VNode::Element(a), VNode::Element(b)) => (a, b),
        _ if a.kind() == b.kind() => return 1.0,
        _ => return 0.0,
    };
    if a.name != b.name {
        return 0.0;
    }
    if let (Some(key_a), Some(key_b)) = (key_of(&a.attributes), key_of(&b.attributes)) {
        if key_a == key_b {
            return 1.0;
        }
    }
    if a.attributes.is_empty() && b.attributes.is_empty() {
        return 1.0;
    }
    let union = a.attributes.len()
        + b.attributes.keys().filter(|k| !a.attributes.contains(k)).count();
    let agreeing = a
        .attributes
        .iter()
        .filter(|(k, v)| b.attributes.get(k) == Some(*v))
        .count();
    agreeing as f64 / union as f64
}

/// Finds the best unused candidate for `old`.
///
/// A key match or identical character data wins outright; otherwise the highest similarity
/// wins if it exceeds [`BEST_MATCH_THRESHOLD`]. Ties keep the earliest candidate.
pub fn find_best_match(old: &VNode, candidates: &[VNode], used: &[bool]) -> Option<usize> {
    let is_free = |i: usize| !used.get(i).copied().unwrap_or(false);
    let old_key = element_key(old);

    let exact = candidates.iter().enumerate().position(|(i, candidate)| {
        if !is_free(i) {
            return false;
        }
        match (old_key, element_key(candidate)) {
            (Some(a), Some(b)) => a == b,
            _ => {
                old.data().is_some()
                    && old.kind() == candidate.kind()
                    && old.data() == candidate.data()
            }
        }
    });
    if exact.is_some() {
        return exact;
    }

    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        if !is_free(i) {
            continue;
        }
        let score = calculate_similarity(old, candidate);
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((i, score));
        }
    }
    best.filter(|&(_, score)| score > BEST_MATCH_THRESHOLD)
        .map(|(i, _)| i)
}

/// Aligns two sibling lists, returning `(old_index, new_index)` pairs sorted by old index.
pub fn reconcile(old: &[VNode], new: &[VNode]) -> Vec<(usize, usize)> {
    let mut used = vec![false; new.len()];
    let mut paired = vec![false; old.len()];
    let mut pairs = Vec::new();

    for i in 0..old.len().min(new.len()) {
        if calculate_similarity(&old[i], &new[i]) > POSITION_MATCH_THRESHOLD {
            used[i] = true;
            paired[i] = true;
            pairs.push((i, i));
        }
    }

    for (i, child) in old.iter().enumerate() {
        if paired[i] {
            continue;
        }
        if let Some(j) = find_best_match(child, new, &used) {
            used[j] = true;
            paired[i] = true;
            pairs.push((i, j));
        }
    }

    pairs.sort_unstable();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Element;

    fn el(name: &str, attributes: &[(&str, &str)]) -> VNode {
        let mut element = Element::new(name);
        for (k, v) in attributes {
            element.attributes.set(*k, *v);
        }
        element.into()
    }

    #[test]
    fn match_ignores_attributes_but_not_names_or_data() {
        assert!(elements_match(&el("P", &[("a", "1")]), &el("P", &[])));
        assert!(!elements_match(&el("P", &[]), &el("DIV", &[])));
        assert!(elements_match(&VNode::text("x"), &VNode::text("x")));
        assert!(!elements_match(&VNode::text("x"), &VNode::text("y")));
        assert!(!elements_match(&VNode::text("x"), &VNode::comment("x")));
    }

    #[test]
    fn similarity_is_agreeing_keys_over_union() {
        let a = el("P", &[("class", "a"), ("title", "t")]);
        let b = el("P", &[("class", "b"), ("title", "t"), ("lang", "en")]);
        assert!((calculate_similarity(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(calculate_similarity(&el("P", &[]), &el("P", &[])), 1.0);
        assert_eq!(calculate_similarity(&el("P", &[]), &el("DIV", &[])), 0.0);
        assert_eq!(calculate_similarity(&VNode::text("a"), &VNode::text("b")), 1.0);
        assert_eq!(calculate_similarity(&VNode::text("a"), &el("P", &[])), 0.0);
    }

    #[test]
    fn shared_key_forces_full_similarity() {
        let a = el("LI", &[("data-key", "a"), ("class", "x")]);
        let a2 = el("LI", &[("data-key", "a"), ("class", "y")]);
        let b = el("LI", &[("data-key", "b"), ("class", "x")]);
        assert_eq!(calculate_similarity(&a, &a2), 1.0);
        // Differing keys fall back to attribute agreement: class agrees, data-key does not.
        assert_eq!(calculate_similarity(&a, &b), 0.5);
        assert_eq!(
            element_key(&el("LI", &[("id", "i"), ("data-key", "k")])),
            Some("k")
        );
        assert_eq!(element_key(&el("LI", &[("id", "i")])), Some("i"));
    }

    #[test]
    fn differing_ids_still_score_by_attribute_agreement() {
        let a = el("LI", &[("id", "a"), ("class", "x"), ("title", "t"), ("lang", "en")]);
        let b = el("LI", &[("id", "b"), ("class", "x"), ("title", "t"), ("lang", "en")]);
        assert_eq!(calculate_similarity(&a, &b), 0.75);
    }

    #[test]
    fn equal_keys_do_not_bridge_different_names() {
        let li = el("LI", &[("id", "a")]);
        let div = el("DIV", &[("id", "a")]);
        assert_eq!(calculate_similarity(&li, &div), 0.0);
    }

    #[test]
    fn best_match_prefers_keys_and_respects_threshold() {
        let old = el("LI", &[("data-key", "c")]);
        let candidates = [
            el("LI", &[("data-key", "a")]),
            el("LI", &[("data-key", "c")]),
        ];
        assert_eq!(find_best_match(&old, &candidates, &[false, false]), Some(1));
        assert_eq!(find_best_match(&old, &candidates, &[false, true]), None);

        let old = el("P", &[("class", "a"), ("title", "t")]);
        let weak = [el("P", &[("class", "b"), ("title", "t")])];
        assert_eq!(find_best_match(&old, &weak, &[false]), None);
    }

    #[test]
    fn best_match_finds_identical_text() {
        let old = VNode::text("b");
        let candidates = [VNode::text("a"), VNode::text("b")];
        assert_eq!(find_best_match(&old, &candidates, &[false, false]), Some(1));
    }

    #[test]
    fn reconcile_pairs_pure_reorder_by_key() {
        let old = [
            el("LI", &[("data-key", "a")]),
            el("LI", &[("data-key", "b")]),
            el("LI", &[("data-key", "c")]),
        ];
        let new = [
            el("LI", &[("data-key", "c")]),
            el("LI", &[("data-key", "a")]),
            el("LI", &[("data-key", "b")]),
        ];
        assert_eq!(reconcile(&old, &new), vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn reconcile_leaves_unmatched_children_out() {
        let old = [el("P", &[]), el("UL", &[])];
        let new = [el("P", &[]), el("OL", &[]), el("UL", &[])];
        assert_eq!(reconcile(&old, &new), vec![(0, 0), (1, 2)]);
    }
}
