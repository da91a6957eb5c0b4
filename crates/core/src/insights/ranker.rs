//! Ordering of scored entities.

use std::cmp::Ordering;

/// Sort scored entries by descending score, break ties by ascending entity
/// id, and optionally truncate. The sort is stable and the tie-break key
/// deterministic, so identical inputs always produce identical output
/// order. Entries are reordered, never mutated.
pub fn rank_by_score<T>(
    mut entries: Vec<T>,
    score: impl Fn(&T) -> f64,
    entity_id: impl Fn(&T) -> &str,
    limit: Option<usize>,
) -> Vec<T> {
    entries.sort_by(|a, b| {
        score(b)
            .partial_cmp(&score(a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| entity_id(a).cmp(entity_id(b)))
    });

    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}
