use crate::model::{Candidate, Vocabulary};
use crate::score::ratio;

/// Number of candidates offered when no limit is configured.
pub const DEFAULT_LIMIT: usize = 5;

/// Score `input` against every vocabulary entry and keep the best `limit`.
///
/// Sorted by descending score; equal scores keep vocabulary order. This is a
/// full scan, `O(|vocabulary| * len²)` per call, which is fine for the
/// hundreds of entries a product list holds but is the ceiling for anything
/// much larger.
pub fn rank(input: &str, vocabulary: &Vocabulary, limit: usize) -> Vec<Candidate> {
    if limit == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<Candidate> = vocabulary
        .iter()
        .enumerate()
        .map(|(position, entry)| Candidate {
            entry: entry.clone(),
            score: ratio(input, entry.as_str()),
            position,
        })
        .collect();

    // `sort_by` is stable, so ties stay in vocabulary order.
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(limit);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(items: &[&str]) -> Vocabulary {
        items.iter().collect()
    }

    #[test]
    fn empty_vocabulary_ranks_nothing() {
        assert!(rank("隨便輸入", &Vocabulary::new(), DEFAULT_LIMIT).is_empty());
    }

    #[test]
    fn best_match_first() {
        let v = vocab(&["原味司康", "原味牛角包", "牛角窩夫"]);
        let ranked = rank("原味牛角飽", &v, DEFAULT_LIMIT);
        assert_eq!(ranked[0].entry.as_str(), "原味牛角包");
        assert_eq!(ranked[0].position, 1);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn ties_keep_vocabulary_order() {
        let v = vocab(&["xa", "xb", "xc"]);
        let ranked = rank("x", &v, DEFAULT_LIMIT);
        let order: Vec<usize> = ranked.iter().map(|c| c.position).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn truncates_to_limit() {
        let v = vocab(&["a", "b", "c", "d", "e", "f", "g"]);
        assert_eq!(rank("a", &v, DEFAULT_LIMIT).len(), 5);
        assert_eq!(rank("a", &v, 2).len(), 2);
        assert!(rank("a", &v, 0).is_empty());
    }
}
