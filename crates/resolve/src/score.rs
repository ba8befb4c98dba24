//! Sequence-matching similarity.
//!
//! `ratio` is the Ratcliff/Obershelp measure: find the longest common
//! contiguous block, recurse on the unmatched text to its left and right,
//! and return `2 * matched / (len(a) + len(b))`. It rewards shared runs of
//! characters rather than penalizing edits, which suits product labels with
//! inserted or shuffled words.

/// Similarity in `[0.0, 1.0]` between two strings, compared by `char`.
///
/// `ratio(a, a) == 1.0`, `ratio("", "") == 1.0`, `ratio("", b) == 0.0` for
/// non-empty `b`, and `ratio(a, b) == ratio(b, a)`.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    // Block discovery breaks ties by position, so fix the argument order.
    let (first, second) = if (a.len(), &a) <= (b.len(), &b) { (&a, &b) } else { (&b, &a) };
    let matched = matched_chars(first, second);

    2.0 * matched as f64 / total as f64
}

/// Total length of the matching blocks between `a` and `b`.
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_block(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        total += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }

    total
}

/// Longest common block within `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(i, j, size)`. Among equally long blocks the one that ends first
/// in `a`, then in `b`, wins.
fn longest_block(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut prev = vec![0usize; width + 1];
    let mut cur = vec![0usize; width + 1];
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[col - 1] + 1;
                cur[col] = k;
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            } else {
                cur[col] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(ratio("蒜香芝士麵包", "蒜香芝士麵包"), 1.0);
        assert_eq!(ratio("", ""), 1.0);
    }

    #[test]
    fn empty_against_nonempty_scores_zero() {
        assert_eq!(ratio("", "abc"), 0.0);
        assert_eq!(ratio("abc", ""), 0.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(ratio("abc", "xyz"), 0.0);
        assert_eq!(ratio("牛角包", "司康"), 0.0);
    }

    #[test]
    fn one_character_substitution() {
        // 4 of 5 chars match on each side: 2*4 / 10
        assert!(close(ratio("原味牛角飽", "原味牛角包"), 0.8));
    }

    #[test]
    fn matches_sequence_matcher_reference_values() {
        // Reference values from the classic gestalt implementation.
        assert!(close(ratio("abcd", "bcde"), 0.75));
        assert!(close(ratio("tide", "diet"), 0.5));
        assert!(close(ratio("hello world", "hello"), 10.0 / 16.0));
    }

    #[test]
    fn counts_blocks_on_both_sides_of_the_longest() {
        // "ab" + "de" around a mismatched middle char.
        assert!(close(ratio("abXde", "abYde"), 0.8));
    }

    #[test]
    fn symmetric_on_reordered_text() {
        let pairs = [("tide", "diet"), ("abcd", "dcba"), ("原味生吐司", "生吐司原味")];
        for (a, b) in pairs {
            assert_eq!(ratio(a, b), ratio(b, a), "{a} vs {b}");
        }
    }

    #[test]
    fn long_repetitive_strings_match_almost_fully() {
        let a = "x".repeat(300);
        let b = format!("{}y", "x".repeat(300));
        assert!(ratio(&a, &b) > 0.99);
    }
}
