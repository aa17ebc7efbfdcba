use std::cmp::Ordering;

/// Top-`n` selection over (key, value) pairs.
/// - Orders by value descending, then key ascending
/// - Keys are expected to be unique, so the result is deterministic
/// - `n` larger than the input returns everything, ranked
///
/// Complexity: O(m) partition + O(n log n) sort of the head
#[inline]
pub fn top_n_by_value<K: Ord, V: Ord + Copy>(mut pairs: Vec<(K, V)>, n: usize) -> Vec<(K, V)> {
    if n == 0 {
        return Vec::new();
    }
    if n < pairs.len() {
        // everything before n ranks at least as high as pairs[n]
        pairs.select_nth_unstable_by(n, rank_cmp);
        pairs.truncate(n);
    }
    pairs.sort_unstable_by(rank_cmp);
    pairs
}

#[inline(always)]
fn rank_cmp<K: Ord, V: Ord>(a: &(K, V), b: &(K, V)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}
