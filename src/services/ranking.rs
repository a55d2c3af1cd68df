//! Group / count / sort / truncate pipeline behind the statistics views.

use std::collections::BTreeMap;

/// Count occurrences of each key and keep the `k` most frequent.
///
/// Ordering is by count descending, ties by key ascending, so the result is
/// reproducible regardless of the order rows came back from the store.
pub fn top_k<K, I>(keys: I, k: usize) -> Vec<(K, i64)>
where
    K: Ord,
    I: IntoIterator<Item = K>,
{
    let mut counts: BTreeMap<K, i64> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }

    // BTreeMap iterates in key order and sort_by is stable
    let mut ranked: Vec<(K, i64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(k);
    ranked
}
