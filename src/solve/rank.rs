//! Ordering helpers shared by the solvers.
//!
//! Every ordering here is stable, so equal keys keep their input order and
//! the solvers stay deterministic.

/// Sort direction for [`rank_by_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// Stable-sort `items` by an extracted key.
pub fn rank_by_key<T, K, F>(items: &mut [T], order: Order, key: F)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    match order {
        Order::Ascending => items.sort_by(|a, b| key(a).cmp(&key(b))),
        Order::Descending => items.sort_by(|a, b| key(b).cmp(&key(a))),
    }
}

/// Rank `(index, count)` pairs by count. Ties keep their input order.
pub fn rank_by_count<I>(pairs: I, order: Order) -> Vec<(usize, usize)>
where
    I: IntoIterator<Item = (usize, usize)>,
{
    let mut ranked: Vec<(usize, usize)> = pairs.into_iter().collect();
    rank_by_key(&mut ranked, order, |&(_, count)| count);
    ranked
}

/// The first item whose key is maximal.
///
/// `Iterator::max_by_key` returns the last of several equal maxima; the
/// solvers need the first one.
pub fn first_max_by_key<I, K, F>(items: I, key: F) -> Option<I::Item>
where
    I: IntoIterator,
    K: Ord,
    F: Fn(&I::Item) -> K,
{
    let mut best: Option<(K, I::Item)> = None;
    for item in items {
        let k = key(&item);
        let better = match &best {
            Some((best_key, _)) => k > *best_key,
            None => true,
        };
        if better {
            best = Some((k, item));
        }
    }
    best.map(|(_, item)| item)
}
