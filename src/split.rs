//! Dividing a crowd of members into groups of nearby members.
//!
//! Used by insertion when a sphere overflows and by the rebalancer when it
//! bulk-loads a fresh tree.

use crate::config::SplitPolicy;
use crate::metric::Metric;
use crate::sphere::Member;
use order_stat::kth_by;
use rand::rngs::StdRng;
use rand::Rng;

/// Index of the member farthest from `from`; ties go to the lowest index.
fn farthest_from<K, T: Member<K>, M: Metric<K>>(items: &[T], from: &K, metric: &M) -> usize {
    let mut best = (f64::NEG_INFINITY, 0);
    for (i, item) in items.iter().enumerate() {
        let d = metric.distance(from, item.key());
        if d > best.0 {
            best = (d, i);
        }
    }
    best.1
}

pub(crate) struct Splitter<'a, M> {
    pub metric: &'a M,
    pub policy: SplitPolicy,
    pub rng: &'a mut StdRng,
}

impl<'a, M> Splitter<'a, M> {
    /// Randomly select a seed, take the member farthest from it, then the
    /// member farthest from that one.
    fn far_pair<K, T: Member<K>>(&mut self, items: &[T]) -> (usize, usize)
    where
        M: Metric<K>,
    {
        let seed = self.rng.gen_range(0..items.len());
        let a = farthest_from(items, items[seed].key(), self.metric);
        let b = farthest_from(items, items[a].key(), self.metric);
        (a, b)
    }

    /// Split an overflowing member list in two, both halves non-empty.
    pub fn halve<K, T: Member<K>>(&mut self, items: Vec<T>) -> (Vec<T>, Vec<T>)
    where
        M: Metric<K>,
    {
        debug_assert!(items.len() >= 2);
        match self.policy {
            SplitPolicy::Balanced => {
                let half = items.len() / 2;
                self.bisect(items, half)
            }
            SplitPolicy::Hyperplane => self.hyperplane(items),
        }
    }

    /// Cut `items` into the `left_len` members leaning towards one pivot of
    /// a far pair and the rest leaning towards the other.
    pub fn bisect<K, T: Member<K>>(&mut self, items: Vec<T>, left_len: usize) -> (Vec<T>, Vec<T>)
    where
        M: Metric<K>,
    {
        debug_assert!(0 < left_len && left_len < items.len());
        let (a, b) = self.far_pair(&items);
        let scores: Vec<f64> = {
            let (ka, kb) = (items[a].key(), items[b].key());
            items
                .iter()
                .map(|x| self.metric.distance(x.key(), ka) - self.metric.distance(x.key(), kb))
                .collect()
        };
        let mut scored: Vec<(f64, T)> = scores.into_iter().zip(items).collect();
        kth_by(&mut scored, left_len, |x, y| x.0.total_cmp(&y.0));
        let right = scored.split_off(left_len);
        (
            scored.into_iter().map(|(_, t)| t).collect(),
            right.into_iter().map(|(_, t)| t).collect(),
        )
    }

    /// Assign each member to the nearer pivot of a far pair.
    fn hyperplane<K, T: Member<K>>(&mut self, items: Vec<T>) -> (Vec<T>, Vec<T>)
    where
        M: Metric<K>,
    {
        let (a, b) = self.far_pair(&items);
        let to_left: Vec<bool> = {
            let (ka, kb) = (items[a].key(), items[b].key());
            items
                .iter()
                .map(|x| self.metric.distance(x.key(), ka) <= self.metric.distance(x.key(), kb))
                .collect()
        };
        let lefts = to_left.iter().filter(|&&l| l).count();
        if lefts == 0 || lefts == items.len() {
            // every pivot sits at one spot; only a count-based cut can help
            let half = items.len() / 2;
            return self.bisect(items, half);
        }
        let (left, right): (Vec<_>, Vec<_>) = items.into_iter().zip(to_left).partition(|(_, l)| *l);
        (
            left.into_iter().map(|(t, _)| t).collect(),
            right.into_iter().map(|(t, _)| t).collect(),
        )
    }

    /// Divide `items` into `groups` clusters whose sizes differ by at most
    /// one, appending them to `out`.
    ///
    /// `items.len()` must be at least `groups`.
    pub fn partition<K, T: Member<K>>(&mut self, items: Vec<T>, groups: usize, out: &mut Vec<Vec<T>>)
    where
        M: Metric<K>,
    {
        debug_assert!(items.len() >= groups);
        if groups <= 1 {
            out.push(items);
            return;
        }
        let left_groups = groups / 2;
        // floor(len * left_groups / groups) without the overflowing product
        let (per_group, spare) = (items.len() / groups, items.len() % groups);
        let left_len = per_group * left_groups + spare * left_groups / groups;
        let (left, right) = self.bisect(items, left_len);
        self.partition(left, left_groups, out);
        self.partition(right, groups - left_groups, out);
    }
}
