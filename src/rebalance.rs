//! Bulk loading.
//!
//! Inserting pre-sorted data one key at a time leaves a trail of half-empty
//! leaves behind the insertion front. Rebuilding from scratch packs every
//! level as full as the fan-out allows.

use crate::metric::Metric;
use crate::sphere::{Entry, Sphere};
use crate::split::Splitter;

fn groups_needed(members: usize, fan_out: usize) -> usize {
    members.div_ceil(fan_out)
}

/// Build a tree over `entries` from the leaves up.
///
/// Entries are carved into the fewest possible leaves by recursive far-pair
/// bisection, and the resulting spheres are grouped the same way, level by
/// level, until a single root remains. Every leaf ends up at the same depth.
pub(crate) fn bulk_load<K: Clone, V, M: Metric<K>>(
    entries: Vec<Entry<K, V>>,
    fan_out: usize,
    splitter: &mut Splitter<'_, M>,
) -> Option<Sphere<K, V>> {
    if entries.is_empty() {
        return None;
    }
    let metric = splitter.metric;

    let leaves = groups_needed(entries.len(), fan_out);
    let mut groups = Vec::with_capacity(leaves);
    splitter.partition(entries, leaves, &mut groups);
    let mut level: Vec<Sphere<K, V>> = groups
        .into_iter()
        .map(|group| Sphere::leaf(group, metric))
        .collect();

    while level.len() > 1 {
        let parents = groups_needed(level.len(), fan_out);
        log::trace!("grouping {} spheres under {} parents", level.len(), parents);
        let mut groups = Vec::with_capacity(parents);
        splitter.partition(level, parents, &mut groups);
        level = groups
            .into_iter()
            .map(|group| Sphere::internal(group, metric))
            .collect();
    }
    level.pop()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SplitPolicy;
    use crate::sphere::tests::line;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn load(n: usize, fan_out: usize) -> Option<Sphere<f64, usize>> {
        let mut rng = StdRng::seed_from_u64(9);
        let mut splitter = Splitter { metric: &line, policy: SplitPolicy::Balanced, rng: &mut rng };
        let entries = (0..n).map(|i| Entry { key: i as f64, value: i }).collect();
        bulk_load(entries, fan_out, &mut splitter)
    }

    #[test]
    fn nothing_in_nothing_out() {
        assert!(load(0, 4).is_none());
    }

    #[test]
    fn huge_fan_out_packs_one_leaf() {
        let root = load(10, usize::MAX).unwrap();
        assert_eq!(root.sphere_count(), 1);
        assert_eq!(root.fan(), 10);
        assert_eq!(groups_needed(usize::MAX, usize::MAX), 1);
        assert_eq!(groups_needed(usize::MAX, 2), usize::MAX / 2 + 1);
    }

    #[test]
    fn small_input_is_one_leaf() {
        let root = load(4, 4).unwrap();
        assert_eq!(root.sphere_count(), 1);
        assert_eq!(root.radius, 2.0);
    }

    #[test]
    fn levels_are_packed() {
        // 100 entries, fan-out 4: 25 leaves, 7 parents, 2 grandparents, 1 root
        let root = load(100, 4).unwrap();
        assert_eq!(root.sphere_count(), 25 + 7 + 2 + 1);
        assert_eq!(root.depth(), 4);
        let mut drained = Vec::new();
        root.drain_into(&mut drained);
        let mut values: Vec<usize> = drained.into_iter().map(|e| e.value).collect();
        values.sort();
        assert_eq!(values, (0..100).collect::<Vec<_>>());
    }
}
