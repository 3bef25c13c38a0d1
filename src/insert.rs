//! Descent, overflow and splitting.

use crate::metric::Metric;
use crate::sphere::{Entry, Node, Sphere};
use crate::split::Splitter;
use std::mem;

/// Index of the child whose center is closest to `key`; ties go to the
/// lowest index.
fn closest_child<K, V, M: Metric<K>>(children: &[Sphere<K, V>], key: &K, metric: &M) -> usize {
    let mut best = (f64::INFINITY, 0);
    for (i, child) in children.iter().enumerate() {
        let d = metric.distance(&child.center, key);
        if d < best.0 {
            best = (d, i);
        }
    }
    best.1
}

impl<K: Clone, V> Sphere<K, V> {
    /// Add a new entry somewhere beneath this sphere.
    ///
    /// The caller has already made sure no entry with a distance-zero key
    /// exists. If this sphere ends up holding more than `fan_out` members it
    /// keeps one half and the other half is returned as a new sibling.
    pub fn insert<M: Metric<K>>(
        &mut self,
        entry: Entry<K, V>,
        fan_out: usize,
        splitter: &mut Splitter<'_, M>,
    ) -> Option<Sphere<K, V>> {
        let d = splitter.metric.distance(&self.center, &entry.key);
        if d > self.radius {
            self.radius = d;
        }

        match &mut self.node {
            Node::Leaf(entries) => entries.push(entry),
            Node::Internal(children) => {
                let i = closest_child(children, &entry.key, splitter.metric);
                if let Some(sibling) = children[i].insert(entry, fan_out, splitter) {
                    children.insert(i + 1, sibling);
                }
            }
        }

        if self.fan() > fan_out {
            Some(self.split(splitter))
        } else {
            None
        }
    }

    /// Replace this sphere with one half of its members and return a new
    /// sphere holding the other half.
    fn split<M: Metric<K>>(&mut self, splitter: &mut Splitter<'_, M>) -> Sphere<K, V> {
        match mem::replace(&mut self.node, Node::Leaf(Vec::new())) {
            Node::Leaf(entries) => {
                log::trace!("splitting leaf of {} entries", entries.len());
                let (left, right) = splitter.halve(entries);
                *self = Sphere::leaf(left, splitter.metric);
                Sphere::leaf(right, splitter.metric)
            }
            Node::Internal(children) => {
                log::trace!("splitting internal sphere of {} children", children.len());
                let (left, right) = splitter.halve(children);
                *self = Sphere::internal(left, splitter.metric);
                Sphere::internal(right, splitter.metric)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SplitPolicy;
    use crate::sphere::tests::line;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn leaf(keys: &[f64]) -> Sphere<f64, usize> {
        let entries = keys
            .iter()
            .enumerate()
            .map(|(i, &key)| Entry { key, value: i })
            .collect();
        Sphere::leaf(entries, &line)
    }

    #[test]
    fn widens_radius_on_the_way_down() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut splitter = Splitter { metric: &line, policy: SplitPolicy::Balanced, rng: &mut rng };
        let mut s = leaf(&[0.0, 1.0, 2.0]);
        assert_eq!(s.radius, 1.0);
        assert!(s.insert(Entry { key: 9.0, value: 9 }, 8, &mut splitter).is_none());
        assert_eq!(s.radius, 8.0);
        assert_eq!(s.fan(), 4);
    }

    #[test]
    fn overflowing_leaf_splits_in_two() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut splitter = Splitter { metric: &line, policy: SplitPolicy::Balanced, rng: &mut rng };
        let mut s = leaf(&[0.0, 1.0, 2.0, 3.0]);
        let sibling = s
            .insert(Entry { key: 4.0, value: 4 }, 4, &mut splitter)
            .expect("fifth entry overflows a fan-out of four");
        let mut sizes = [s.fan(), sibling.fan()];
        sizes.sort();
        assert_eq!(sizes, [2, 3]);
        for half in [&s, &sibling] {
            assert!(half.farthest_entry(&half.center, &line) <= half.radius);
        }
    }

    #[test]
    fn equidistant_children_prefer_the_first() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut splitter = Splitter { metric: &line, policy: SplitPolicy::Balanced, rng: &mut rng };
        let mut parent = Sphere::internal(vec![leaf(&[0.0]), leaf(&[10.0])], &line);
        assert!(parent.insert(Entry { key: 5.0, value: 5 }, 4, &mut splitter).is_none());
        match &parent.node {
            Node::Internal(children) => {
                assert_eq!(children[0].center, 0.0);
                assert_eq!(children[0].fan(), 2);
                assert!(children[0].find(&5.0, &line).is_some());
                assert_eq!(children[1].fan(), 1);
            }
            Node::Leaf(_) => panic!("parent should stay internal"),
        }
    }

    #[test]
    fn descends_to_the_closest_child() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut splitter = Splitter { metric: &line, policy: SplitPolicy::Balanced, rng: &mut rng };
        let mut parent = Sphere::internal(vec![leaf(&[0.0, 1.0]), leaf(&[10.0, 11.0])], &line);
        parent.insert(Entry { key: 9.0, value: 99 }, 4, &mut splitter);
        match &parent.node {
            Node::Internal(children) => {
                let hit = children
                    .iter()
                    .find(|c| c.find(&9.0, &line).is_some())
                    .expect("entry was stored");
                assert!(hit.find(&10.0, &line).is_some());
            }
            Node::Leaf(_) => panic!("parent should stay internal"),
        }
    }
}
