//! Nearest-neighbor and range search.
//!
//! Both searches rely on the triangle inequality: nothing inside a sphere can
//! be closer to the query than `d(query, center) - radius`, so a sphere whose
//! bound already exceeds the current cut-off is skipped whole.

use crate::metric::Metric;
use crate::sphere::{Entry, Node, Sphere};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;

/// One search hit: a stored entry and its distance from the query.
pub struct Neighbor<'a, K, V> {
    pub key: &'a K,
    pub value: &'a V,
    pub distance: f64,
}

impl<'a, K, V> Clone for Neighbor<'a, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, K, V> Copy for Neighbor<'a, K, V> {}

impl<'a, K: fmt::Debug, V: fmt::Debug> fmt::Debug for Neighbor<'a, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neighbor")
            .field("key", self.key)
            .field("value", self.value)
            .field("distance", &self.distance)
            .finish()
    }
}

/// Heap element ordered by distance, then by the order it was discovered in.
struct Ranked<T> {
    distance: f64,
    seq: usize,
    item: T,
}

impl<T> PartialEq for Ranked<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Ranked<T> {}

impl<T> PartialOrd for Ranked<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Ranked<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.seq.cmp(&other.seq))
    }
}

fn lower_bound<K, V, M: Metric<K>>(sphere: &Sphere<K, V>, query: &K, metric: &M) -> f64 {
    (metric.distance(query, &sphere.center) - sphere.radius).max(0.0)
}

fn into_neighbors<'a, K, V>(found: Vec<Ranked<&'a Entry<K, V>>>) -> Vec<Neighbor<'a, K, V>> {
    found
        .into_iter()
        .map(|r| Neighbor {
            key: &r.item.key,
            value: &r.item.value,
            distance: r.distance,
        })
        .collect()
}

/// The `k` entries closest to `query`, nearest first.
pub(crate) fn nearest<'a, K, V, M: Metric<K>>(
    root: Option<&'a Sphere<K, V>>,
    query: &K,
    k: usize,
    metric: &M,
) -> Vec<Neighbor<'a, K, V>> {
    let root = match root {
        Some(root) if k > 0 => root,
        _ => return Vec::new(),
    };

    // max-heap: the worst of the current best sits on top
    let mut best: BinaryHeap<Ranked<&'a Entry<K, V>>> = BinaryHeap::new();
    let mut pending = BinaryHeap::new();
    let mut seq = 0;
    pending.push(Reverse(Ranked {
        distance: lower_bound(root, query, metric),
        seq,
        item: root,
    }));

    let cutoff = |best: &BinaryHeap<Ranked<&'a Entry<K, V>>>| match best.peek() {
        Some(worst) if best.len() >= k => worst.distance,
        _ => f64::INFINITY,
    };

    while let Some(Reverse(next)) = pending.pop() {
        // spheres come out closest bound first, so nothing left can improve
        if next.distance > cutoff(&best) {
            break;
        }
        match &next.item.node {
            Node::Leaf(entries) => {
                for entry in entries {
                    seq += 1;
                    let hit = Ranked {
                        distance: metric.distance(query, &entry.key),
                        seq,
                        item: entry,
                    };
                    if best.len() < k {
                        best.push(hit);
                    } else if best.peek().map_or(false, |worst| hit < *worst) {
                        best.pop();
                        best.push(hit);
                    }
                }
            }
            Node::Internal(children) => {
                for child in children {
                    let bound = lower_bound(child, query, metric);
                    if bound <= cutoff(&best) {
                        seq += 1;
                        pending.push(Reverse(Ranked {
                            distance: bound,
                            seq,
                            item: child,
                        }));
                    }
                }
            }
        }
    }

    into_neighbors(best.into_sorted_vec())
}

/// Every entry within `radius` of `query`, nearest first.
pub(crate) fn within<'a, K, V, M: Metric<K>>(
    root: Option<&'a Sphere<K, V>>,
    query: &K,
    radius: f64,
    metric: &M,
) -> Vec<Neighbor<'a, K, V>> {
    // also rejects NaN
    if !(radius >= 0.0) {
        return Vec::new();
    }
    let reaches = |sphere: &Sphere<K, V>| metric.distance(query, &sphere.center) - sphere.radius <= radius;

    let mut found = Vec::new();
    let mut stack: Vec<&'a Sphere<K, V>> = root.into_iter().filter(|s| reaches(*s)).collect();
    let mut seq = 0;
    while let Some(sphere) = stack.pop() {
        match &sphere.node {
            Node::Leaf(entries) => {
                for entry in entries {
                    let distance = metric.distance(query, &entry.key);
                    if distance <= radius {
                        seq += 1;
                        found.push(Ranked {
                            distance,
                            seq,
                            item: entry,
                        });
                    }
                }
            }
            Node::Internal(children) => {
                stack.extend(children.iter().rev().filter(|c| reaches(*c)));
            }
        }
    }

    found.sort_unstable();
    into_neighbors(found)
}
