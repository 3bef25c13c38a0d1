//! Deletion with lazy structural repair.
//!
//! Radii are never tightened here. A sphere that lost its farthest entry
//! keeps covering the old region until the next rebalance.

use crate::metric::Metric;
use crate::sphere::{Node, Sphere};

impl<K, V> Sphere<K, V> {
    /// Remove the entry stored under `key` from this subtree.
    ///
    /// Children left empty are dropped, so the caller only has to check
    /// whether this sphere itself became empty.
    pub fn remove<M: Metric<K>>(&mut self, key: &K, metric: &M) -> Option<V> {
        match &mut self.node {
            Node::Leaf(entries) => {
                let i = entries.iter().position(|e| metric.distance(&e.key, key) == 0.0)?;
                Some(entries.remove(i).value)
            }
            Node::Internal(children) => {
                for i in 0..children.len() {
                    if !children[i].may_contain(key, metric) {
                        continue;
                    }
                    if let Some(value) = children[i].remove(key, metric) {
                        if children[i].is_empty() {
                            children.remove(i);
                        }
                        return Some(value);
                    }
                }
                None
            }
        }
    }
}
