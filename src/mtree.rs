//! The map itself.

use crate::config::MTreeConfig;
use crate::error::Result;
use crate::iter::{Entries, IntoIter, Keys, Values};
use crate::metric::Metric;
use crate::query::{self, Neighbor};
use crate::rebalance;
use crate::sphere::{Entry, Node, Sphere};
use crate::split::Splitter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::mem;

/// A map whose keys live in a metric space.
///
/// Keys need no `Eq`, `Ord` or `Hash`; the tree learns everything about them
/// from the [`Metric`] it was built with, and two keys at distance `0.0` are
/// the same key. Keys must be `Clone` to be inserted because spheres keep
/// copies of keys as their centers.
///
/// ```
/// use mtree::{Euclidean, MTree};
///
/// let mut tree = MTree::new(Euclidean);
/// tree.insert([0.0, 0.0], "origin");
/// tree.insert([3.0, 4.0], "far");
/// tree.insert([1.0, 0.0], "near");
///
/// let hits = tree.nearest(&[0.2, 0.0], 2);
/// assert_eq!(*hits[0].value, "origin");
/// assert_eq!(*hits[1].value, "near");
///
/// assert_eq!(tree.within(&[3.0, 3.0], 1.0).len(), 1);
/// ```
///
/// The tree is a plain owned value: reads take `&self` and writes take
/// `&mut self`, so an iterator or search result can never observe a
/// concurrent mutation. Wrap it in a lock to share it between threads.
pub struct MTree<K, V, M> {
    root: Option<Sphere<K, V>>,
    metric: M,
    len: usize,
    config: MTreeConfig,
    rng: StdRng,
}

impl<K, V, M> MTree<K, V, M> {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of spheres, internal and leaf, in the current hierarchy.
    ///
    /// For the same number of entries, fewer spheres means a tighter tree;
    /// see [`rebalance`](MTree::rebalance).
    pub fn sphere_count(&self) -> usize {
        self.root.as_ref().map_or(0, Sphere::sphere_count)
    }

    /// Number of sphere levels, `0` for an empty tree.
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, Sphere::depth)
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    pub fn config(&self) -> &MTreeConfig {
        &self.config
    }

    /// Every `(key, value)` pair, each exactly once, in no particular order.
    pub fn entries(&self) -> Entries<'_, K, V> {
        Entries::new(self.root.as_ref(), self.len)
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.entries())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.entries())
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }
}

impl<K, V, M: Metric<K>> MTree<K, V, M> {
    /// Create an empty tree with the default configuration.
    pub fn new(metric: M) -> Self {
        let config = MTreeConfig::default();
        MTree {
            root: None,
            metric,
            len: 0,
            rng: StdRng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Create an empty tree, rejecting configurations a tree cannot run with.
    pub fn with_config(metric: M, config: MTreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(MTree {
            root: None,
            metric,
            len: 0,
            rng: StdRng::seed_from_u64(config.seed),
            config,
        })
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let root = self.root.as_ref()?;
        if !root.may_contain(key, &self.metric) {
            return None;
        }
        root.find(key, &self.metric)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let root = self.root.as_mut()?;
        if !root.may_contain(key, &self.metric) {
            return None;
        }
        root.find_mut(key, &self.metric)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Remove the entry stored under `key`, returning its value.
    ///
    /// Spheres emptied by the removal are discarded, but the radii of the
    /// spheres that remain are not tightened.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let root = self.root.as_mut()?;
        if !root.may_contain(key, &self.metric) {
            return None;
        }
        let value = root.remove(key, &self.metric)?;
        self.len -= 1;
        self.collapse_root();
        Some(value)
    }

    fn collapse_root(&mut self) {
        loop {
            match self.root.take() {
                Some(root) if root.is_empty() => {
                    log::trace!("last entry removed, tree is empty");
                    return;
                }
                Some(Sphere {
                    node: Node::Internal(mut children),
                    ..
                }) if children.len() == 1 => {
                    log::trace!("root has a single child, dropping a level");
                    self.root = children.pop();
                }
                other => {
                    self.root = other;
                    return;
                }
            }
        }
    }

    /// The `k` entries closest to `query`, nearest first.
    ///
    /// Returns every entry when `k >= len()` and nothing when `k == 0`.
    /// Entries at equal distance come back in a fixed order for a given
    /// tree.
    pub fn nearest(&self, query: &K, k: usize) -> Vec<Neighbor<'_, K, V>> {
        query::nearest(self.root.as_ref(), query, k, &self.metric)
    }

    /// The single closest entry, if any.
    pub fn nearest_one(&self, query: &K) -> Option<Neighbor<'_, K, V>> {
        self.nearest(query, 1).pop()
    }

    /// Every entry within `radius` of `query` (inclusive), nearest first.
    ///
    /// A negative or NaN radius matches nothing.
    pub fn within(&self, query: &K, radius: f64) -> Vec<Neighbor<'_, K, V>> {
        query::within(self.root.as_ref(), query, radius, &self.metric)
    }
}

impl<K: Clone, V, M: Metric<K>> MTree<K, V, M> {
    /// Insert a value under `key`.
    ///
    /// If a key at distance zero is already present its value is replaced
    /// and the old value is returned; the stored key is kept.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.get_mut(&key) {
            return Some(mem::replace(slot, value));
        }

        let MTree {
            root,
            metric,
            len,
            config,
            rng,
        } = self;
        let metric = &*metric;
        let mut splitter = Splitter {
            metric,
            policy: config.split_policy,
            rng,
        };
        let entry = Entry { key, value };
        *root = Some(match root.take() {
            None => Sphere::leaf(vec![entry], metric),
            Some(mut top) => match top.insert(entry, config.fan_out, &mut splitter) {
                None => top,
                Some(sibling) => {
                    log::trace!("root split, depth now {}", top.depth() + 1);
                    Sphere::internal(vec![top, sibling], metric)
                }
            },
        });
        *len += 1;
        None
    }

    /// Rebuild the sphere hierarchy from scratch.
    ///
    /// Content is untouched. The new tree packs every level as full as the
    /// fan-out allows, so it never has more spheres than the tree it
    /// replaces, and usually far fewer when the keys were inserted in sorted
    /// order.
    pub fn rebalance(&mut self) {
        let before = self.sphere_count();
        let mut entries = Vec::with_capacity(self.len);
        if let Some(root) = self.root.take() {
            root.drain_into(&mut entries);
        }
        debug_assert_eq!(entries.len(), self.len);

        let mut splitter = Splitter {
            metric: &self.metric,
            policy: self.config.split_policy,
            rng: &mut self.rng,
        };
        self.root = rebalance::bulk_load(entries, self.config.fan_out, &mut splitter);
        log::debug!(
            "rebalanced {} entries: {} spheres before, {} after",
            self.len,
            before,
            self.sphere_count()
        );
    }
}

impl<K: Clone, V, M: Metric<K>> Extend<(K, V)> for MTree<K, V, M> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V, M> IntoIterator for &'a MTree<K, V, M> {
    type Item = (&'a K, &'a V);
    type IntoIter = Entries<'a, K, V>;

    fn into_iter(self) -> Entries<'a, K, V> {
        self.entries()
    }
}

impl<K, V, M> IntoIterator for MTree<K, V, M> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter::new(self.root, self.len)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, M> fmt::Debug for MTree<K, V, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

#[cfg(test)]
impl<K, V, M: Metric<K>> MTree<K, V, M> {
    /// Panic if any structural invariant is broken.
    pub(crate) fn assert_invariants(&self) {
        fn walk<K, V, M: Metric<K>>(
            sphere: &Sphere<K, V>,
            depth: usize,
            fan_out: usize,
            metric: &M,
            leaf_depths: &mut Vec<usize>,
            entries: &mut usize,
        ) {
            assert!(!sphere.is_empty(), "empty sphere at depth {}", depth);
            assert!(sphere.fan() <= fan_out, "sphere of {} members", sphere.fan());
            let reach = sphere.farthest_entry(&sphere.center, metric);
            assert!(reach <= sphere.radius, "radius {} does not cover {}", sphere.radius, reach);
            match &sphere.node {
                Node::Leaf(leaf) => {
                    leaf_depths.push(depth);
                    *entries += leaf.len();
                }
                Node::Internal(children) => {
                    for child in children {
                        walk(child, depth + 1, fan_out, metric, leaf_depths, entries);
                    }
                }
            }
        }

        let root = match &self.root {
            Some(root) => root,
            None => {
                assert_eq!(self.len, 0);
                return;
            }
        };
        let mut leaf_depths = Vec::new();
        let mut entries = 0;
        walk(root, 1, self.config.fan_out, &self.metric, &mut leaf_depths, &mut entries);
        assert_eq!(entries, self.len);
        assert!(leaf_depths.iter().all(|&d| d == leaf_depths[0]), "leaves at uneven depths");
    }
}
