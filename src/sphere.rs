//! Nodes of the tree.
//!
//! A [`Sphere`] owns its children outright, so the whole hierarchy is a plain
//! rooted tree with no sharing and no parent pointers.

use crate::metric::Metric;

pub(crate) struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

pub(crate) enum Node<K, V> {
    Leaf(Vec<Entry<K, V>>),
    Internal(Vec<Sphere<K, V>>),
}

/// A covering region: every entry beneath it lies within `radius` of
/// `center`.
pub(crate) struct Sphere<K, V> {
    pub center: K,
    pub radius: f64,
    pub node: Node<K, V>,
}

/// Something that can be grouped under a sphere: an entry (a point) or a
/// child sphere (a ball of radius `reach` around `key`).
pub(crate) trait Member<K> {
    fn key(&self) -> &K;
    fn reach(&self) -> f64;
}

impl<K, V> Member<K> for Entry<K, V> {
    fn key(&self) -> &K {
        &self.key
    }

    fn reach(&self) -> f64 {
        0.0
    }
}

impl<K, V> Member<K> for Sphere<K, V> {
    fn key(&self) -> &K {
        &self.center
    }

    fn reach(&self) -> f64 {
        self.radius
    }
}

/// Index of the member whose ball covers all the others most tightly.
///
/// Ties go to the lowest index.
fn best_center<K, T: Member<K>, M: Metric<K>>(members: &[T], metric: &M) -> usize {
    let mut best = (f64::INFINITY, 0);
    for (i, candidate) in members.iter().enumerate() {
        let bound = members.iter().fold(0.0f64, |acc, other| {
            acc.max(metric.distance(candidate.key(), other.key()) + other.reach())
        });
        if bound < best.0 {
            best = (bound, i);
        }
    }
    best.1
}

impl<K: Clone, V> Sphere<K, V> {
    /// Build a leaf over `entries`, which must not be empty.
    pub fn leaf<M: Metric<K>>(entries: Vec<Entry<K, V>>, metric: &M) -> Self {
        debug_assert!(!entries.is_empty());
        let center = entries[best_center(&entries, metric)].key.clone();
        let mut sphere = Sphere {
            center,
            radius: 0.0,
            node: Node::Leaf(entries),
        };
        sphere.radius = sphere.farthest_entry(&sphere.center, metric);
        sphere
    }

    /// Build an internal sphere over `children`, which must not be empty.
    pub fn internal<M: Metric<K>>(children: Vec<Sphere<K, V>>, metric: &M) -> Self {
        debug_assert!(!children.is_empty());
        let center = children[best_center(&children, metric)].center.clone();
        let mut sphere = Sphere {
            center,
            radius: 0.0,
            node: Node::Internal(children),
        };
        sphere.radius = sphere.farthest_entry(&sphere.center, metric);
        sphere
    }
}

impl<K, V> Sphere<K, V> {
    pub fn is_empty(&self) -> bool {
        match &self.node {
            Node::Leaf(entries) => entries.is_empty(),
            Node::Internal(children) => children.is_empty(),
        }
    }

    /// Number of entries or children held directly by this sphere.
    pub fn fan(&self) -> usize {
        match &self.node {
            Node::Leaf(entries) => entries.len(),
            Node::Internal(children) => children.len(),
        }
    }

    /// Exact distance from `from` to the farthest entry beneath this sphere.
    pub fn farthest_entry<M: Metric<K>>(&self, from: &K, metric: &M) -> f64 {
        match &self.node {
            Node::Leaf(entries) => entries
                .iter()
                .fold(0.0f64, |acc, e| acc.max(metric.distance(from, &e.key))),
            Node::Internal(children) => children
                .iter()
                .fold(0.0f64, |acc, c| acc.max(c.farthest_entry(from, metric))),
        }
    }

    /// Could an entry with this key live beneath the sphere?
    pub fn may_contain<M: Metric<K>>(&self, key: &K, metric: &M) -> bool {
        metric.distance(&self.center, key) <= self.radius
    }

    /// Value stored under `key`, looking in every sphere that could hold it.
    pub fn find<M: Metric<K>>(&self, key: &K, metric: &M) -> Option<&V> {
        match &self.node {
            Node::Leaf(entries) => entries
                .iter()
                .find(|e| metric.distance(&e.key, key) == 0.0)
                .map(|e| &e.value),
            Node::Internal(children) => children
                .iter()
                .filter(|c| c.may_contain(key, metric))
                .find_map(|c| c.find(key, metric)),
        }
    }

    pub fn find_mut<M: Metric<K>>(&mut self, key: &K, metric: &M) -> Option<&mut V> {
        match &mut self.node {
            Node::Leaf(entries) => entries
                .iter_mut()
                .find(|e| metric.distance(&e.key, key) == 0.0)
                .map(|e| &mut e.value),
            Node::Internal(children) => {
                for child in children.iter_mut() {
                    if !child.may_contain(key, metric) {
                        continue;
                    }
                    if let Some(value) = child.find_mut(key, metric) {
                        return Some(value);
                    }
                }
                None
            }
        }
    }

    /// Total number of spheres in this subtree, itself included.
    pub fn sphere_count(&self) -> usize {
        match &self.node {
            Node::Leaf(_) => 1,
            Node::Internal(children) => 1 + children.iter().map(Sphere::sphere_count).sum::<usize>(),
        }
    }

    /// Number of levels in this subtree; a lone leaf has depth 1.
    pub fn depth(&self) -> usize {
        match &self.node {
            Node::Leaf(_) => 1,
            Node::Internal(children) => 1 + children.first().map_or(0, Sphere::depth),
        }
    }

    /// Tear the subtree down, moving every entry into `out`.
    pub fn drain_into(self, out: &mut Vec<Entry<K, V>>) {
        match self.node {
            Node::Leaf(mut entries) => out.append(&mut entries),
            Node::Internal(children) => {
                for child in children {
                    child.drain_into(out);
                }
            }
        }
    }
}
