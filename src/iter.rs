//! Iterators over the stored entries.

use crate::sphere::{Entry, Node, Sphere};
use std::iter::FusedIterator;
use std::slice;

/// Pre-order walk over every `(key, value)` pair in a tree.
///
/// Created by [`MTree::entries`](crate::MTree::entries).
pub struct Entries<'a, K, V> {
    pending: Vec<&'a Sphere<K, V>>,
    leaf: slice::Iter<'a, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Entries<'a, K, V> {
    pub(crate) fn new(root: Option<&'a Sphere<K, V>>, len: usize) -> Self {
        let empty: &'a [Entry<K, V>] = &[];
        Entries {
            pending: root.into_iter().collect(),
            leaf: empty.iter(),
            remaining: len,
        }
    }
}

impl<'a, K, V> Iterator for Entries<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.leaf.next() {
                self.remaining = self.remaining.saturating_sub(1);
                return Some((&entry.key, &entry.value));
            }
            let sphere = self.pending.pop()?;
            match &sphere.node {
                Node::Leaf(entries) => self.leaf = entries.iter(),
                Node::Internal(children) => self.pending.extend(children.iter().rev()),
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> ExactSizeIterator for Entries<'a, K, V> {}

impl<'a, K, V> FusedIterator for Entries<'a, K, V> {}

impl<'a, K, V> Clone for Entries<'a, K, V> {
    fn clone(&self) -> Self {
        Entries {
            pending: self.pending.clone(),
            leaf: self.leaf.clone(),
            remaining: self.remaining,
        }
    }
}

/// Keys of a tree, in the same order as [`Entries`].
#[derive(Clone)]
pub struct Keys<'a, K, V>(pub(crate) Entries<'a, K, V>);

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.0.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}

/// Values of a tree, in the same order as [`Entries`].
#[derive(Clone)]
pub struct Values<'a, K, V>(pub(crate) Entries<'a, K, V>);

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.0.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}

/// Owned `(key, value)` pairs drained out of a tree.
pub struct IntoIter<K, V> {
    inner: std::vec::IntoIter<Entry<K, V>>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(root: Option<Sphere<K, V>>, len: usize) -> Self {
        let mut entries = Vec::with_capacity(len);
        if let Some(root) = root {
            root.drain_into(&mut entries);
        }
        IntoIter {
            inner: entries.into_iter(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next().map(|e| (e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
