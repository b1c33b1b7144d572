//! Ordered working collection used throughout resolution.
//!
//! Asynchronous transformations run strictly one element at a time, in order.
//! Catalog calls made from them therefore stay ordered and never overlap.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::future::Future;
use std::hash::Hash;

use rand::seq::SliceRandom;
use rand::Rng;

/// An ordered sequence of entries or tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queue<T> {
    items: Vec<T>,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Queue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Keep elements `start..end`, clamped to the queue bounds.
    pub fn slice(self, start: usize, end: usize) -> Self {
        let end = end.max(start);
        self.items
            .into_iter()
            .skip(start)
            .take(end - start)
            .collect()
    }

    /// Keep at most `n` leading elements.
    pub fn truncate(mut self, n: usize) -> Self {
        self.items.truncate(n);
        self
    }

    /// Truncate when a limit is set.
    pub fn limit(self, limit: Option<usize>) -> Self {
        match limit {
            Some(n) => self.truncate(n),
            None => self,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Queue<U> {
        self.items.into_iter().map(f).collect()
    }

    pub fn filter(self, mut predicate: impl FnMut(&T) -> bool) -> Self {
        self.items.into_iter().filter(|item| predicate(item)).collect()
    }

    /// Stable sort: equal elements keep their relative order.
    pub fn sort_by(mut self, compare: impl FnMut(&T, &T) -> Ordering) -> Self {
        self.items.sort_by(compare);
        self
    }

    pub fn reverse(mut self) -> Self {
        self.items.reverse();
        self
    }

    pub fn shuffle(self) -> Self {
        self.shuffle_with(&mut rand::thread_rng())
    }

    pub fn shuffle_with<R: Rng + ?Sized>(mut self, rng: &mut R) -> Self {
        self.items.shuffle(rng);
        self
    }

    /// Drop later elements whose key was already seen.
    pub fn dedup_by_key<K: Eq + Hash>(self, mut key: impl FnMut(&T) -> K) -> Self {
        let mut seen = HashSet::new();
        self.items
            .into_iter()
            .filter(|item| seen.insert(key(item)))
            .collect()
    }

    /// Apply an async operation to each element in order, awaiting each one
    /// before starting the next. Stops at the first error.
    pub async fn map_sequential<U, E, F, Fut>(self, mut f: F) -> Result<Queue<U>, E>
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = Result<U, E>>,
    {
        let mut out = Vec::with_capacity(self.items.len());
        for item in self.items {
            out.push(f(item).await?);
        }
        Ok(Queue { items: out })
    }

    /// Run an async side effect for each element in order.
    pub async fn for_each_sequential<'a, F, Fut>(&'a self, mut f: F)
    where
        F: FnMut(&'a T) -> Fut,
        Fut: Future<Output = ()>,
    {
        for item in &self.items {
            f(item).await;
        }
    }
}

impl<T> Queue<Queue<T>> {
    /// Concatenate nested queues one level deep, in order.
    pub fn flatten(self) -> Queue<T> {
        self.items.into_iter().flat_map(|q| q.items).collect()
    }
}

impl<T> From<Vec<T>> for Queue<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<T> FromIterator<T> for Queue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<T> for Queue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T> IntoIterator for Queue<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Queue<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
