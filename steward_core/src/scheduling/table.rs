//! Insertion-ordered map used for the scheduler's pending and active sets.
//!
//! Tables stay small (a handful of commands), so a vector with linear lookup
//! keeps iteration order trivially deterministic.

#[derive(Debug, Clone)]
pub(crate) struct OrderedTable<K, V> {
    entries: Vec<(K, V)>,
}

impl<K: PartialEq + Copy, V> OrderedTable<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// Insert or overwrite. An overwritten entry keeps its original position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.position(key).map(|idx| self.entries.remove(idx).1)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: PartialEq + Copy, V> Default for OrderedTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
