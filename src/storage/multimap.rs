//! MultiMap - key to many fixed-dimension rows
//!
//! The shared primitive behind `TemporalData` and `TaggedTemporalData`.
//! Each key owns an insertion-ordered list of row handles; the row values
//! themselves live in the container's `RowArena`.

use crate::storage::arena::{RowArena, RowId};
use crate::storage::error::StoreResult;
use std::collections::HashMap;
use std::hash::Hash;

/// Multi-valued map from `K` to rows of `V`
#[derive(Debug, Clone)]
pub struct MultiMap<K, V> {
    /// key → row handles in insertion order
    index: HashMap<K, Vec<RowId>>,
    /// Row storage owned by this map
    arena: RowArena<V>,
}

impl<K, V> MultiMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(dimension: usize) -> Self {
        Self::with_capacity(dimension, 0)
    }

    /// Pre-size for `keys` distinct keys
    pub fn with_capacity(dimension: usize, keys: usize) -> Self {
        Self {
            index: HashMap::with_capacity(keys),
            arena: RowArena::with_capacity(dimension, keys),
        }
    }

    pub fn dimension(&self) -> usize {
        self.arena.dimension()
    }

    /// Add a row under `key`, keeping any rows already there
    pub fn append(&mut self, key: K, row: &[V]) -> StoreResult<()> {
        let id = self.arena.insert(row)?;
        self.index.entry(key).or_default().push(id);
        Ok(())
    }

    /// Rows stored under `key` in insertion order; empty if absent
    pub fn get_all(&self, key: &K) -> Rows<'_, V> {
        let ids = self.index.get(key).map(Vec::as_slice).unwrap_or(&[]);
        Rows {
            ids: ids.iter(),
            arena: &self.arena,
        }
    }

    /// Number of rows under `key`
    pub fn count(&self, key: &K) -> usize {
        self.index.get(key).map_or(0, Vec::len)
    }

    /// Remove every row under `key`, returning how many there were
    pub fn remove_all(&mut self, key: &K) -> usize {
        match self.index.remove(key) {
            Some(ids) => {
                let removed = ids.len();
                for id in ids {
                    self.arena.release(id);
                }
                removed
            }
            None => 0,
        }
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Number of distinct keys
    pub fn key_count(&self) -> usize {
        self.index.len()
    }

    /// Number of rows across all keys
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Distinct keys, unordered
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.index.keys()
    }

    /// Every (key, row) pair; keys unordered, rows of one key in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &[V])> {
        let arena = &self.arena;
        self.index
            .iter()
            .flat_map(move |(key, ids)| ids.iter().map(move |&id| (key, arena.get(id))))
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.arena.clear();
    }

    /// Rebuild the arena without released slots
    ///
    /// On error the map is left as it was.
    pub fn compact(&mut self) -> StoreResult<()>
    where
        K: Clone,
    {
        if self.arena.free_slots() == 0 {
            return Ok(());
        }

        let mut arena = RowArena::with_capacity(self.arena.dimension(), self.arena.len());
        let mut index = HashMap::with_capacity(self.index.len());
        for (key, ids) in &self.index {
            let moved = ids
                .iter()
                .map(|id| arena.store(self.arena.get(*id)))
                .collect::<StoreResult<Vec<RowId>>>()?;
            index.insert(key.clone(), moved);
        }
        self.index = index;
        self.arena = arena;
        Ok(())
    }

    /// Bytes reserved for row data
    pub fn reserved_bytes(&self) -> usize {
        self.arena.reserved_bytes()
    }
}

/// Lazy iterator over the rows of one key
pub struct Rows<'a, V> {
    ids: std::slice::Iter<'a, RowId>,
    arena: &'a RowArena<V>,
}

impl<'a, V: Clone> Iterator for Rows<'a, V> {
    type Item = &'a [V];

    fn next(&mut self) -> Option<Self::Item> {
        self.ids.next().map(|&id| self.arena.get(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

impl<V: Clone> DoubleEndedIterator for Rows<'_, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.ids.next_back().map(|&id| self.arena.get(id))
    }
}

impl<V: Clone> ExactSizeIterator for Rows<'_, V> {}
