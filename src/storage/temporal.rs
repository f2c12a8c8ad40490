//! TemporalData - many fixed-dimension vectors per moment
//!
//! Simultaneous readings (multi-channel capture, several sensors sampled on
//! the same tick) are all kept; an append never replaces earlier records at
//! the same moment.

use crate::storage::error::StoreResult;
use crate::storage::moment::Moment;
use crate::storage::multimap::{MultiMap, Rows};
use crate::storage::types::TimeKeyed;

/// Multi-valued map from moment to vectors of `dimension` components
#[derive(Debug, Clone)]
pub struct TemporalData<V> {
    records: MultiMap<Moment, V>,
}

impl<V: Clone> TemporalData<V> {
    /// Create a container whose vectors all have `dimension` components
    pub fn new(dimension: usize) -> Self {
        Self {
            records: MultiMap::new(dimension),
        }
    }

    pub fn with_capacity(dimension: usize, moments: usize) -> Self {
        Self {
            records: MultiMap::with_capacity(dimension, moments),
        }
    }

    /// Fixed vector length for this container
    pub fn dimension(&self) -> usize {
        self.records.dimension()
    }

    /// Add a vector under `moment`
    ///
    /// Fails with `DimensionMismatch` if `vector` does not have exactly
    /// `dimension()` components.
    pub fn append(&mut self, moment: Moment, vector: &[V]) -> StoreResult<()> {
        self.records.append(moment, vector)
    }

    /// All vectors at `moment` in insertion order; empty if none
    pub fn get_all(&self, moment: &Moment) -> Rows<'_, V> {
        self.records.get_all(moment)
    }

    /// Remove every vector at `moment`, returning how many were removed
    pub fn remove_all(&mut self, moment: &Moment) -> usize {
        self.records.remove_all(moment)
    }

    /// Number of vectors at `moment`
    pub fn count(&self, moment: &Moment) -> usize {
        self.records.count(moment)
    }

    /// Every record, unordered across moments
    pub fn iter(&self) -> impl Iterator<Item = (Moment, &[V])> {
        self.records.iter().map(|(m, row)| (*m, row))
    }

    /// Every record, ordered by moment and then by insertion
    pub fn sorted(&self) -> Vec<(Moment, &[V])> {
        let mut out = Vec::with_capacity(self.records.len());
        for moment in self.sorted_moments() {
            out.extend(self.get_all(&moment).map(|row| (moment, row)));
        }
        out
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Drop released slots from the row arena
    pub fn compact(&mut self) -> StoreResult<()> {
        self.records.compact()
    }
}

impl<V: Clone> TimeKeyed for TemporalData<V> {
    fn record_count(&self) -> usize {
        self.records.len()
    }

    fn key_count(&self) -> usize {
        self.records.key_count()
    }

    fn contains(&self, moment: &Moment) -> bool {
        self.records.contains_key(moment)
    }

    fn moments(&self) -> Vec<Moment> {
        self.records.keys().copied().collect()
    }
}
