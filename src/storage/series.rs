//! TimeSeries - one value per distinct moment
//!
//! Values are stored inline in the hash table, which doubles as the
//! container's allocation pool: `with_capacity` sizes it once up front so a
//! steady ingestion stream does not reallocate per record.

use crate::storage::error::{StoreError, StoreResult};
use crate::storage::moment::Moment;
use crate::storage::types::{TimeKeyed, TimedValue};
use std::collections::HashMap;

/// Single-valued map from moment to value
///
/// Iteration order is unspecified; use [`TimeSeries::sorted`] for a
/// chronological view.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries<V> {
    values: HashMap<Moment, V>,
}

impl<V> Default for TimeSeries<V> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
        }
    }
}

impl<V> TimeSeries<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: HashMap::with_capacity(capacity),
        }
    }

    /// Insert or replace the value at `moment`
    ///
    /// Returns the value that was replaced, if any.
    pub fn put(&mut self, moment: Moment, value: V) -> Option<V> {
        self.values.insert(moment, value)
    }

    /// Exact-key lookup
    pub fn get(&self, moment: &Moment) -> StoreResult<&V> {
        self.values
            .get(moment)
            .ok_or_else(|| StoreError::NotFound(format!("no value at {}", moment)))
    }

    /// Remove and return the value at `moment`
    pub fn remove(&mut self, moment: &Moment) -> StoreResult<V> {
        self.values
            .remove(moment)
            .ok_or_else(|| StoreError::NotFound(format!("no value at {}", moment)))
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn contains(&self, moment: &Moment) -> bool {
        self.values.contains_key(moment)
    }

    /// All entries, unordered
    pub fn iter(&self) -> impl Iterator<Item = (Moment, &V)> {
        self.values.iter().map(|(m, v)| (*m, v))
    }

    /// All entries in chronological order
    pub fn sorted(&self) -> Vec<(Moment, &V)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by_key(|(m, _)| *m);
        entries
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Consume the series into timed values, unordered
    pub fn into_timed_values(self) -> impl Iterator<Item = TimedValue<V>> {
        self.values.into_iter().map(TimedValue::from)
    }
}

impl<V> TimeKeyed for TimeSeries<V> {
    fn record_count(&self) -> usize {
        self.values.len()
    }

    fn key_count(&self) -> usize {
        self.values.len()
    }

    fn contains(&self, moment: &Moment) -> bool {
        self.values.contains_key(moment)
    }

    fn moments(&self) -> Vec<Moment> {
        self.values.keys().copied().collect()
    }
}

impl<V> Extend<TimedValue<V>> for TimeSeries<V> {
    fn extend<I: IntoIterator<Item = TimedValue<V>>>(&mut self, iter: I) {
        for tv in iter {
            let (moment, value) = tv.into_parts();
            self.put(moment, value);
        }
    }
}

impl<V> FromIterator<TimedValue<V>> for TimeSeries<V> {
    fn from_iter<I: IntoIterator<Item = TimedValue<V>>>(iter: I) -> Self {
        let mut series = Self::new();
        series.extend(iter);
        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(minute: u32) -> Moment {
        Moment::from_calendar(2024, 1, 1, 0, minute, 0).unwrap()
    }

    #[test]
    fn test_put_replaces_existing_value() {
        let mut series = TimeSeries::new();
        assert_eq!(series.put(at(0), 1.0), None);
        assert_eq!(series.size(), 1);

        assert_eq!(series.put(at(0), 2.0), Some(1.0));
        assert_eq!(series.size(), 1);
        assert_eq!(*series.get(&at(0)).unwrap(), 2.0);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let series: TimeSeries<f64> = TimeSeries::new();
        assert!(matches!(series.get(&at(1)), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_remove() {
        let mut series = TimeSeries::new();
        series.put(at(0), "a");
        series.put(at(1), "b");

        assert_eq!(series.remove(&at(0)).unwrap(), "a");
        assert!(!series.contains(&at(0)));
        assert!(series.contains(&at(1)));
        assert!(matches!(series.remove(&at(0)), Err(StoreError::NotFound(_))));
        assert_eq!(series.size(), 1);
    }

    #[test]
    fn test_sorted_is_chronological() {
        let mut series = TimeSeries::with_capacity(8);
        for minute in [7, 2, 5, 0, 3] {
            series.put(at(minute), minute);
        }

        let minutes: Vec<u32> = series.sorted().into_iter().map(|(_, v)| *v).collect();
        assert_eq!(minutes, vec![0, 2, 3, 5, 7]);
        assert_eq!(series.sorted_moments().first(), Some(&at(0)));
    }

    #[test]
    fn test_from_timed_values() {
        let series: TimeSeries<f64> = vec![
            TimedValue::new(at(0), 1.0),
            TimedValue::new(at(1), 2.0),
            TimedValue::new(at(0), 3.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(series.size(), 2);
        assert_eq!(series.record_count(), 2);
        assert_eq!(*series.get(&at(0)).unwrap(), 3.0);
    }
}
