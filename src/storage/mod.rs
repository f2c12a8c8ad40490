//! Chronostore Storage Core
//!
//! This module provides the time-series data model and containers:
//!
//! - **moment**: `Moment`, one instant with calendar and clock views
//! - **types**: `TimedValue`, `TagId`, `AggregationType`, the `TimeKeyed` trait
//! - **arena**: pooled row storage owned by each multi-valued container
//! - **multimap**: key → rows primitive shared by the vector containers
//! - **series**: `TimeSeries`, one value per moment
//! - **temporal**: `TemporalData`, many fixed-dimension vectors per moment
//! - **lookup**: `LookupTable`, the shared tag ↔ id dictionary
//! - **tagged**: `TaggedTemporalData`, vector records keyed by (tag id, moment)
//! - **daily**: `DailyBucketStore`, calendar-day bucketing
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Ingest:
//!   (Moment, value)          → TimeSeries
//!   (Moment, vector)         → TemporalData ─┐
//!   (tag, Moment, vector)    → LookupTable::intern → TaggedTemporalData
//!                                             │
//! Roll-up:                                    ↓
//!   container.iter() → DailyBucketStore::aggregate → day buckets
//! ```
//!
//! # Concurrency
//!
//! `LookupTable` is safe to share and intern into from many threads. The
//! other containers take `&mut self` for writes; share them behind a single
//! lock per instance (for example `Arc<parking_lot::RwLock<TimeSeries<f64>>>`)
//! when more than one writer is involved.
//!
//! # Example
//!
//! ```rust
//! use chronostore::storage::{DailyBucketStore, LookupTable, Moment, TaggedTemporalData};
//! use std::sync::Arc;
//!
//! let table = Arc::new(LookupTable::<String>::new());
//! let mut readings = TaggedTemporalData::new(&table, 1);
//!
//! let t0 = Moment::from_calendar(2024, 1, 1, 0, 0, 0).unwrap();
//! let t1 = Moment::from_calendar(2024, 1, 1, 0, 5, 0).unwrap();
//! readings.append("temp-sensor-1", t0, &[21.5]).unwrap();
//! readings.append("temp-sensor-1", t1, &[21.7]).unwrap();
//!
//! let mut days: DailyBucketStore<Vec<f64>> = DailyBucketStore::new();
//! let records = readings.records_for("temp-sensor-1").unwrap();
//! days.aggregate(records.into_iter().map(|(m, row)| (m, row.to_vec())));
//!
//! assert_eq!(days.len(), 1);
//! assert_eq!(days.bucket(&t0.date()).map(Vec::len), Some(2));
//! ```

pub mod arena;
pub mod daily;
pub mod error;
pub mod lookup;
pub mod moment;
pub mod multimap;
pub mod series;
pub mod tagged;
pub mod temporal;
pub mod types;

// Re-export commonly used types
pub use arena::{RowArena, RowId};
pub use daily::{DailyBucketStore, FoldFn};
pub use error::{StoreError, StoreResult};
pub use lookup::LookupTable;
pub use moment::Moment;
pub use multimap::{MultiMap, Rows};
pub use series::TimeSeries;
pub use tagged::TaggedTemporalData;
pub use temporal::TemporalData;
pub use types::{AggregationType, TagId, TimeKeyed, TimedValue};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::Arc;

    #[test]
    fn test_end_to_end_tagged_ingest_and_bucketing() {
        let table = Arc::new(LookupTable::<String>::new());
        let mut readings = TaggedTemporalData::new(&table, 1);

        let t0 = Moment::from_calendar(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = Moment::from_calendar(2024, 1, 1, 0, 5, 0).unwrap();

        let id = table.intern("temp-sensor-1").unwrap();
        assert_eq!(id, TagId(0));

        assert_eq!(readings.append("temp-sensor-1", t0, &[21.5]).unwrap(), id);
        assert_eq!(readings.append("temp-sensor-1", t1, &[21.7]).unwrap(), id);

        let at_t0: Vec<Vec<f64>> = readings
            .get_all("temp-sensor-1", &t0)
            .unwrap()
            .map(<[f64]>::to_vec)
            .collect();
        assert_eq!(at_t0, vec![vec![21.5]]);

        let mut days: DailyBucketStore<Vec<f64>> = DailyBucketStore::new();
        days.aggregate(
            readings
                .iter()
                .map(|(_, moment, row)| (moment, row.to_vec())),
        );

        let jan_first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(days.dates(), vec![jan_first]);

        let mut vectors: Vec<Vec<f64>> = days
            .bucket(&jan_first)
            .unwrap()
            .iter()
            .map(|r| r.value().clone())
            .collect();
        vectors.sort_by(|a, b| a[0].total_cmp(&b[0]));
        assert_eq!(vectors, vec![vec![21.5], vec![21.7]]);
    }
}
