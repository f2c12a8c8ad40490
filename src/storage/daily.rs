//! Daily Bucket Store - roll time-keyed records into calendar days
//!
//! Each record's moment is mapped to a calendar date (UTC by default, or a
//! fixed offset) and folded into that date's bucket. The fold is supplied by
//! the caller; the default keeps every record.
//!
//! ```text
//! (2024-01-01T00:00Z, 21.5) ┐
//! (2024-01-01T00:05Z, 21.7) ┴→ 2024-01-01: [21.5, 21.7]
//! (2024-01-02T09:00Z, 19.0) ──→ 2024-01-02: [19.0]
//! ```
//!
//! `aggregate` clears every bucket before folding, so running it again over
//! the same input yields the same buckets. `accumulate` folds on top of what
//! is already there.

use crate::storage::moment::Moment;
use crate::storage::series::TimeSeries;
use crate::storage::temporal::TemporalData;
use crate::storage::types::{AggregationType, TimedValue};
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use std::collections::BTreeMap;
use std::fmt;

/// Folds one record into a bucket
pub type FoldFn<R, A> = Box<dyn Fn(&mut A, TimedValue<R>) + Send + Sync>;

/// Calendar-day buckets over records of type `R`
///
/// `A` is the per-bucket aggregate; the default collects every record.
pub struct DailyBucketStore<R, A = Vec<TimedValue<R>>> {
    buckets: BTreeMap<NaiveDate, A>,
    fold: FoldFn<R, A>,
    offset: FixedOffset,
}

impl<R: 'static> DailyBucketStore<R> {
    /// Collect-all store: each bucket keeps every record that fell on its day
    pub fn new() -> Self {
        Self::with_fold(|bucket: &mut Vec<TimedValue<R>>, record| bucket.push(record))
    }
}

impl<R: 'static> Default for DailyBucketStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, A: Default> DailyBucketStore<R, A> {
    /// Store with a caller-supplied fold
    ///
    /// A bucket starts from `A::default()` the first time a record lands on
    /// its date.
    pub fn with_fold<F>(fold: F) -> Self
    where
        F: Fn(&mut A, TimedValue<R>) + Send + Sync + 'static,
    {
        Self {
            buckets: BTreeMap::new(),
            fold: Box::new(fold),
            offset: utc(),
        }
    }

    /// Bucket by calendar day in a fixed UTC offset instead of UTC
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = offset;
        self
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Rebuild all buckets from `input`
    ///
    /// Clears first, so repeating the call with the same input is idempotent.
    /// Returns the number of records folded.
    pub fn aggregate<I, P>(&mut self, input: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<TimedValue<R>>,
    {
        self.buckets.clear();
        let folded = self.accumulate(input);
        tracing::debug!(records = folded, days = self.buckets.len(), "rebuilt day buckets");
        folded
    }

    /// Fold `input` into the existing buckets without clearing
    pub fn accumulate<I, P>(&mut self, input: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: Into<TimedValue<R>>,
    {
        let mut folded = 0;
        for record in input {
            let record = record.into();
            let date = record.moment().date_in(self.offset);
            let bucket = self.buckets.entry(date).or_default();
            (self.fold)(bucket, record);
            folded += 1;
        }
        folded
    }

    /// Bucket for `date`, if any record fell on it
    pub fn bucket(&self, date: &NaiveDate) -> Option<&A> {
        self.buckets.get(date)
    }

    /// Bucket holding `moment`'s calendar day
    pub fn bucket_for(&self, moment: &Moment) -> Option<&A> {
        self.buckets.get(&moment.date_in(self.offset))
    }

    /// Populated dates in chronological order
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.buckets.keys().copied().collect()
    }

    /// Buckets in chronological order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &A)> {
        self.buckets.iter().map(|(d, a)| (*d, a))
    }

    /// Number of populated days
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    pub fn into_buckets(self) -> BTreeMap<NaiveDate, A> {
        self.buckets
    }
}

impl<R: Clone, A: Default> DailyBucketStore<R, A> {
    /// Rebuild from every entry of a `TimeSeries`
    pub fn aggregate_series(&mut self, series: &TimeSeries<R>) -> usize {
        self.aggregate(series.iter().map(|(m, v)| (m, v.clone())))
    }
}

impl<V: Clone, A: Default> DailyBucketStore<Vec<V>, A> {
    /// Rebuild from every record of a `TemporalData`
    pub fn aggregate_temporal(&mut self, data: &TemporalData<V>) -> usize {
        self.aggregate(data.iter().map(|(m, row)| (m, row.to_vec())))
    }
}

impl DailyBucketStore<f64> {
    /// Summarise each day's values
    pub fn summarize(&self, aggregation: AggregationType) -> BTreeMap<NaiveDate, f64> {
        self.buckets
            .iter()
            .filter_map(|(date, records)| {
                let values = records.iter().map(|r| (r.moment(), *r.value()));
                aggregation.aggregate(values).map(|v| (*date, v))
            })
            .collect()
    }
}

impl DailyBucketStore<Vec<f64>> {
    /// Summarise one vector component per day
    ///
    /// Days whose vectors have no component `index` are left out.
    pub fn summarize_component(
        &self,
        index: usize,
        aggregation: AggregationType,
    ) -> BTreeMap<NaiveDate, f64> {
        self.buckets
            .iter()
            .filter_map(|(date, records)| {
                let values = records
                    .iter()
                    .filter_map(|r| r.value().get(index).map(|v| (r.moment(), *v)));
                aggregation.aggregate(values).map(|v| (*date, v))
            })
            .collect()
    }
}

impl<R, A: fmt::Debug> fmt::Debug for DailyBucketStore<R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DailyBucketStore")
            .field("buckets", &self.buckets)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> Moment {
        Moment::from_calendar(2024, 1, day, hour, minute, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_same_day_records_share_bucket() {
        let mut store: DailyBucketStore<f64> = DailyBucketStore::new();
        store.aggregate(vec![(at(1, 0, 0), 21.5), (at(1, 0, 5), 21.7), (at(2, 9, 0), 19.0)]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.dates(), vec![date(1), date(2)]);

        let day_one = store.bucket(&date(1)).unwrap();
        assert_eq!(day_one.len(), 2);
        assert!(day_one.iter().all(|r| r.moment().date() == date(1)));
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let input = vec![
            TimedValue::new(at(1, 8, 0), 1.0),
            TimedValue::new(at(1, 17, 30), 2.0),
        ];

        let mut store: DailyBucketStore<f64> = DailyBucketStore::new();
        store.aggregate(input.clone());
        let first = store.bucket(&date(1)).cloned();

        store.aggregate(input);
        assert_eq!(store.bucket(&date(1)).cloned(), first);
        assert_eq!(store.bucket(&date(1)).map(Vec::len), Some(2));
    }

    #[test]
    fn test_accumulate_is_additive() {
        let input = vec![(at(1, 8, 0), 1.0)];

        let mut store: DailyBucketStore<f64> = DailyBucketStore::new();
        store.accumulate(input.clone());
        store.accumulate(input);
        assert_eq!(store.bucket(&date(1)).map(Vec::len), Some(2));
    }

    #[test]
    fn test_custom_fold() {
        let mut sums: DailyBucketStore<f64, f64> =
            DailyBucketStore::with_fold(|total, record| *total += *record.value());
        sums.aggregate(vec![(at(1, 0, 0), 1.5), (at(1, 1, 0), 2.5), (at(3, 0, 0), 4.0)]);

        assert_eq!(sums.bucket(&date(1)), Some(&4.0));
        assert_eq!(sums.bucket(&date(2)), None);
        assert_eq!(sums.bucket(&date(3)), Some(&4.0));

        // Refolding the same input does not double count
        sums.aggregate(vec![(at(1, 0, 0), 1.5), (at(1, 1, 0), 2.5)]);
        assert_eq!(sums.bucket(&date(1)), Some(&4.0));
        assert_eq!(sums.len(), 1);
    }

    #[test]
    fn test_offset_moves_records_across_midnight() {
        let records = vec![(at(1, 23, 30), 1.0)];

        let mut utc_store: DailyBucketStore<f64> = DailyBucketStore::new();
        utc_store.aggregate(records.clone());
        assert_eq!(utc_store.dates(), vec![date(1)]);

        let plus_one = FixedOffset::east_opt(3600).unwrap();
        let mut local_store: DailyBucketStore<f64> = DailyBucketStore::new().with_offset(plus_one);
        local_store.aggregate(records);
        assert_eq!(local_store.dates(), vec![date(2)]);
        assert!(local_store.bucket_for(&at(1, 23, 30)).is_some());
    }

    #[test]
    fn test_summaries() {
        let mut series = TimeSeries::new();
        series.put(at(1, 6, 0), 10.0);
        series.put(at(1, 18, 0), 20.0);
        series.put(at(2, 12, 0), 5.0);

        let mut store: DailyBucketStore<f64> = DailyBucketStore::new();
        assert_eq!(store.aggregate_series(&series), 3);

        let avg = store.summarize(AggregationType::Average);
        assert_eq!(avg.get(&date(1)), Some(&15.0));
        assert_eq!(avg.get(&date(2)), Some(&5.0));

        let last = store.summarize(AggregationType::Last);
        assert_eq!(last.get(&date(1)), Some(&20.0));
    }

    #[test]
    fn test_vector_buckets_from_temporal_data() {
        let mut data = TemporalData::new(2);
        data.append(at(1, 0, 0), &[1.0, 100.0]).unwrap();
        data.append(at(1, 0, 0), &[3.0, 300.0]).unwrap();
        data.append(at(2, 0, 0), &[5.0, 500.0]).unwrap();

        let mut store: DailyBucketStore<Vec<f64>> = DailyBucketStore::new();
        assert_eq!(store.aggregate_temporal(&data), 3);

        let max_second = store.summarize_component(1, AggregationType::Max);
        assert_eq!(max_second.get(&date(1)), Some(&300.0));
        assert_eq!(max_second.get(&date(2)), Some(&500.0));

        assert!(store.summarize_component(7, AggregationType::Sum).is_empty());
    }
}
