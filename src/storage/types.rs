//! Core data types shared by the storage containers
//!
//! - `TimedValue`: an immutable (moment, value) pair
//! - `TagId`: compact identifier handed out by a `LookupTable`
//! - `AggregationType`: summary functions applied to day buckets
//! - `TimeKeyed`: the surface every time-keyed container exposes

use crate::storage::moment::Moment;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single value observed at a moment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedValue<V> {
    moment: Moment,
    value: V,
}

impl<V> TimedValue<V> {
    pub fn new(moment: Moment, value: V) -> Self {
        Self { moment, value }
    }

    pub fn moment(&self) -> Moment {
        self.moment
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Split into the moment and the owned value
    pub fn into_parts(self) -> (Moment, V) {
        (self.moment, self.value)
    }
}

impl<V> From<(Moment, V)> for TimedValue<V> {
    fn from((moment, value): (Moment, V)) -> Self {
        Self::new(moment, value)
    }
}

/// Identifier assigned to a tag by a `LookupTable`
///
/// Ids start at 0 and increase in first-intern order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(pub u32);

impl TagId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How to summarise the values in a bucket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AggregationType {
    /// Sum values
    Sum,
    /// Arithmetic mean
    Average,
    /// Value with the latest moment
    Last,
    /// Maximum value
    Max,
    /// Minimum value
    Min,
    /// Number of values
    Count,
}

impl AggregationType {
    /// Aggregate timed values according to this type
    ///
    /// `Last` picks the value with the greatest moment, so the result does not
    /// depend on the order the bucket was filled in.
    pub fn aggregate<I>(&self, values: I) -> Option<f64>
    where
        I: IntoIterator<Item = (Moment, f64)>,
    {
        let mut iter = values.into_iter().peekable();
        iter.peek()?;

        Some(match self {
            AggregationType::Sum => iter.map(|(_, v)| v).sum::<f64>(),
            AggregationType::Average => {
                let (sum, count) = iter.fold((0.0, 0usize), |(s, c), (_, v)| (s + v, c + 1));
                sum / count as f64
            }
            AggregationType::Last => iter
                .fold(None::<(Moment, f64)>, |best, (m, v)| match best {
                    Some((bm, _)) if bm > m => best,
                    _ => Some((m, v)),
                })
                .map(|(_, v)| v)?,
            AggregationType::Max => iter.map(|(_, v)| v).fold(f64::NEG_INFINITY, f64::max),
            AggregationType::Min => iter.map(|(_, v)| v).fold(f64::INFINITY, f64::min),
            AggregationType::Count => iter.count() as f64,
        })
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationType::Sum => write!(f, "sum"),
            AggregationType::Average => write!(f, "avg"),
            AggregationType::Last => write!(f, "last"),
            AggregationType::Max => write!(f, "max"),
            AggregationType::Min => write!(f, "min"),
            AggregationType::Count => write!(f, "count"),
        }
    }
}

impl std::str::FromStr for AggregationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sum" => Ok(AggregationType::Sum),
            "avg" | "average" | "mean" => Ok(AggregationType::Average),
            "last" => Ok(AggregationType::Last),
            "max" => Ok(AggregationType::Max),
            "min" => Ok(AggregationType::Min),
            "count" => Ok(AggregationType::Count),
            other => Err(format!("unknown aggregation: {}", other)),
        }
    }
}

/// Common surface of the time-keyed containers
///
/// Iteration order of `moments` is unspecified; use `sorted_moments` for a
/// chronological traversal.
pub trait TimeKeyed {
    /// Number of stored records
    fn record_count(&self) -> usize;

    /// Number of distinct moment keys
    fn key_count(&self) -> usize;

    /// Whether any record is stored under `moment`
    fn contains(&self, moment: &Moment) -> bool;

    /// Distinct moment keys, unordered
    fn moments(&self) -> Vec<Moment>;

    fn is_empty(&self) -> bool {
        self.record_count() == 0
    }

    /// Distinct moment keys in chronological order
    fn sorted_moments(&self) -> Vec<Moment> {
        let mut moments = self.moments();
        moments.sort_unstable();
        moments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(minute: u32) -> Moment {
        Moment::from_calendar(2024, 1, 1, 0, minute, 0).unwrap()
    }

    #[test]
    fn test_timed_value_parts() {
        let tv = TimedValue::new(at(5), 21.5);
        assert_eq!(tv.moment(), at(5));
        assert_eq!(*tv.value(), 21.5);

        let (m, v) = tv.into_parts();
        assert_eq!(m, at(5));
        assert_eq!(v, 21.5);
    }

    #[test]
    fn test_aggregation_types() {
        let values = vec![(at(0), 1.0), (at(4), 5.0), (at(1), 2.0), (at(2), 3.0), (at(3), 4.0)];

        assert_eq!(AggregationType::Sum.aggregate(values.clone()), Some(15.0));
        assert_eq!(AggregationType::Average.aggregate(values.clone()), Some(3.0));
        assert_eq!(AggregationType::Last.aggregate(values.clone()), Some(5.0));
        assert_eq!(AggregationType::Max.aggregate(values.clone()), Some(5.0));
        assert_eq!(AggregationType::Min.aggregate(values.clone()), Some(1.0));
        assert_eq!(AggregationType::Count.aggregate(values), Some(5.0));

        let empty: Vec<(Moment, f64)> = vec![];
        assert_eq!(AggregationType::Sum.aggregate(empty), None);
    }

    #[test]
    fn test_aggregation_parse() {
        assert_eq!("avg".parse::<AggregationType>(), Ok(AggregationType::Average));
        assert_eq!("MAX".parse::<AggregationType>(), Ok(AggregationType::Max));
        assert!("median".parse::<AggregationType>().is_err());
    }

    #[test]
    fn test_tag_id_display() {
        assert_eq!(TagId(3).to_string(), "#3");
        assert_eq!(TagId(3).index(), 3);
    }
}
