//! # Chronostore
//!
//! Embeddable time-series storage core: time-keyed containers for scalar and
//! vector measurements, a shared tag dictionary, and calendar-day bucketing.
//!
//! ## Features
//!
//! - **Consistent time keys**: `Moment` derives its date and clock views from
//!   a single UTC instant
//! - **Single- and multi-valued containers**: `TimeSeries` keeps one value per
//!   moment, `TemporalData` keeps every simultaneous reading
//! - **Compact tagging**: `TaggedTemporalData` stores `u32` tag ids resolved
//!   through a shared `LookupTable`
//! - **Pooled allocation**: vector rows live in a per-container arena
//! - **Day roll-ups**: `DailyBucketStore` folds records into calendar days
//!
//! ## Modules
//!
//! - [`storage`]: Core data model and containers
//! - [`config`]: TOML configuration with environment overrides
//! - [`import`]: CSV ingestion of tagged vector records
//!
//! ## Quick Start
//!
//! ```rust
//! use chronostore::storage::*;
//!
//! let mut series = TimeSeries::new();
//! let t = Moment::from_calendar(2024, 1, 1, 8, 0, 0).unwrap();
//! series.put(t, 7.5);
//! assert_eq!(*series.get(&t).unwrap(), 7.5);
//!
//! let mut days: DailyBucketStore<f64> = DailyBucketStore::new();
//! days.aggregate_series(&series);
//! let totals = days.summarize(AggregationType::Sum);
//! assert_eq!(totals.get(&t.date()), Some(&7.5));
//! ```

pub mod config;
pub mod import;
pub mod storage;

// Re-export top-level types for convenience
pub use storage::{
    AggregationType, DailyBucketStore, LookupTable, Moment, StoreError, StoreResult, TagId,
    TaggedTemporalData, TemporalData, TimeKeyed, TimeSeries, TimedValue,
};

pub use config::{Config, ConfigError, LoggingConfig, StorageConfig};

pub use import::{CsvImportResult, CsvImporter};
