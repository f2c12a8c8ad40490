//! Benchmarks for Chronostore ingestion paths
//!
//! Run with: cargo bench

use chronostore::storage::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;

fn moments(count: usize) -> Vec<Moment> {
    (0..count)
        .map(|i| Moment::from_unix_millis(1_704_067_200_000 + i as i64 * 1000).unwrap())
        .collect()
}

fn bench_time_series(c: &mut Criterion) {
    let mut group = c.benchmark_group("time_series");

    for size in [1000, 10000] {
        let keys = moments(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("put_{}", size), |b| {
            b.iter(|| {
                let mut series = TimeSeries::with_capacity(size);
                for (i, m) in keys.iter().enumerate() {
                    series.put(*m, black_box(i as f64));
                }
                series
            })
        });
    }

    group.finish();
}

fn bench_temporal_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("temporal_data");

    for size in [1000, 10000] {
        let keys = moments(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("append_dim3_{}", size), |b| {
            b.iter(|| {
                let mut data = TemporalData::with_capacity(3, size);
                for m in &keys {
                    data.append(*m, black_box(&[1.0, 2.0, 3.0])).unwrap();
                }
                data
            })
        });
    }

    group.finish();
}

fn bench_lookup_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup_table");

    let tags: Vec<String> = (0..1000).map(|i| format!("sensor-{}", i)).collect();
    group.throughput(Throughput::Elements(tags.len() as u64));

    group.bench_function("intern_new", |b| {
        b.iter(|| {
            let table = LookupTable::<String>::with_capacity(tags.len());
            for tag in &tags {
                table.intern(black_box(tag.as_str())).unwrap();
            }
            table
        })
    });

    let table = LookupTable::<String>::new();
    for tag in &tags {
        table.intern(tag.as_str()).unwrap();
    }
    group.bench_function("intern_existing", |b| {
        b.iter(|| {
            for tag in &tags {
                black_box(table.intern(tag.as_str()).unwrap());
            }
        })
    });

    group.finish();
}

fn bench_tagged_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("tagged");

    let keys = moments(10000);
    group.throughput(Throughput::Elements(keys.len() as u64));

    group.bench_function("append_16_tags", |b| {
        let tags: Vec<String> = (0..16).map(|i| format!("sensor-{}", i)).collect();
        b.iter(|| {
            let table = Arc::new(LookupTable::<String>::new());
            let mut data = TaggedTemporalData::new(&table, 1);
            for (i, m) in keys.iter().enumerate() {
                data.append(tags[i % 16].as_str(), *m, &[i as f64]).unwrap();
            }
            data.record_count()
        })
    });

    group.finish();
}

fn bench_daily_buckets(c: &mut Criterion) {
    let mut group = c.benchmark_group("daily");

    // One reading a minute for 30 days
    let mut series = TimeSeries::with_capacity(30 * 1440);
    for i in 0..30 * 1440 {
        let m = Moment::from_unix_millis(1_704_067_200_000 + i as i64 * 60_000).unwrap();
        series.put(m, i as f64);
    }
    group.throughput(Throughput::Elements(series.size() as u64));

    group.bench_function("aggregate_30_days", |b| {
        b.iter(|| {
            let mut days: DailyBucketStore<f64> = DailyBucketStore::new();
            days.aggregate_series(black_box(&series));
            days.summarize(AggregationType::Average)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_time_series,
    bench_temporal_data,
    bench_lookup_table,
    bench_tagged_ingest,
    bench_daily_buckets
);
criterion_main!(benches);
