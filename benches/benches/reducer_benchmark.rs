//! Reduction and parsing benchmarks.
//!
//! Run with: `cargo bench --package dayroll-bench`

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dayroll_bench::{synthetic_payload, synthetic_quotes};
use dayroll_lib::{LookbackWindow, Symbol, filter_lookback, parse_intraday, reduce_daily};
use std::hint::black_box;

fn reducer_benchmark(c: &mut Criterion) {
    let symbol = Symbol::new("IBM").unwrap();
    let last_day = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();

    let mut group = c.benchmark_group("reduce_daily");
    for days in [14u64, 90, 365] {
        let quotes = synthetic_quotes(&symbol, last_day, days);
        group.throughput(Throughput::Elements(quotes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(days), &quotes, |b, quotes| {
            b.iter(|| {
                let emitted = reduce_daily(quotes.iter().cloned())
                    .filter_map(Result::ok)
                    .count();
                black_box(emitted)
            });
        });
    }
    group.finish();

    let mut group = c.benchmark_group("filter_and_reduce");
    let quotes = synthetic_quotes(&symbol, last_day, 365);
    group.throughput(Throughput::Elements(quotes.len() as u64));
    group.bench_function("lookback_14", |b| {
        b.iter(|| {
            let window = filter_lookback(quotes.iter().cloned(), LookbackWindow::default(), last_day);
            black_box(reduce_daily(window).count())
        });
    });
    group.finish();
}

fn parse_benchmark(c: &mut Criterion) {
    let symbol = Symbol::new("IBM").unwrap();
    let last_day = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
    let body = synthetic_payload(&synthetic_quotes(&symbol, last_day, 30));

    let mut group = c.benchmark_group("parse_intraday");
    group.throughput(Throughput::Bytes(body.len() as u64));
    group.bench_function("30_days", |b| {
        b.iter(|| black_box(parse_intraday(&symbol, &body).map(|batch| batch.quotes.len())));
    });
    group.finish();
}

criterion_group!(benches, reducer_benchmark, parse_benchmark);
criterion_main!(benches);
