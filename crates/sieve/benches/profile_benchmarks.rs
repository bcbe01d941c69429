//! Profiling performance benchmarks.
//!
//! Measures parsing and profiling of generated survey-style data.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sieve::input::Parser;
use sieve::DatasetProfiler;

/// Generate CSV with duplicates, missing values and outliers.
fn generate_survey_data(rows: usize) -> String {
    let mut rng = StdRng::seed_from_u64(42);
    let cities = ["Oslo", "Rome", "Paris", "Lima", "Kyoto"];

    let mut data = String::new();
    data.push_str("id,age,income,city,joined,active\n");

    for row in 0..rows {
        // ~2% exact duplicates of the previous row
        if row > 0 && rng.gen_bool(0.02) {
            let last = data.trim_end().rsplit('\n').next().unwrap_or_default().to_string();
            data.push_str(&last);
            data.push('\n');
            continue;
        }

        data.push_str(&format!("{},", row + 1));
        // age (missing 5%, occasional outlier)
        if rng.gen_bool(0.05) {
            data.push(',');
        } else if rng.gen_bool(0.01) {
            data.push_str("250,");
        } else {
            data.push_str(&format!("{},", rng.gen_range(18..80)));
        }
        data.push_str(&format!("{:.2},", rng.gen_range(20_000.0..120_000.0)));
        if rng.gen_bool(0.03) {
            data.push_str("NA,");
        } else {
            data.push_str(cities[rng.gen_range(0..cities.len())]);
            data.push(',');
        }
        data.push_str(&format!(
            "2023-{:02}-{:02},",
            rng.gen_range(1..13),
            rng.gen_range(1..29)
        ));
        data.push_str(if rng.gen_bool(0.5) { "yes\n" } else { "no\n" });
    }

    data
}

/// Benchmark parsing alone.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_survey_data(*rows);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("survey_rows", rows), &data, |b, data| {
            let parser = Parser::new();
            b.iter(|| black_box(parser.parse_str(data).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark profiling of an already-parsed dataset.
fn bench_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("profile");

    for rows in [100, 1_000, 10_000, 100_000].iter() {
        let dataset = Parser::new()
            .parse_str(&generate_survey_data(*rows))
            .unwrap();
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("survey_rows", rows), &dataset, |b, ds| {
            let profiler = DatasetProfiler::new();
            b.iter(|| black_box(profiler.profile(ds)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_profile);
criterion_main!(benches);
